#[allow(clippy::module_inception)]
mod generate_result;
pub use generate_result::*;

mod token_usage;
pub use token_usage::*;
