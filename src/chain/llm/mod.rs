#[allow(clippy::module_inception)]
mod chain;
pub use chain::*;

mod builder;
pub use builder::*;
