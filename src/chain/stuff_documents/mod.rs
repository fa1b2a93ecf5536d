#[allow(clippy::module_inception)]
mod chain;
pub use chain::*;

mod builder;
pub use builder::*;

mod prompt;
pub use prompt::*;

pub const STUFF_DOCUMENTS_DEFAULT_SEPARATOR: &str = "\n\n";
