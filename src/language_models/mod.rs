pub mod llm;
pub use llm::*;

mod error;
pub use error::*;

pub mod options;
pub use options::*;

mod tokens;
pub use tokens::*;

pub mod fake;
pub use fake::*;
