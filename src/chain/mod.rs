#[allow(clippy::module_inception)]
mod chain;
pub use chain::*;

mod chain_input;
pub use chain_input::*;

mod options;
pub use options::*;

pub mod llm;
pub use llm::*;

mod combine_documents;
pub use combine_documents::*;

mod stuff_documents;
pub use stuff_documents::*;

mod prompt_selector;
pub use prompt_selector::*;

mod question_answering;
pub use question_answering::*;

mod error;
pub use error::*;
