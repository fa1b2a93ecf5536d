mod error;
pub use error::*;

mod prompt_template;
pub use prompt_template::*;

mod format_document;
pub use format_document::*;
