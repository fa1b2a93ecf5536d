mod document;
pub use document::*;

mod prompt;
pub use prompt::*;

mod prompt_args;
pub use prompt_args::*;

pub mod generate_result;
pub use generate_result::*;

mod run_info;
pub use run_info::*;
