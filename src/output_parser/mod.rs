#[allow(clippy::module_inception)]
mod output_parser;
pub use output_parser::*;

mod error;
pub use error::*;

mod simple_parser;
pub use simple_parser::*;

mod regex_parser;
pub use regex_parser::*;

mod list_parser;
pub use list_parser::*;

mod json_parser;
pub use json_parser::*;

mod parse_helper;
pub use parse_helper::*;
