use serde_json::Value;

use crate::output_parser::OutputParseError;

/// Turns raw model text into a structured value: a scalar, a sequence or a mapping.
pub trait OutputParser: Send + Sync {
    fn parse(&self, text: &str) -> Result<Value, OutputParseError>;

    /// Short identifier recorded when a prompt carrying this parser is saved.
    fn parser_type(&self) -> &str;
}
