use serde_json::Value;

use super::{OutputParseError, OutputParser};

/// Splits the output into a list of trimmed, non-empty items.
pub struct ListParser {
    separator: String,
}

impl ListParser {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }
}

impl Default for ListParser {
    fn default() -> Self {
        Self::new(",")
    }
}

impl OutputParser for ListParser {
    fn parse(&self, output: &str) -> Result<Value, OutputParseError> {
        let items = output
            .split(self.separator.as_str())
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| Value::String(item.into()))
            .collect();

        Ok(Value::Array(items))
    }

    fn parser_type(&self) -> &str {
        "list"
    }
}
