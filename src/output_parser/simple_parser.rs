use serde_json::Value;

use super::{OutputParseError, OutputParser};

/// Returns the text itself, optionally trimmed.
pub struct SimpleParser {
    trim: bool,
}

impl SimpleParser {
    pub fn trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }
}

impl Default for SimpleParser {
    fn default() -> Self {
        Self { trim: true }
    }
}

impl OutputParser for SimpleParser {
    fn parse(&self, output: &str) -> Result<Value, OutputParseError> {
        if self.trim {
            Ok(Value::String(output.trim().into()))
        } else {
            Ok(Value::String(output.into()))
        }
    }

    fn parser_type(&self) -> &str {
        "simple"
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_simple_parser_trims_by_default() {
        let parser = SimpleParser::default();
        assert_eq!(parser.parse("  answer \n").unwrap(), json!("answer"));

        let parser = SimpleParser::default().trim(false);
        assert_eq!(parser.parse(" answer").unwrap(), json!(" answer"));
    }
}
