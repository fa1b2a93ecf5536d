use regex::Regex;
use serde_json::Value;

use super::{OutputParseError, OutputParser};

/// Extracts the first capture group of a pattern from the output.
pub struct RegexParser {
    re: Regex,
    trim: bool,
}

impl RegexParser {
    pub fn new(re: Regex) -> Self {
        Self { re, trim: true }
    }

    pub fn trim(mut self, trim: bool) -> Self {
        self.trim = trim;
        self
    }

    pub fn code_block() -> Self {
        let re = Regex::new(r"```(?:\w+)?\s*([\s\S]+?)\s*```").expect("Static regex is valid");
        Self::new(re)
    }

    pub fn sanitize<'a>(&self, output: &'a str) -> Result<&'a str, OutputParseError> {
        let captured = self
            .re
            .captures(output)
            .and_then(|cap| cap.get(1))
            .ok_or_else(|| OutputParseError::NoMatch {
                pattern: self.re.as_str().into(),
                output: output.into(),
            })?
            .as_str();

        if self.trim {
            Ok(captured.trim())
        } else {
            Ok(captured)
        }
    }
}

impl OutputParser for RegexParser {
    fn parse(&self, output: &str) -> Result<Value, OutputParseError> {
        self.sanitize(output).map(|text| Value::String(text.into()))
    }

    fn parser_type(&self) -> &str {
        "regex"
    }
}
