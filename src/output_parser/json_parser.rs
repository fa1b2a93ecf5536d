use serde_json::Value;

use super::{extract_from_codeblock, OutputParseError, OutputParser};

/// Parses the output as JSON, tolerating a surrounding markdown code fence.
#[derive(Default)]
pub struct JsonParser;

impl OutputParser for JsonParser {
    fn parse(&self, output: &str) -> Result<Value, OutputParseError> {
        let json = extract_from_codeblock(output);
        serde_json::from_str(json).map_err(|e| OutputParseError::Deserialize(e, output.into()))
    }

    fn parser_type(&self) -> &str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parses_fenced_json() {
        let output = indoc! {r#"
        ```json
        {"answer": "24", "sources": ["bio.md"]}
        ```
        "#};

        assert_eq!(
            JsonParser.parse(output).unwrap(),
            json!({"answer": "24", "sources": ["bio.md"]})
        );
    }

    #[test]
    fn test_invalid_json_keeps_original() {
        match JsonParser.parse("not json") {
            Err(OutputParseError::Deserialize(_, original)) => assert_eq!(original, "not json"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
