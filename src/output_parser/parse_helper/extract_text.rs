use std::sync::OnceLock;

use regex::Regex;

/// Strip a leading and/or trailing markdown code fence, if present.
pub fn extract_from_codeblock(json_markdown: &str) -> &str {
    static FENCE_START: OnceLock<Regex> = OnceLock::new();
    static FENCE_END: OnceLock<Regex> = OnceLock::new();

    let re_single_start = FENCE_START
        .get_or_init(|| Regex::new(r"^\s*```[\w+-]*").expect("Static regex is valid"));
    let re_single_end =
        FENCE_END.get_or_init(|| Regex::new(r"```\s*$").expect("Static regex is valid"));

    let start = re_single_start
        .find_iter(json_markdown)
        .find_map(|m| (m.start() == 0).then_some(m.end()))
        .unwrap_or(0);

    let end = re_single_end
        .find_iter(json_markdown)
        .find_map(|m| (m.end() == json_markdown.len()).then_some(m.start()))
        .unwrap_or(json_markdown.len());

    if start > end {
        return json_markdown.trim();
    }

    json_markdown[start..end].trim()
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn test_extract_from_codeblock() {
        let text = indoc! {r#"
        ```json
        {
            "key": "value"
        }
        ```
        "#};
        let result = extract_from_codeblock(text);
        let expected = indoc! {r#"
            {
                "key": "value"
            }"#
        };
        assert_eq!(result, expected);

        let text = indoc! {r#"
        ```json
        {
            "key": "value"
        }
        "#};
        let result = extract_from_codeblock(text);
        assert_eq!(result, expected);

        let text = indoc! {r#"
        {
            "key": "value"
        }
        ```"#};
        let result = extract_from_codeblock(text);
        assert_eq!(result, expected);
    }

    #[test]
    fn test_plain_text_is_only_trimmed() {
        assert_eq!(extract_from_codeblock("  [1, 2]\n"), "[1, 2]");
    }
}
