use std::{
    fmt,
    sync::{Arc, OnceLock},
};

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    output_parser::OutputParser,
    schemas::{value_to_text, Prompt, PromptArgs},
    template::TemplateError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateFormat {
    /// `{variable}` placeholders. `{{` and `}}` render as literal braces.
    #[serde(rename = "f-string")]
    FString,
    /// `{{variable}}` placeholders.
    #[serde(rename = "jinja2")]
    Jinja2,
}

impl TemplateFormat {
    fn placeholder_regex(&self) -> &'static Regex {
        static FSTRING: OnceLock<Regex> = OnceLock::new();
        static JINJA2: OnceLock<Regex> = OnceLock::new();

        match self {
            TemplateFormat::FString => FSTRING
                .get_or_init(|| Regex::new(r"\{\{|\}\}|\{(\w+)\}").expect("Static regex is valid")),
            TemplateFormat::Jinja2 => JINJA2.get_or_init(|| {
                Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("Static regex is valid")
            }),
        }
    }
}

/// A text template with an ordered set of required variables.
#[derive(Clone)]
pub struct PromptTemplate {
    template: String,
    variables: Vec<String>,
    format: TemplateFormat,
    output_parser: Option<Arc<dyn OutputParser>>,
}

impl PromptTemplate {
    pub fn new(
        template: impl Into<String>,
        variables: impl IntoIterator<Item = impl Into<String>>,
        format: TemplateFormat,
    ) -> Self {
        let mut unique = Vec::new();
        for variable in variables {
            let variable = variable.into();
            if !unique.contains(&variable) {
                unique.push(variable);
            }
        }

        Self {
            template: template.into(),
            variables: unique,
            format,
            output_parser: None,
        }
    }

    /// Build a template from `{variable}` syntax. Variables are collected in order
    /// of first appearance.
    pub fn from_fstring(content: impl Into<String>) -> Self {
        Self::infer(content.into(), TemplateFormat::FString)
    }

    /// Build a template from `{{variable}}` syntax.
    pub fn from_jinja2(content: impl Into<String>) -> Self {
        Self::infer(content.into(), TemplateFormat::Jinja2)
    }

    fn infer(content: String, format: TemplateFormat) -> Self {
        let variables = format
            .placeholder_regex()
            .captures_iter(&content)
            .filter_map(|cap| cap.get(1).map(|name| name.as_str().to_string()))
            .collect::<Vec<_>>();

        Self::new(content, variables, format)
    }

    /// Attach a parser used by `LLMChain::predict_and_parse` to structure the raw output.
    pub fn with_output_parser(mut self, output_parser: impl OutputParser + 'static) -> Self {
        self.output_parser = Some(Arc::new(output_parser));
        self
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn template_format(&self) -> TemplateFormat {
        self.format
    }

    /// Returns the required input variable names, in declaration order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn output_parser(&self) -> Option<&dyn OutputParser> {
        self.output_parser.as_deref()
    }

    pub fn validate_input(&self, input: &PromptArgs) -> Result<(), TemplateError> {
        let missing_variables = self
            .variables
            .iter()
            .filter(|variable| !input.contains_key(variable.as_str()))
            .cloned()
            .collect::<Vec<_>>();

        if !missing_variables.is_empty() {
            return Err(TemplateError::MissingVariable(missing_variables));
        }

        Ok(())
    }

    /// Substitute the template's variables. Keys in `input` that the template does
    /// not declare are ignored.
    pub fn format(&self, input: &PromptArgs) -> Result<String, TemplateError> {
        self.validate_input(input)?;

        let rendered = self
            .format
            .placeholder_regex()
            .replace_all(&self.template, |caps: &Captures| {
                // Escaped brace in an f-string.
                let Some(name) = caps.get(1).map(|name| name.as_str()) else {
                    return caps[0][..1].to_string();
                };
                match input.get(name) {
                    Some(value) if self.variables.iter().any(|v| v == name) => {
                        value_to_text(value).into_owned()
                    }
                    _ => caps[0].to_string(),
                }
            });

        Ok(rendered.into_owned())
    }

    pub fn format_prompt(&self, input: &PromptArgs) -> Result<Prompt, TemplateError> {
        self.format(input).map(Prompt::new)
    }

    pub fn to_config(&self) -> Value {
        json!({
            "_type": "prompt",
            "input_variables": self.variables,
            "template": self.template,
            "template_format": self.format,
            "output_parser": self.output_parser.as_ref().map(|p| p.parser_type()),
        })
    }
}

impl fmt::Debug for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptTemplate")
            .field("template", &self.template)
            .field("variables", &self.variables)
            .field("format", &self.format)
            .field(
                "output_parser",
                &self.output_parser.as_ref().map(|p| p.parser_type()),
            )
            .finish()
    }
}

impl From<&str> for PromptTemplate {
    fn from(template: &str) -> Self {
        Self::from_fstring(template)
    }
}

impl From<String> for PromptTemplate {
    fn from(template: String) -> Self {
        Self::from_fstring(template)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{output_parser::ListParser, prompt_args};

    use super::*;

    #[test]
    fn test_fstring_template() {
        let template = PromptTemplate::from_fstring("Hello {name}, how are you?");

        let input = prompt_args! { "name" => "Alice" };

        let prompt = template.format(&input).unwrap();
        assert_eq!(prompt, "Hello Alice, how are you?");
    }

    #[test]
    fn test_jinja2_template() {
        let template = PromptTemplate::from_jinja2("Hello {{name}}, how are you? {{ mood }}");

        let input = prompt_args! { "name" => "Alice", "mood" => "Great." };

        let prompt = template.format(&input).unwrap();
        assert_eq!(prompt, "Hello Alice, how are you? Great.");
    }

    #[test]
    fn test_variables_keep_first_appearance_order() {
        let template = PromptTemplate::from_fstring("{question} {context} {question}");
        assert_eq!(template.variables(), ["question", "context"]);
    }

    #[test]
    fn test_duplicate_variable_is_substituted_everywhere() {
        let template =
            PromptTemplate::from_fstring("Hello {name}, how are you? Nice to meet you {name}!");

        let prompt = template.format(&prompt_args! { "name" => "Alice" }).unwrap();
        assert_eq!(prompt, "Hello Alice, how are you? Nice to meet you Alice!");
    }

    #[test]
    fn test_missing_variable_is_reported() {
        let template = PromptTemplate::from_fstring("{context}\n\nQuestion: {question}");

        let err = template
            .format(&prompt_args! { "context" => "docs" })
            .unwrap_err();
        match err {
            TemplateError::MissingVariable(missing) => assert_eq!(missing, vec!["question"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_substituted_values_are_not_reparsed() {
        let template = PromptTemplate::from_fstring("{a} and {b}");
        let prompt = template
            .format(&prompt_args! { "a" => "{b}", "b" => "beta" })
            .unwrap();
        assert_eq!(prompt, "{b} and beta");
    }

    #[test]
    fn test_fstring_doubled_braces_are_literal() {
        let template = PromptTemplate::from_fstring("Answer as {{\"{key}\": value}} or {{{key}}}");
        assert_eq!(template.variables(), ["key"]);

        let prompt = template.format(&prompt_args! { "key" => "age" }).unwrap();
        assert_eq!(prompt, r#"Answer as {"age": value} or {age}"#);

        let escaped = PromptTemplate::from_fstring("Use {{name}} here");
        assert!(escaped.variables().is_empty());
        assert_eq!(escaped.format(&PromptArgs::new()).unwrap(), "Use {name} here");
    }

    #[test]
    fn test_non_string_values_render_as_json() {
        let template = PromptTemplate::from_fstring("n={n} tags={tags}");
        let prompt = template
            .format(&prompt_args! { "n" => 3, "tags" => ["a", "b"] })
            .unwrap();
        assert_eq!(prompt, r#"n=3 tags=["a","b"]"#);
    }

    #[test]
    fn test_to_config() {
        let template = PromptTemplate::from_fstring("Tell me a {adjective} joke")
            .with_output_parser(ListParser::default());

        assert_eq!(
            template.to_config(),
            json!({
                "_type": "prompt",
                "input_variables": ["adjective"],
                "template": "Tell me a {adjective} joke",
                "template_format": "f-string",
                "output_parser": "list",
            })
        );
    }
}
