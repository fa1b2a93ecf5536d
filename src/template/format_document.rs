use serde_json::Value;

use crate::{
    schemas::{Document, PromptArgs},
    template::{PromptTemplate, TemplateError},
};

/// Variable under which a document's content is exposed to a document prompt.
pub const DOCUMENT_CONTENT_KEY: &str = "page_content";

/// The prompt used to render a document when none is configured: the raw content.
pub fn default_document_prompt() -> PromptTemplate {
    PromptTemplate::from_fstring(format!("{{{DOCUMENT_CONTENT_KEY}}}"))
}

/// Format a document into a string based on a prompt template.
///
/// The template may reference `page_content` and any key of the document's
/// metadata. Extra metadata is ignored; a referenced key the document does not
/// carry is an error naming exactly what is missing.
pub fn format_document(document: &Document, prompt: &PromptTemplate) -> Result<String, TemplateError> {
    let mut base_info = PromptArgs::with_capacity(document.metadata.len() + 1);
    base_info.insert(
        DOCUMENT_CONTENT_KEY.into(),
        Value::String(document.page_content.clone()),
    );
    base_info.extend(
        document
            .metadata
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );

    let mut missing_metadata = prompt
        .variables()
        .iter()
        .filter(|variable| !base_info.contains_key(variable.as_str()))
        .cloned()
        .collect::<Vec<_>>();

    if !missing_metadata.is_empty() {
        missing_metadata.sort();
        let required_metadata = prompt
            .variables()
            .iter()
            .filter(|variable| variable.as_str() != DOCUMENT_CONTENT_KEY)
            .cloned()
            .collect();

        return Err(TemplateError::MissingMetadata {
            required: required_metadata,
            missing: missing_metadata,
        });
    }

    let document_info = prompt
        .variables()
        .iter()
        .filter_map(|variable| base_info.remove_entry(variable.as_str()))
        .collect::<PromptArgs>();

    prompt.format(&document_info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompt_echoes_content() {
        let doc = Document::new("raw content").with_metadata_entry("source", "a.txt");
        let formatted = format_document(&doc, &default_document_prompt()).unwrap();
        assert_eq!(formatted, "raw content");
    }

    #[test]
    fn test_metadata_is_substituted_and_extras_ignored() {
        let prompt = PromptTemplate::from_fstring("[{source}, p.{page}] {page_content}");
        let doc = Document::new("Luis is 24")
            .with_metadata_entry("source", "bio.md")
            .with_metadata_entry("page", 7)
            .with_metadata_entry("unused", true);

        let formatted = format_document(&doc, &prompt).unwrap();
        assert_eq!(formatted, "[bio.md, p.7] Luis is 24");
    }

    #[test]
    fn test_missing_metadata_names_exact_keys() {
        let prompt = PromptTemplate::from_fstring("{title} ({year}) by {author}: {page_content}");
        let doc = Document::new("text").with_metadata_entry("author", "Verne");

        let err = format_document(&doc, &prompt).unwrap_err();
        match err {
            TemplateError::MissingMetadata { required, missing } => {
                assert_eq!(required, vec!["title", "year", "author"]);
                assert_eq!(missing, vec!["title", "year"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_metadata_may_shadow_page_content() {
        let prompt = default_document_prompt();
        let doc = Document::new("original").with_metadata_entry(DOCUMENT_CONTENT_KEY, "override");

        assert_eq!(format_document(&doc, &prompt).unwrap(), "override");
    }
}
