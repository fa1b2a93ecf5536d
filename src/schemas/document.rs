use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A unit of retrieved content together with the metadata the retriever attached to it.
///
/// Documents travel through chains as JSON values, so they can be placed directly
/// into [`PromptArgs`](super::PromptArgs):
///
/// ```rust,ignore
/// let docs = vec![Document::new("Luis is 24"), Document::new("Luis uses Nvim")];
/// let input = prompt_args! {
///     "input_documents" => docs,
///     "question" => "How old is Luis?",
/// };
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub page_content: String,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl Document {
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_metadata_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_document_deserializes_without_metadata() {
        let doc: Document = serde_json::from_value(json!({ "page_content": "hello" })).unwrap();
        assert_eq!(doc, Document::new("hello"));
    }

    #[test]
    fn test_document_metadata_builder() {
        let doc = Document::new("body")
            .with_metadata_entry("source", "wiki")
            .with_metadata_entry("page", 3);

        assert_eq!(doc.metadata.get("source"), Some(&json!("wiki")));
        assert_eq!(doc.metadata.get("page"), Some(&json!(3)));
    }
}
