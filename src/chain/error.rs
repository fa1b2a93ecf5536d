use std::path::PathBuf;

use thiserror::Error;

use crate::{
    language_models::LLMError, output_parser::OutputParseError, template::TemplateError,
};

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("LLM error: {0}")]
    LLMError(#[from] LLMError),

    #[error("Output parse error: {0}")]
    OutputParseError(#[from] OutputParseError),

    #[error("Prompt error: {0}")]
    PromptError(#[from] TemplateError),

    #[error("A single input value was passed but the chain expects multiple inputs: {0:?}")]
    AmbiguousInput(Vec<String>),

    #[error("Missing some input keys: {0:?}")]
    MissingInputKeys(Vec<String>),

    #[error("Missing some output keys: {0:?}")]
    MissingOutputKeys(Vec<String>),

    #[error("`run` is only supported for chains with one output key, got {0:?}")]
    MultipleOutputKeys(Vec<String>),

    #[error("Invalid call: {0}")]
    InvalidCall(String),

    #[error("If `stop` is present in any input, it must be present and identical in all of them; input {index} has {got:?}, expected {expected:?}")]
    InconsistentStopTokens {
        index: usize,
        expected: Option<Vec<String>>,
        got: Option<Vec<String>>,
    },

    #[error("document_variable_name must be provided when the prompt has several variables: {0:?}")]
    AmbiguousDocumentVariable(Vec<String>),

    #[error("document_variable_name `{name}` was not found in prompt variables {variables:?}")]
    InvalidDocumentVariable { name: String, variables: Vec<String> },

    #[error("Got unsupported chain type: {got}. Should be one of {known:?}")]
    UnknownChainType { got: String, known: Vec<String> },

    #[error("{} must be json or yaml", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Saving of memory is not yet supported")]
    UnsavedMemory,

    #[error("Chain does not support saving")]
    SaveNotSupported,

    #[error("Invalid value for input `{key}`: {reason}")]
    InvalidInput { key: String, reason: String },

    #[error("Missing object: {0}")]
    MissingObject(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
