use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputParseError {
    #[error("Deserialization error: {0}\nOriginal: {1}")]
    Deserialize(serde_json::Error, String),

    #[error("No match for pattern `{pattern}` in output: {output}")]
    NoMatch { pattern: String, output: String },

    #[error("Other error: {0}")]
    Other(String),
}
