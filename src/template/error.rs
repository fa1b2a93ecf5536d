use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Missing input variables: {0:?}")]
    MissingVariable(Vec<String>),

    #[error(
        "Document prompt requires documents to have metadata variables: {required:?}. \
         Received document with missing metadata: {missing:?}."
    )]
    MissingMetadata {
        required: Vec<String>,
        missing: Vec<String>,
    },
}
