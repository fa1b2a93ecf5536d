use std::{fmt, str::FromStr, sync::Arc};

use serde_json::{json, Value};

use crate::{
    callbacks::CallbackHandler,
    language_models::LLM,
    schemas::{Document, PromptArgs},
    template::PromptTemplate,
};

use super::{
    stuff_qa_prompt_selector, ChainError, ChainInput, CombineDocumentsChain, LLMChain,
    PromptSelector, StuffDocumentsChain, DEFAULT_COMBINE_INPUT_KEY,
};

/// Document-combining strategies that [`load_qa_chain`] can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainType {
    Stuff,
}

impl ChainType {
    pub const ALL: [ChainType; 1] = [ChainType::Stuff];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChainType::Stuff => "stuff",
        }
    }

    fn load(
        &self,
        llm: Arc<dyn LLM>,
        options: QaChainOptions,
    ) -> Result<Box<dyn CombineDocumentsChain>, ChainError> {
        match self {
            ChainType::Stuff => Ok(Box::new(load_stuff_chain(llm, options)?)),
        }
    }
}

impl FromStr for ChainType {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|chain_type| chain_type.as_str() == s)
            .ok_or_else(|| ChainError::UnknownChainType {
                got: s.to_string(),
                known: Self::ALL.iter().map(|t| t.as_str().to_string()).collect(),
            })
    }
}

impl fmt::Display for ChainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for [`load_qa_chain`]. Unset fields fall back to the chain defaults.
#[derive(Clone)]
pub struct QaChainOptions {
    pub prompt: Option<PromptTemplate>,
    pub prompt_selector: Option<Arc<dyn PromptSelector>>,
    pub document_variable_name: String,
    pub document_prompt: Option<PromptTemplate>,
    pub document_separator: Option<String>,
    pub output_key: Option<String>,
    pub verbose: bool,
    pub callbacks: Vec<Arc<dyn CallbackHandler>>,
    pub tags: Vec<String>,
}

impl Default for QaChainOptions {
    fn default() -> Self {
        Self {
            prompt: None,
            prompt_selector: None,
            document_variable_name: "context".into(),
            document_prompt: None,
            document_separator: None,
            output_key: None,
            verbose: false,
            callbacks: Vec::new(),
            tags: Vec::new(),
        }
    }
}

impl QaChainOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prompt(mut self, prompt: impl Into<PromptTemplate>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_prompt_selector(mut self, selector: Arc<dyn PromptSelector>) -> Self {
        self.prompt_selector = Some(selector);
        self
    }

    pub fn with_document_variable_name<S: Into<String>>(mut self, name: S) -> Self {
        self.document_variable_name = name.into();
        self
    }

    pub fn with_document_prompt(mut self, document_prompt: impl Into<PromptTemplate>) -> Self {
        self.document_prompt = Some(document_prompt.into());
        self
    }

    pub fn with_document_separator<S: Into<String>>(mut self, separator: S) -> Self {
        self.document_separator = Some(separator.into());
        self
    }

    pub fn with_output_key<S: Into<String>>(mut self, output_key: S) -> Self {
        self.output_key = Some(output_key.into());
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_callback(mut self, handler: Arc<dyn CallbackHandler>) -> Self {
        self.callbacks.push(handler);
        self
    }

    pub fn with_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

fn load_stuff_chain(
    llm: Arc<dyn LLM>,
    options: QaChainOptions,
) -> Result<StuffDocumentsChain, ChainError> {
    let prompt = match (options.prompt, options.prompt_selector) {
        (Some(prompt), _) => prompt,
        (None, Some(selector)) => selector.get_prompt(llm.as_ref()),
        (None, None) => stuff_qa_prompt_selector().get_prompt(llm.as_ref()),
    };

    let llm_chain = LLMChain::builder()
        .prompt(prompt)
        .llm(llm)
        .verbose(options.verbose)
        .build()?;

    let mut builder = StuffDocumentsChain::builder()
        .llm_chain(llm_chain)
        .document_variable_name(options.document_variable_name)
        .callbacks(options.callbacks)
        .tags(options.tags)
        .verbose(options.verbose);
    if let Some(document_prompt) = options.document_prompt {
        builder = builder.document_prompt(document_prompt);
    }
    if let Some(separator) = options.document_separator {
        builder = builder.document_separator(separator);
    }
    if let Some(output_key) = options.output_key {
        builder = builder.output_key(output_key);
    }

    builder.build()
}

/// Load a question-answering chain of the given type (`"stuff"`).
///
/// # Example
/// ```rust,ignore
/// let chain = load_qa_chain(Arc::new(OpenAI::default()), "stuff", QaChainOptions::default())?;
/// let answer = chain
///     .run(RunArgs::from(StuffQA::new().documents(&docs).question("How old is Luis?").into_args()))
///     .await?;
/// ```
pub fn load_qa_chain(
    llm: Arc<dyn LLM>,
    chain_type: &str,
    options: QaChainOptions,
) -> Result<Box<dyn CombineDocumentsChain>, ChainError> {
    let chain_type = chain_type.parse::<ChainType>()?;
    log::debug!("Loading {chain_type} question answering chain");
    chain_type.load(llm, options)
}

/// Inputs for a question-answering chain: the documents and the question.
#[derive(Debug, Clone, Default)]
pub struct StuffQA {
    input_documents: Vec<Document>,
    question: String,
}

impl StuffQA {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(mut self, documents: &[Document]) -> Self {
        self.input_documents = documents.to_vec();
        self
    }

    pub fn question<S: Into<String>>(mut self, question: S) -> Self {
        self.question = question.into();
        self
    }

    pub fn into_args(self) -> PromptArgs {
        PromptArgs::from([
            (
                DEFAULT_COMBINE_INPUT_KEY.to_string(),
                json!(self.input_documents),
            ),
            ("question".to_string(), Value::String(self.question)),
        ])
    }
}

impl From<StuffQA> for PromptArgs {
    fn from(input: StuffQA) -> Self {
        input.into_args()
    }
}

impl From<StuffQA> for ChainInput {
    fn from(input: StuffQA) -> Self {
        ChainInput::Map(input.into_args())
    }
}
