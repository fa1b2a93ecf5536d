use std::sync::Arc;

use crate::{
    callbacks::CallbackHandler,
    chain::{
        stuff_qa_prompt_selector, ChainError, LLMChain, PromptSelector, DEFAULT_COMBINE_INPUT_KEY,
        DEFAULT_COMBINE_OUTPUT_KEY,
    },
    language_models::LLM,
    memory::SharedMemory,
    template::{default_document_prompt, PromptTemplate},
};

use super::{StuffDocumentsChain, STUFF_DOCUMENTS_DEFAULT_SEPARATOR};

/// Builds a [`StuffDocumentsChain`] either around an existing [`LLMChain`] or
/// from a model plus an optional prompt.
#[derive(Default)]
pub struct StuffDocumentsChainBuilder {
    llm_chain: Option<LLMChain>,
    llm: Option<Arc<dyn LLM>>,
    prompt: Option<PromptTemplate>,
    document_prompt: Option<PromptTemplate>,
    document_variable_name: Option<String>,
    document_separator: Option<String>,
    input_key: Option<String>,
    output_key: Option<String>,
    memory: Option<SharedMemory>,
    callbacks: Vec<Arc<dyn CallbackHandler>>,
    tags: Vec<String>,
    verbose: bool,
}

impl StuffDocumentsChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn llm_chain(mut self, llm_chain: LLMChain) -> Self {
        self.llm_chain = Some(llm_chain);
        self
    }

    /// Used when no `llm_chain` is given.
    pub fn llm(mut self, llm: Arc<dyn LLM>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Prompt for the inner chain when building from `llm`. Defaults to the
    /// question-answering prompt for the model kind.
    pub fn prompt(mut self, prompt: impl Into<PromptTemplate>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn document_prompt(mut self, document_prompt: impl Into<PromptTemplate>) -> Self {
        self.document_prompt = Some(document_prompt.into());
        self
    }

    pub fn document_variable_name<S: Into<String>>(mut self, name: S) -> Self {
        self.document_variable_name = Some(name.into());
        self
    }

    pub fn document_separator<S: Into<String>>(mut self, separator: S) -> Self {
        self.document_separator = Some(separator.into());
        self
    }

    pub fn input_key<S: Into<String>>(mut self, input_key: S) -> Self {
        self.input_key = Some(input_key.into());
        self
    }

    pub fn output_key<S: Into<String>>(mut self, output_key: S) -> Self {
        self.output_key = Some(output_key.into());
        self
    }

    pub fn memory(mut self, memory: SharedMemory) -> Self {
        self.memory = Some(memory);
        self
    }

    pub fn callback(mut self, handler: Arc<dyn CallbackHandler>) -> Self {
        self.callbacks.push(handler);
        self
    }

    pub fn callbacks(mut self, handlers: Vec<Arc<dyn CallbackHandler>>) -> Self {
        self.callbacks = handlers;
        self
    }

    pub fn tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn build(self) -> Result<StuffDocumentsChain, ChainError> {
        let llm_chain = match self.llm_chain {
            Some(llm_chain) => llm_chain,
            None => {
                let llm = self.llm.ok_or_else(|| {
                    ChainError::MissingObject("LLM or LLMChain must be set".into())
                })?;
                let prompt = self
                    .prompt
                    .unwrap_or_else(|| stuff_qa_prompt_selector().get_prompt(llm.as_ref()));

                LLMChain::builder()
                    .prompt(prompt)
                    .llm(llm)
                    .verbose(self.verbose)
                    .build()?
            }
        };

        let llm_chain_variables = llm_chain.prompt().variables();
        let document_variable_name = match self.document_variable_name {
            Some(name) => {
                if !llm_chain_variables.contains(&name) {
                    return Err(ChainError::InvalidDocumentVariable {
                        name,
                        variables: llm_chain_variables.to_vec(),
                    });
                }
                name
            }
            None => match llm_chain_variables {
                [only] => only.clone(),
                _ => {
                    return Err(ChainError::AmbiguousDocumentVariable(
                        llm_chain_variables.to_vec(),
                    ))
                }
            },
        };

        Ok(StuffDocumentsChain {
            llm_chain,
            document_prompt: self.document_prompt.unwrap_or_else(default_document_prompt),
            document_variable_name,
            document_separator: self
                .document_separator
                .unwrap_or_else(|| STUFF_DOCUMENTS_DEFAULT_SEPARATOR.into()),
            input_key: self
                .input_key
                .unwrap_or_else(|| DEFAULT_COMBINE_INPUT_KEY.into()),
            output_key: self
                .output_key
                .unwrap_or_else(|| DEFAULT_COMBINE_OUTPUT_KEY.into()),
            memory: self.memory,
            callbacks: self.callbacks,
            tags: self.tags,
            verbose: self.verbose,
        })
    }
}
