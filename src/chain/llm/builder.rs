use std::sync::Arc;

use crate::{
    callbacks::CallbackHandler,
    chain::ChainError,
    language_models::LLM,
    memory::SharedMemory,
    template::PromptTemplate,
};

use super::{LLMChain, DEFAULT_LLM_OUTPUT_KEY};

#[derive(Default)]
pub struct LLMChainBuilder {
    prompt: Option<PromptTemplate>,
    llm: Option<Arc<dyn LLM>>,
    output_key: Option<String>,
    memory: Option<SharedMemory>,
    callbacks: Vec<Arc<dyn CallbackHandler>>,
    tags: Vec<String>,
    verbose: bool,
}

impl LLMChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prompt(mut self, prompt: impl Into<PromptTemplate>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn llm(mut self, llm: Arc<dyn LLM>) -> Self {
        self.llm = Some(llm);
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

    pub fn build(self) -> Result<LLMChain, ChainError> {
        let prompt = self
            .prompt
            .ok_or_else(|| ChainError::MissingObject("Prompt must be set".into()))?;

        let llm = self
            .llm
            .ok_or_else(|| ChainError::MissingObject("LLM must be set".into()))?;

        let chain = LLMChain {
            prompt,
            llm,
            output_key: self
                .output_key
                .unwrap_or_else(|| DEFAULT_LLM_OUTPUT_KEY.to_string()),
            memory: self.memory,
            callbacks: self.callbacks,
            tags: self.tags,
            verbose: self.verbose,
        };

        Ok(chain)
    }
}
