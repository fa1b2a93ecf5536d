use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::{
    callbacks::{CallbackHandler, CallbackManagerForChainRun},
    chain::{
        call_combine_documents, Chain, ChainCallOptions, ChainError, ChainInput,
        CombineDocumentsChain, LLMChain,
    },
    language_models::LLM,
    memory::SharedMemory,
    schemas::{value_to_text, Document, PromptArgs},
    template::{format_document, PromptTemplate},
};

use super::StuffDocumentsChainBuilder;

/// Formats every document, joins them, and passes the result to an [`LLMChain`]
/// as one prompt variable.
pub struct StuffDocumentsChain {
    pub(super) llm_chain: LLMChain,
    pub(super) document_prompt: PromptTemplate,
    pub(super) document_variable_name: String,
    pub(super) document_separator: String,
    pub(super) input_key: String,
    pub(super) output_key: String,
    pub(super) memory: Option<SharedMemory>,
    pub(super) callbacks: Vec<Arc<dyn CallbackHandler>>,
    pub(super) tags: Vec<String>,
    pub(super) verbose: bool,
}

impl StuffDocumentsChain {
    pub fn builder() -> StuffDocumentsChainBuilder {
        StuffDocumentsChainBuilder::new()
    }

    /// A question-answering chain over `{context}` and `{question}`, with the
    /// prompt chosen for the model kind.
    ///
    /// # Example
    /// ```rust,ignore
    /// let chain = StuffDocumentsChain::load_stuff_qa(Arc::new(OpenAI::default()))?;
    ///
    /// let input = StuffQA::new()
    ///     .documents(&[
    ///         Document::new("Question: Which is the favorite text editor of luis\nAnswer: Nvim"),
    ///         Document::new("Question: How old is luis\nAnswer: 24"),
    ///     ])
    ///     .question("How old is luis and whats his favorite text editor");
    ///
    /// let output = chain.invoke(input.into()).await?;
    /// println!("{}", output["output_text"]);
    /// ```
    pub fn load_stuff_qa(llm: Arc<dyn LLM>) -> Result<Self, ChainError> {
        Self::builder()
            .llm(llm)
            .document_variable_name("context")
            .build()
    }

    pub fn llm_chain(&self) -> &LLMChain {
        &self.llm_chain
    }

    pub fn document_variable_name(&self) -> &str {
        &self.document_variable_name
    }

    /// Inputs for the inner chain: the keys its prompt needs plus the joined documents.
    fn get_inputs(&self, docs: &[Document], inputs: &PromptArgs) -> Result<PromptArgs, ChainError> {
        let doc_strings = docs
            .iter()
            .map(|doc| format_document(doc, &self.document_prompt))
            .collect::<Result<Vec<_>, _>>()?;

        let prompt_variables = self.llm_chain.prompt().variables();
        let mut llm_inputs = inputs
            .iter()
            .filter(|(key, _)| prompt_variables.contains(*key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect::<PromptArgs>();

        llm_inputs.insert(
            self.document_variable_name.clone(),
            Value::String(doc_strings.join(&self.document_separator)),
        );

        Ok(llm_inputs)
    }
}

#[async_trait]
impl CombineDocumentsChain for StuffDocumentsChain {
    fn input_key(&self) -> &str {
        &self.input_key
    }

    fn output_key(&self) -> &str {
        &self.output_key
    }

    async fn combine_docs(
        &self,
        docs: &[Document],
        inputs: &PromptArgs,
        run_manager: &CallbackManagerForChainRun,
    ) -> Result<(String, PromptArgs), ChainError> {
        let llm_inputs = self.get_inputs(docs, inputs)?;

        let outputs = self
            .llm_chain
            .call(
                ChainInput::Map(llm_inputs),
                ChainCallOptions::new()
                    .with_return_only_outputs(true)
                    .with_callbacks(run_manager.get_child()),
            )
            .await?;

        let output = outputs
            .get(self.llm_chain.output_key())
            .map(|value| value_to_text(value).into_owned())
            .ok_or_else(|| {
                ChainError::MissingOutputKeys(vec![self.llm_chain.output_key().to_string()])
            })?;

        Ok((output, PromptArgs::new()))
    }

    fn prompt_length(
        &self,
        docs: &[Document],
        inputs: &PromptArgs,
    ) -> Result<Option<usize>, ChainError> {
        let llm_inputs = self.get_inputs(docs, inputs)?;
        let prompt = self.llm_chain.prompt().format(&llm_inputs)?;
        Ok(self.llm_chain.llm().get_num_tokens(&prompt))
    }
}

#[async_trait]
impl Chain for StuffDocumentsChain {
    fn input_keys(&self) -> Vec<String> {
        vec![self.input_key.clone()]
    }

    fn output_keys(&self) -> Vec<String> {
        vec![self.output_key.clone()]
    }

    fn memory(&self) -> Option<&SharedMemory> {
        self.memory.as_ref()
    }

    fn callbacks(&self) -> &[Arc<dyn CallbackHandler>] {
        &self.callbacks
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn verbose(&self) -> bool {
        self.verbose
    }

    fn chain_type(&self) -> Option<&str> {
        Some("stuff_documents_chain")
    }

    fn to_config(&self) -> Map<String, Value> {
        let mut config = Map::new();
        config.insert("llm_chain".into(), self.llm_chain.serialized());
        config.insert("document_prompt".into(), self.document_prompt.to_config());
        config.insert(
            "document_variable_name".into(),
            json!(self.document_variable_name),
        );
        config.insert("document_separator".into(), json!(self.document_separator));
        config.insert("input_key".into(), json!(self.input_key));
        config.insert("output_key".into(), json!(self.output_key));
        config.insert("verbose".into(), json!(self.verbose));
        config
    }

    async fn call_impl(
        &self,
        inputs: &PromptArgs,
        run_manager: &CallbackManagerForChainRun,
    ) -> Result<PromptArgs, ChainError> {
        call_combine_documents(self, inputs, run_manager).await
    }
}
