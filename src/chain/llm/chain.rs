use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::{
    callbacks::{CallbackHandler, CallbackManager, CallbackManagerForChainRun},
    chain::{Chain, ChainCallOptions, ChainError, ChainInput},
    language_models::{LLMError, LLM},
    memory::SharedMemory,
    schemas::{value_to_text, GenerateResult, Prompt, PromptArgs},
    template::PromptTemplate,
};

use super::LLMChainBuilder;

pub const DEFAULT_LLM_OUTPUT_KEY: &str = "text";

/// Optional input carrying the stop sequences for a call.
pub const STOP_KEY: &str = "stop";

/// Formats a prompt from its inputs and asks the model to complete it.
pub struct LLMChain {
    pub(super) prompt: PromptTemplate,
    pub(super) llm: Arc<dyn LLM>,
    pub(super) output_key: String,
    pub(super) memory: Option<SharedMemory>,
    pub(super) callbacks: Vec<Arc<dyn CallbackHandler>>,
    pub(super) tags: Vec<String>,
    pub(super) verbose: bool,
}

impl LLMChain {
    pub fn builder() -> LLMChainBuilder {
        LLMChainBuilder::new()
    }

    /// Build a chain from a `{variable}` template.
    pub fn from_string(llm: Arc<dyn LLM>, template: &str) -> Self {
        Self {
            prompt: PromptTemplate::from_fstring(template),
            llm,
            output_key: DEFAULT_LLM_OUTPUT_KEY.into(),
            memory: None,
            callbacks: Vec::new(),
            tags: Vec::new(),
            verbose: false,
        }
    }

    pub fn prompt(&self) -> &PromptTemplate {
        &self.prompt
    }

    pub fn llm(&self) -> &Arc<dyn LLM> {
        &self.llm
    }

    pub fn output_key(&self) -> &str {
        &self.output_key
    }

    /// Render one prompt per input and collect the batch-wide stop sequences.
    ///
    /// Stop sequences are shared by the whole batch: if any input carries
    /// `stop`, all of them must carry the same list.
    pub fn prep_prompts(
        &self,
        input_list: &[PromptArgs],
        run_manager: Option<&CallbackManagerForChainRun>,
    ) -> Result<(Vec<Prompt>, Option<Vec<String>>), ChainError> {
        let mut stop = None;
        let mut prompts = Vec::with_capacity(input_list.len());

        for (index, inputs) in input_list.iter().enumerate() {
            let this_stop = stop_from_inputs(inputs)?;
            if index == 0 {
                stop = this_stop;
            } else if this_stop != stop {
                return Err(ChainError::InconsistentStopTokens {
                    index,
                    expected: stop,
                    got: this_stop,
                });
            }

            let prompt = self.prompt.format_prompt(inputs)?;
            log::debug!("Prompt after formatting:\n{prompt}");
            if let Some(run_manager) = run_manager {
                run_manager.on_text(&format!("Prompt after formatting:\n{prompt}"));
            }
            prompts.push(prompt);
        }

        Ok((prompts, stop))
    }

    /// Submit every input's prompt in a single model call.
    pub async fn generate(
        &self,
        input_list: &[PromptArgs],
        run_manager: Option<&CallbackManagerForChainRun>,
    ) -> Result<GenerateResult, ChainError> {
        if input_list.is_empty() {
            return Ok(GenerateResult::default());
        }

        let (prompts, stop) = self.prep_prompts(input_list, run_manager)?;
        let result = self.llm.generate(&prompts, stop.as_deref()).await?;

        if result.generations.len() != prompts.len() {
            return Err(LLMError::GenerationCountMismatch {
                expected: prompts.len(),
                got: result.generations.len(),
            }
            .into());
        }

        log::trace!("\nLLM output:\n{result}");
        if let Some(usage) = &result.usage {
            log::trace!("\nToken usage:\n{usage}");
        }

        Ok(result)
    }

    /// Map each prompt's top generation to `{output_key: text}`.
    pub fn create_outputs(&self, result: &GenerateResult) -> Result<Vec<PromptArgs>, ChainError> {
        result
            .generations
            .iter()
            .map(|generations| -> Result<PromptArgs, ChainError> {
                let generation = generations.first().ok_or_else(|| {
                    LLMError::ContentNotFound("Model returned no generation for a prompt".into())
                })?;
                Ok(PromptArgs::from([(
                    self.output_key.clone(),
                    Value::String(generation.text.clone()),
                )]))
            })
            .collect()
    }

    /// Run a list of inputs through one model call, as one callback run.
    pub async fn batch(
        &self,
        input_list: &[PromptArgs],
        callbacks: Option<CallbackManager>,
    ) -> Result<Vec<PromptArgs>, ChainError> {
        let callback_manager =
            CallbackManager::configure(callbacks.as_ref(), &self.callbacks, self.verbose, &self.tags);
        let run_manager = callback_manager.on_chain_start(
            &self.serialized(),
            &PromptArgs::from([("input_list".to_string(), args_list_to_value(input_list))]),
        );

        let outputs = match self
            .generate(input_list, Some(&run_manager))
            .await
            .and_then(|result| self.create_outputs(&result))
        {
            Ok(outputs) => outputs,
            Err(e) => {
                run_manager.on_chain_error(&e);
                return Err(e);
            }
        };

        run_manager.on_chain_end(&PromptArgs::from([(
            "outputs".to_string(),
            args_list_to_value(&outputs),
        )]));

        Ok(outputs)
    }

    /// Format the prompt with `inputs` and return the raw completion.
    pub async fn predict(&self, inputs: PromptArgs) -> Result<String, ChainError> {
        let outputs = self
            .call(ChainInput::Map(inputs), ChainCallOptions::default())
            .await?;

        let text = outputs
            .get(&self.output_key)
            .ok_or_else(|| ChainError::MissingOutputKeys(vec![self.output_key.clone()]))?;
        Ok(value_to_text(text).into_owned())
    }

    /// Like [`LLMChain::predict`], then run the prompt's output parser if it has one.
    pub async fn predict_and_parse(&self, inputs: PromptArgs) -> Result<Value, ChainError> {
        let text = self.predict(inputs).await?;
        self.parse_text(&text)
    }

    pub async fn apply_and_parse(&self, input_list: &[PromptArgs]) -> Result<Vec<Value>, ChainError> {
        self.batch(input_list, None)
            .await?
            .iter()
            .map(|outputs| {
                let text = outputs
                    .get(&self.output_key)
                    .map(value_to_text)
                    .unwrap_or_default();
                self.parse_text(&text)
            })
            .collect()
    }

    fn parse_text(&self, text: &str) -> Result<Value, ChainError> {
        match self.prompt.output_parser() {
            Some(parser) => Ok(parser.parse(text)?),
            None => Ok(Value::String(text.to_string())),
        }
    }
}

fn stop_from_inputs(inputs: &PromptArgs) -> Result<Option<Vec<String>>, ChainError> {
    inputs
        .get(STOP_KEY)
        .filter(|value| !value.is_null())
        .map(|value| {
            serde_json::from_value::<Vec<String>>(value.clone()).map_err(|_| {
                ChainError::InvalidInput {
                    key: STOP_KEY.into(),
                    reason: format!("expected a list of strings, got {value}"),
                }
            })
        })
        .transpose()
}

fn args_list_to_value(list: &[PromptArgs]) -> Value {
    Value::Array(
        list.iter()
            .map(|args| Value::Object(args.clone().into_iter().collect()))
            .collect(),
    )
}

#[async_trait]
impl Chain for LLMChain {
    fn input_keys(&self) -> Vec<String> {
        self.prompt.variables().to_vec()
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
        Some("llm_chain")
    }

    fn to_config(&self) -> Map<String, Value> {
        let mut config = Map::new();
        config.insert("prompt".into(), self.prompt.to_config());
        config.insert("llm".into(), self.llm.to_config());
        config.insert("output_key".into(), json!(self.output_key));
        config.insert("verbose".into(), json!(self.verbose));
        config.insert("tags".into(), json!(self.tags));
        config
    }

    async fn call_impl(
        &self,
        inputs: &PromptArgs,
        run_manager: &CallbackManagerForChainRun,
    ) -> Result<PromptArgs, ChainError> {
        let result = self
            .generate(std::slice::from_ref(inputs), Some(run_manager))
            .await?;

        self.create_outputs(&result)?
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::ContentNotFound("Model returned no generations".into()).into())
    }
}
