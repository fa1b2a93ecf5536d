pub use async_openai::config::{AzureConfig, Config, OpenAIConfig};

use async_openai::{
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, Stop,
    },
    Client,
};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{
    language_models::{options::CallOptions, LLMError, LLM},
    schemas::{GenerateResult, Generation, Prompt, TokenUsage},
};

use super::{
    helper::{generation_info, select_choice},
    OpenAIModel,
};

/// Chat-completions backed model. Each prompt is sent as a single user message.
#[derive(Clone)]
pub struct OpenAI<C: Config> {
    config: C,
    options: CallOptions,
    model: String,
}

impl<C: Config> OpenAI<C> {
    pub fn new(config: C) -> Self {
        Self {
            config,
            options: CallOptions::default(),
            model: OpenAIModel::Gpt4oMini.to_string(),
        }
    }

    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_config(mut self, config: C) -> Self {
        self.config = config;
        self
    }

    pub fn with_options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }

    pub fn add_options(&mut self, options: CallOptions) {
        self.options.merge_options(options)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(
        &self,
        prompt: &Prompt,
        stop: Option<&[String]>,
    ) -> Result<CreateChatCompletionRequest, LLMError> {
        let message: ChatCompletionRequestMessage = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt.as_str())
            .build()?
            .into();

        let mut request = CreateChatCompletionRequestArgs::default();
        request.model(&self.model).messages(vec![message]);

        if let Some(max_tokens) = self.options.max_tokens {
            request.max_completion_tokens(max_tokens);
        }
        if let Some(temperature) = self.options.temperature {
            request.temperature(temperature);
        }
        if let Some(top_p) = self.options.top_p {
            request.top_p(top_p);
        }
        if let Some(seed) = self.options.seed {
            request.seed(seed);
        }
        if let Some(frequency_penalty) = self.options.frequency_penalty {
            request.frequency_penalty(frequency_penalty);
        }
        if let Some(presence_penalty) = self.options.presence_penalty {
            request.presence_penalty(presence_penalty);
        }
        if let Some(stop) = stop.filter(|stop| !stop.is_empty()) {
            request.stop(Stop::StringArray(stop.to_vec()));
        }

        Ok(request.build()?)
    }
}

impl Default for OpenAI<OpenAIConfig> {
    fn default() -> Self {
        Self::new(OpenAIConfig::default())
    }
}

#[async_trait]
impl<C: Config + Clone + Send + Sync + 'static> LLM for OpenAI<C> {
    async fn generate(
        &self,
        prompts: &[Prompt],
        stop: Option<&[String]>,
    ) -> Result<GenerateResult, LLMError> {
        let client = Client::with_config(self.config.clone());

        let mut generations = Vec::with_capacity(prompts.len());
        let mut usages = Vec::with_capacity(prompts.len());

        for prompt in prompts {
            let request = self.build_request(prompt, stop)?;
            let response = client.chat().create(request).await?;

            let choice = select_choice(response.choices)
                .ok_or(LLMError::ContentNotFound("No choices".into()))?;
            let info = generation_info(&choice, &response.model);
            let text = choice
                .message
                .content
                .ok_or(LLMError::ContentNotFound("message.content".into()))?;

            generations.push(vec![Generation::new(text).with_info(info)]);
            usages.push(response.usage.map(TokenUsage::from));
        }

        Ok(GenerateResult::new(
            generations,
            TokenUsage::merge_options(&usages),
        ))
    }

    fn llm_type(&self) -> &str {
        "openai-chat"
    }

    fn is_chat_model(&self) -> bool {
        true
    }

    fn to_config(&self) -> Value {
        let mut config = json!({
            "_type": self.llm_type(),
            "model_name": self.model,
        });
        if let (Value::Object(map), Value::Object(options)) =
            (&mut config, serde_json::to_value(&self.options).unwrap_or_default())
        {
            map.extend(options);
        }
        config
    }
}
