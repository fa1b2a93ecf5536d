use async_trait::async_trait;
use serde_json::{json, Value};

use crate::schemas::{GenerateResult, Prompt};

use super::{num_tokens_from_str, LLMError};

/// A text-generation capability: formatted prompts in, generations out.
#[async_trait]
pub trait LLM: Sync + Send {
    /// Generate completions for a batch of prompts.
    ///
    /// Implementations must return exactly one inner generation list per prompt,
    /// in the order the prompts were given.
    async fn generate(
        &self,
        prompts: &[Prompt],
        stop: Option<&[String]>,
    ) -> Result<GenerateResult, LLMError>;

    async fn invoke(&self, prompt: &str) -> Result<String, LLMError> {
        let result = self.generate(&[Prompt::new(prompt)], None).await?;
        result
            .generations
            .into_iter()
            .next()
            .and_then(|generations| generations.into_iter().next())
            .map(|generation| generation.text)
            .ok_or(LLMError::ContentNotFound("No generations".into()))
    }

    fn get_num_tokens(&self, text: &str) -> Option<usize> {
        num_tokens_from_str(text)
    }

    fn llm_type(&self) -> &str;

    fn is_chat_model(&self) -> bool {
        false
    }

    fn to_config(&self) -> Value {
        json!({ "_type": self.llm_type() })
    }
}
