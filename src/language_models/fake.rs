use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::schemas::{GenerateResult, Generation, Prompt};

use super::{LLMError, LLM};

/// One recorded call to [`FakeListLLM::generate`].
#[derive(Debug, Clone, PartialEq)]
pub struct FakeCall {
    pub prompts: Vec<String>,
    pub stop: Option<Vec<String>>,
}

/// Scripted model that answers with its responses in order, wrapping around.
///
/// Every call is recorded so tests can assert on the prompts a chain produced.
#[derive(Debug, Default)]
pub struct FakeListLLM {
    responses: Vec<String>,
    index: Mutex<usize>,
    calls: Mutex<Vec<FakeCall>>,
    chat_model: bool,
}

impl FakeListLLM {
    pub fn new<S: Into<String>>(responses: impl IntoIterator<Item = S>) -> Self {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_chat_model(mut self, chat_model: bool) -> Self {
        self.chat_model = chat_model;
        self
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn next_response(&self) -> Result<String, LLMError> {
        if self.responses.is_empty() {
            return Err(LLMError::OtherError("FakeListLLM has no responses".into()));
        }

        let mut index = self.index.lock().unwrap_or_else(PoisonError::into_inner);
        let response = self.responses[*index % self.responses.len()].clone();
        *index += 1;
        Ok(response)
    }
}

#[async_trait]
impl LLM for FakeListLLM {
    async fn generate(
        &self,
        prompts: &[Prompt],
        stop: Option<&[String]>,
    ) -> Result<GenerateResult, LLMError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(FakeCall {
                prompts: prompts.iter().map(|p| p.as_str().to_owned()).collect(),
                stop: stop.map(<[String]>::to_vec),
            });

        let generations = prompts
            .iter()
            .map(|_| self.next_response().map(|text| vec![Generation::new(text)]))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GenerateResult::new(generations, None))
    }

    fn llm_type(&self) -> &str {
        "fake-list"
    }

    fn is_chat_model(&self) -> bool {
        self.chat_model
    }

    fn to_config(&self) -> Value {
        json!({
            "_type": self.llm_type(),
            "responses": self.responses,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_responses_cycle_and_calls_are_recorded() {
        let llm = FakeListLLM::new(["first", "second"]);

        let result = llm
            .generate(
                &[Prompt::new("a"), Prompt::new("b"), Prompt::new("c")],
                Some(&["\n".to_string()]),
            )
            .await
            .unwrap();

        let texts = result
            .generations
            .iter()
            .map(|g| g[0].text.as_str())
            .collect::<Vec<_>>();
        assert_eq!(texts, vec!["first", "second", "first"]);

        assert_eq!(
            llm.calls(),
            vec![FakeCall {
                prompts: vec!["a".into(), "b".into(), "c".into()],
                stop: Some(vec!["\n".into()]),
            }]
        );
    }

    #[tokio::test]
    async fn test_invoke_returns_first_generation() {
        let llm = FakeListLLM::new(["hello"]);
        assert_eq!(llm.invoke("hi").await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_empty_script_is_an_error() {
        let llm = FakeListLLM::new(Vec::<String>::new());
        assert!(llm.invoke("hi").await.is_err());
    }
}
