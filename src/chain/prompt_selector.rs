use crate::{language_models::LLM, template::PromptTemplate};

use super::{CHAT_STUFF_QA_TEMPLATE, DEFAULT_STUFF_QA_TEMPLATE};

/// Picks a prompt suited to a particular model.
pub trait PromptSelector: Send + Sync {
    fn get_prompt(&self, llm: &dyn LLM) -> PromptTemplate;
}

pub type LLMCondition = fn(&dyn LLM) -> bool;

/// Returns the prompt of the first matching condition, else the default.
#[derive(Debug, Clone)]
pub struct ConditionalPromptSelector {
    default_prompt: PromptTemplate,
    conditionals: Vec<(LLMCondition, PromptTemplate)>,
}

impl ConditionalPromptSelector {
    pub fn new(default_prompt: PromptTemplate) -> Self {
        Self {
            default_prompt,
            conditionals: Vec::new(),
        }
    }

    pub fn with_conditional(mut self, condition: LLMCondition, prompt: PromptTemplate) -> Self {
        self.conditionals.push((condition, prompt));
        self
    }
}

impl PromptSelector for ConditionalPromptSelector {
    fn get_prompt(&self, llm: &dyn LLM) -> PromptTemplate {
        self.conditionals
            .iter()
            .find(|(condition, _)| condition(llm))
            .map(|(_, prompt)| prompt)
            .unwrap_or(&self.default_prompt)
            .clone()
    }
}

pub fn is_chat_model(llm: &dyn LLM) -> bool {
    llm.is_chat_model()
}

/// Question-answering prompts for stuffing documents into `{context}`.
pub fn stuff_qa_prompt_selector() -> ConditionalPromptSelector {
    ConditionalPromptSelector::new(PromptTemplate::from_fstring(DEFAULT_STUFF_QA_TEMPLATE))
        .with_conditional(
            is_chat_model,
            PromptTemplate::from_fstring(CHAT_STUFF_QA_TEMPLATE),
        )
}
