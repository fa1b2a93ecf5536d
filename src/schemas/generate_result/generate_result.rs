use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TokenUsage;

/// One unit of model output for one submitted prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_info: Option<Value>,
}

impl Generation {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            generation_info: None,
        }
    }

    pub fn with_info(mut self, generation_info: Value) -> Self {
        self.generation_info = Some(generation_info);
        self
    }
}

/// Result of a model call: `generations[i]` holds the candidates for the i-th prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateResult {
    pub generations: Vec<Vec<Generation>>,
    pub usage: Option<TokenUsage>,
}

impl GenerateResult {
    pub fn new(generations: Vec<Vec<Generation>>, usage: Option<TokenUsage>) -> Self {
        Self { generations, usage }
    }
}

impl Display for GenerateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, generation) in self.generations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            match generation.first() {
                Some(first) => write!(f, "{}", first.text)?,
                None => write!(f, "<empty>")?,
            }
        }

        if let Some(usage) = &self.usage {
            write!(f, "\n\n{}", usage)?
        }

        Ok(())
    }
}
