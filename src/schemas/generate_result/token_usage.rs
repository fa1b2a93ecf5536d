use std::fmt::{self, Display};

use async_openai::types::CompletionUsage;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }

    pub fn merge(&self, other: &TokenUsage) -> TokenUsage {
        TokenUsage {
            prompt_tokens: self.prompt_tokens + other.prompt_tokens,
            completion_tokens: self.completion_tokens + other.completion_tokens,
            total_tokens: self.total_tokens + other.total_tokens,
        }
    }

    /// Sum every present usage; `None` when none of them is present.
    pub fn merge_options<'a>(
        usages: impl IntoIterator<Item = &'a Option<TokenUsage>>,
    ) -> Option<TokenUsage> {
        usages
            .into_iter()
            .flatten()
            .fold(None, |acc: Option<TokenUsage>, usage| match acc {
                Some(acc) => Some(acc.merge(usage)),
                None => Some(usage.clone()),
            })
    }
}

impl Display for TokenUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "prompt tokens: {}, completion tokens: {}, total tokens: {}",
            self.prompt_tokens, self.completion_tokens, self.total_tokens
        )
    }
}

// Convert from async-openai type
impl From<CompletionUsage> for TokenUsage {
    fn from(usage: CompletionUsage) -> Self {
        TokenUsage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_options_skips_missing() {
        let usages = [
            Some(TokenUsage::new(10, 5)),
            None,
            Some(TokenUsage::new(3, 2)),
        ];

        let merged = TokenUsage::merge_options(&usages).unwrap();
        assert_eq!(merged, TokenUsage::new(13, 7));
        assert_eq!(merged.total_tokens, 20);
    }

    #[test]
    fn test_merge_options_all_missing() {
        assert_eq!(TokenUsage::merge_options([&None, &None]), None);
    }
}
