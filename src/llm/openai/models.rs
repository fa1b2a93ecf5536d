use std::fmt::{self, Display};

/// Chat models known to work with [`super::OpenAI`]. Any model id string is accepted as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAIModel {
    Gpt35,
    Gpt4,
    Gpt4o,
    Gpt4oMini,
    Gpt41,
    Gpt41Mini,
}

impl Display for OpenAIModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenAIModel::Gpt35 => write!(f, "gpt-3.5-turbo"),
            OpenAIModel::Gpt4 => write!(f, "gpt-4"),
            OpenAIModel::Gpt4o => write!(f, "gpt-4o"),
            OpenAIModel::Gpt4oMini => write!(f, "gpt-4o-mini"),
            OpenAIModel::Gpt41 => write!(f, "gpt-4.1"),
            OpenAIModel::Gpt41Mini => write!(f, "gpt-4.1-mini"),
        }
    }
}

impl From<OpenAIModel> for String {
    fn from(val: OpenAIModel) -> Self {
        val.to_string()
    }
}
