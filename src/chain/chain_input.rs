use serde_json::Value;

use crate::schemas::PromptArgs;

use super::ChainError;

/// What a caller hands to [`super::Chain::call`]: either a full mapping, or a
/// single value for chains with exactly one unmet input key.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainInput {
    Single(Value),
    Map(PromptArgs),
}

impl From<PromptArgs> for ChainInput {
    fn from(args: PromptArgs) -> Self {
        ChainInput::Map(args)
    }
}

impl From<&str> for ChainInput {
    fn from(input: &str) -> Self {
        ChainInput::Single(Value::String(input.into()))
    }
}

impl From<String> for ChainInput {
    fn from(input: String) -> Self {
        ChainInput::Single(Value::String(input))
    }
}

impl From<Value> for ChainInput {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => ChainInput::Map(map.into_iter().collect()),
            other => ChainInput::Single(other),
        }
    }
}

/// Arguments to [`super::Chain::run`]: one positional value or keyword values, never both.
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    args: Vec<Value>,
    kwargs: PromptArgs,
}

impl RunArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn positional(value: impl Into<Value>) -> Self {
        Self::new().arg(value)
    }

    pub fn keyword(kwargs: PromptArgs) -> Self {
        Self {
            args: Vec::new(),
            kwargs,
        }
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    pub fn into_chain_input(mut self) -> Result<ChainInput, ChainError> {
        match (self.args.len(), self.kwargs.is_empty()) {
            (0, true) => Err(ChainError::InvalidCall(
                "`run` supported with either positional arguments or keyword arguments but none were provided".into(),
            )),
            (1, true) => Ok(ChainInput::Single(self.args.remove(0))),
            (0, false) => Ok(ChainInput::Map(self.kwargs)),
            (n, true) => Err(ChainError::InvalidCall(format!(
                "`run` supports only one positional argument, got {n}"
            ))),
            (_, false) => Err(ChainError::InvalidCall(format!(
                "`run` supported with either positional arguments or keyword arguments, but not both. Got args: {:?} and kwargs: {:?}",
                self.args, self.kwargs
            ))),
        }
    }
}

impl From<&str> for RunArgs {
    fn from(input: &str) -> Self {
        Self::positional(input)
    }
}

impl From<String> for RunArgs {
    fn from(input: String) -> Self {
        Self::positional(input)
    }
}

impl From<PromptArgs> for RunArgs {
    fn from(kwargs: PromptArgs) -> Self {
        Self::keyword(kwargs)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::prompt_args;

    use super::*;

    #[test]
    fn test_json_object_becomes_map() {
        let input = ChainInput::from(json!({ "question": "why?" }));
        assert_eq!(input, ChainInput::Map(prompt_args! { "question" => "why?" }));

        let input = ChainInput::from(json!(42));
        assert_eq!(input, ChainInput::Single(json!(42)));
    }

    #[test]
    fn test_run_args_validation() {
        assert!(matches!(
            RunArgs::new().into_chain_input(),
            Err(ChainError::InvalidCall(_))
        ));
        assert!(matches!(
            RunArgs::positional("a").arg("b").into_chain_input(),
            Err(ChainError::InvalidCall(_))
        ));
        assert!(matches!(
            RunArgs::positional("a").kwarg("b", "c").into_chain_input(),
            Err(ChainError::InvalidCall(_))
        ));

        assert_eq!(
            RunArgs::positional("a").into_chain_input().unwrap(),
            ChainInput::Single(json!("a"))
        );
        assert_eq!(
            RunArgs::new().kwarg("b", "c").into_chain_input().unwrap(),
            ChainInput::Map(prompt_args! { "b" => "c" })
        );
    }
}
