use std::{borrow::Cow, collections::HashMap};

use serde_json::Value;

/// Named values flowing into and out of a chain.
pub type PromptArgs = HashMap<String, Value>;

/// Renders a value the way it should appear inside a prompt: strings verbatim,
/// everything else as JSON.
pub fn value_to_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(text) => Cow::Borrowed(text),
        other => Cow::Owned(other.to_string()),
    }
}

/// Build a [`PromptArgs`] map.
///
/// # Example
///
/// ```rust,ignore
/// let args = prompt_args! {
///     "question" => "How old is Luis?",
///     "stop" => ["\nObservation:"],
/// };
/// ```
#[macro_export]
macro_rules! prompt_args {
    ( $( $key:expr => $value:expr ),* $(,)? ) => {
        {
            #[allow(unused_mut)]
            let mut args = $crate::schemas::PromptArgs::new();
            $(
                args.insert(($key).to_string(), $crate::serde_json::json!($value));
            )*
            args
        }
    };
}
