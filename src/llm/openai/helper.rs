use async_openai::types::{ChatChoice, FinishReason};
use serde_json::{json, Value};

/// Prefer choices that finished normally; ties keep the server's order.
pub fn select_choice(mut choices: Vec<ChatChoice>) -> Option<ChatChoice> {
    let rank = |c: &ChatChoice| match c.finish_reason {
        Some(FinishReason::ContentFilter) | Some(FinishReason::Length) => 1,
        _ => 0,
    };

    choices.sort_by(|c1, c2| rank(c1).cmp(&rank(c2)).then_with(|| c1.index.cmp(&c2.index)));
    choices.into_iter().next()
}

pub fn generation_info(choice: &ChatChoice, model: &str) -> Value {
    json!({
        "finish_reason": choice.finish_reason,
        "model": model,
    })
}
