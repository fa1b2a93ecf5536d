use serde_json::Value;
use uuid::Uuid;

use crate::{chain::ChainError, schemas::PromptArgs};

use super::CallbackHandler;

/// Reports chain lifecycle through the `log` facade. Added to a chain's
/// callbacks when it is built with `verbose(true)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogCallbackHandler;

impl CallbackHandler for LogCallbackHandler {
    fn on_chain_start(
        &self,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
        serialized: &Value,
        inputs: &PromptArgs,
        _tags: &[String],
    ) {
        let name = serialized
            .get("_type")
            .and_then(Value::as_str)
            .unwrap_or("chain");
        match parent_run_id {
            Some(parent) => log::info!("Entering new {name} run {run_id} (parent {parent})"),
            None => log::info!("Entering new {name} run {run_id}"),
        }
        log::debug!("Inputs: {inputs:?}");
    }

    fn on_chain_end(&self, run_id: Uuid, outputs: &PromptArgs) {
        log::info!("Finished run {run_id}");
        log::debug!("Outputs: {outputs:?}");
    }

    fn on_chain_error(&self, run_id: Uuid, error: &ChainError) {
        log::error!("Run {run_id} failed: {error}");
    }

    fn on_text(&self, _run_id: Uuid, text: &str) {
        log::info!("{text}");
    }
}
