use serde_json::Value;
use uuid::Uuid;

use crate::{chain::ChainError, schemas::PromptArgs};

/// Receives chain lifecycle events. Every method defaults to doing nothing.
pub trait CallbackHandler: Send + Sync {
    fn on_chain_start(
        &self,
        run_id: Uuid,
        parent_run_id: Option<Uuid>,
        serialized: &Value,
        inputs: &PromptArgs,
        tags: &[String],
    ) {
        let _ = (run_id, parent_run_id, serialized, inputs, tags);
    }

    fn on_chain_end(&self, run_id: Uuid, outputs: &PromptArgs) {
        let _ = (run_id, outputs);
    }

    fn on_chain_error(&self, run_id: Uuid, error: &ChainError) {
        let _ = (run_id, error);
    }

    /// Free-form text emitted while a run is in progress, e.g. a formatted prompt.
    fn on_text(&self, run_id: Uuid, text: &str) {
        let _ = (run_id, text);
    }
}
