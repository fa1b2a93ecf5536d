use std::sync::Arc;

use tokio::sync::RwLock;

use crate::schemas::PromptArgs;

/// State that a chain reads before running and writes after it succeeds.
pub trait Memory: Send + Sync {
    /// The keys this memory will add to a chain's inputs.
    fn memory_variables(&self) -> Vec<String>;

    fn load_memory_variables(&self, inputs: &PromptArgs) -> PromptArgs;

    fn save_context(&mut self, inputs: &PromptArgs, outputs: &PromptArgs);

    fn clear(&mut self);
}

/// Shared handle used by chains.
pub type SharedMemory = Arc<RwLock<dyn Memory>>;
