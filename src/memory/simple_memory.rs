use std::sync::Arc;

use tokio::sync::RwLock;

use crate::schemas::PromptArgs;

use super::Memory;

/// Fixed key/value pairs that are supplied to every call and never change.
#[derive(Debug, Clone, Default)]
pub struct SimpleMemory {
    memories: PromptArgs,
}

impl SimpleMemory {
    pub fn new(memories: PromptArgs) -> Self {
        Self { memories }
    }
}

impl From<SimpleMemory> for Arc<RwLock<dyn Memory>> {
    fn from(val: SimpleMemory) -> Self {
        Arc::new(RwLock::new(val))
    }
}

impl Memory for SimpleMemory {
    fn memory_variables(&self) -> Vec<String> {
        let mut keys = self.memories.keys().cloned().collect::<Vec<_>>();
        keys.sort();
        keys
    }

    fn load_memory_variables(&self, _inputs: &PromptArgs) -> PromptArgs {
        self.memories.clone()
    }

    fn save_context(&mut self, _inputs: &PromptArgs, _outputs: &PromptArgs) {}

    fn clear(&mut self) {}
}

#[cfg(test)]
mod tests {
    use crate::prompt_args;

    use super::*;

    #[test]
    fn test_simple_memory_is_static() {
        let mut memory = SimpleMemory::new(prompt_args! { "user" => "Luis", "lang" => "es" });
        assert_eq!(memory.memory_variables(), vec!["lang", "user"]);

        memory.save_context(&prompt_args! { "q" => "hi" }, &prompt_args! { "text" => "hello" });
        memory.clear();

        let loaded = memory.load_memory_variables(&PromptArgs::new());
        assert_eq!(loaded, prompt_args! { "user" => "Luis", "lang" => "es" });
    }
}
