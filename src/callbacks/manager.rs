use std::{fmt, sync::Arc};

use serde_json::Value;
use uuid::Uuid;

use crate::{chain::ChainError, schemas::PromptArgs};

use super::{CallbackHandler, LogCallbackHandler};

/// The handlers and tags that apply to the next chain run.
#[derive(Clone, Default)]
pub struct CallbackManager {
    handlers: Vec<Arc<dyn CallbackHandler>>,
    parent_run_id: Option<Uuid>,
    tags: Vec<String>,
    verbose: bool,
}

impl CallbackManager {
    pub fn new(handlers: Vec<Arc<dyn CallbackHandler>>) -> Self {
        Self {
            handlers,
            ..Default::default()
        }
    }

    pub fn with_handler(mut self, handler: Arc<dyn CallbackHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn with_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.add_tags(tags.into_iter().map(Into::into));
        self
    }

    /// Combine the manager handed down by a caller with a chain's own handlers and tags.
    ///
    /// `verbose` adds a [`LogCallbackHandler`] unless one was already inherited.
    pub fn configure(
        inheritable: Option<&CallbackManager>,
        local_handlers: &[Arc<dyn CallbackHandler>],
        verbose: bool,
        local_tags: &[String],
    ) -> Self {
        let mut manager = inheritable.cloned().unwrap_or_default();
        manager.handlers.extend(local_handlers.iter().cloned());
        manager.add_tags(local_tags.iter().cloned());

        if verbose && !manager.verbose {
            manager.handlers.push(Arc::new(LogCallbackHandler));
            manager.verbose = true;
        }

        manager
    }

    pub fn handlers(&self) -> &[Arc<dyn CallbackHandler>] {
        &self.handlers
    }

    pub fn parent_run_id(&self) -> Option<Uuid> {
        self.parent_run_id
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Start a run: allocates a run id and notifies every handler.
    pub fn on_chain_start(&self, serialized: &Value, inputs: &PromptArgs) -> CallbackManagerForChainRun {
        let run_id = Uuid::new_v4();
        for handler in &self.handlers {
            handler.on_chain_start(run_id, self.parent_run_id, serialized, inputs, &self.tags);
        }

        CallbackManagerForChainRun {
            run_id,
            parent_run_id: self.parent_run_id,
            handlers: self.handlers.clone(),
            tags: self.tags.clone(),
            verbose: self.verbose,
        }
    }

    fn add_tags(&mut self, tags: impl IntoIterator<Item = String>) {
        for tag in tags {
            if !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }
    }
}

impl fmt::Debug for CallbackManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackManager")
            .field("handlers", &self.handlers.len())
            .field("parent_run_id", &self.parent_run_id)
            .field("tags", &self.tags)
            .finish()
    }
}

/// Callback handle bound to one run in progress.
#[derive(Clone)]
pub struct CallbackManagerForChainRun {
    run_id: Uuid,
    parent_run_id: Option<Uuid>,
    handlers: Vec<Arc<dyn CallbackHandler>>,
    tags: Vec<String>,
    verbose: bool,
}

impl CallbackManagerForChainRun {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn parent_run_id(&self) -> Option<Uuid> {
        self.parent_run_id
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn on_chain_end(&self, outputs: &PromptArgs) {
        for handler in &self.handlers {
            handler.on_chain_end(self.run_id, outputs);
        }
    }

    pub fn on_chain_error(&self, error: &ChainError) {
        for handler in &self.handlers {
            handler.on_chain_error(self.run_id, error);
        }
    }

    pub fn on_text(&self, text: &str) {
        for handler in &self.handlers {
            handler.on_text(self.run_id, text);
        }
    }

    /// A manager for runs nested inside this one.
    pub fn get_child(&self) -> CallbackManager {
        CallbackManager {
            handlers: self.handlers.clone(),
            parent_run_id: Some(self.run_id),
            tags: self.tags.clone(),
            verbose: self.verbose,
        }
    }
}

impl fmt::Debug for CallbackManagerForChainRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackManagerForChainRun")
            .field("run_id", &self.run_id)
            .field("parent_run_id", &self.parent_run_id)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
