use crate::callbacks::CallbackManager;

/// Per-call switches for [`super::Chain::call`].
#[derive(Debug, Clone, Default)]
pub struct ChainCallOptions {
    /// Return only the chain's outputs instead of inputs merged with outputs.
    pub return_only_outputs: bool,
    /// Attach a [`crate::schemas::RunInfo`] under [`crate::schemas::RUN_KEY`].
    pub include_run_info: bool,
    pub tags: Vec<String>,
    pub callbacks: Option<CallbackManager>,
}

impl ChainCallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_return_only_outputs(mut self, return_only_outputs: bool) -> Self {
        self.return_only_outputs = return_only_outputs;
        self
    }

    pub fn with_include_run_info(mut self, include_run_info: bool) -> Self {
        self.include_run_info = include_run_info;
        self
    }

    pub fn with_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_callbacks(mut self, callbacks: CallbackManager) -> Self {
        self.callbacks = Some(callbacks);
        self
    }
}
