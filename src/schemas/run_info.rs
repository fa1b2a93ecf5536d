use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reserved output key under which [`RunInfo`] is attached when requested.
pub const RUN_KEY: &str = "__run";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunInfo {
    pub run_id: Uuid,
}

impl RunInfo {
    pub fn new(run_id: Uuid) -> Self {
        Self { run_id }
    }
}
