use std::time::Duration;

use proxyprobe_core::{Stats, ValidationError};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub stats: Stats,
    /// Descriptors that never produced an outcome because the run was cancelled.
    pub skipped: usize,
    pub cancelled: bool,
    pub elapsed: Duration,
    pub peak_in_flight: usize,
}

impl RunSummary {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "run_id": self.run_id.to_string(),
            "cancelled": self.cancelled,
            "skipped": self.skipped,
            "duration_ms": self.elapsed.as_millis() as u64,
            "peak_in_flight": self.peak_in_flight,
            "stats": self.stats,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error(transparent)]
    InvalidParams(#[from] ValidationError),
    #[error("concurrency limit must be greater than 0")]
    InvalidConcurrency,
    #[error("a run is already in progress")]
    RunInProgress,
    #[error("task join error: {0}")]
    TaskJoin(String),
}
