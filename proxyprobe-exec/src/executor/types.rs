use std::time::Duration;

use proxyprobe_core::{Outcome, TaskDescriptor};
use serde::Serialize;

use crate::retry::RetryConfig;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/test";

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// URL of the external test endpoint.
    pub endpoint: String,
    /// Request-level timeout for a single probe attempt.
    pub probe_timeout: Duration,
    pub retry: RetryConfig,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            probe_timeout: Duration::from_secs(10),
            retry: RetryConfig::default(),
        }
    }
}

/// A descriptor together with its final outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedProbe {
    pub descriptor: TaskDescriptor,
    pub outcome: Outcome,
    pub attempts: u32,
}

impl CompletedProbe {
    pub fn row(&self) -> ResultRow {
        ResultRow::new(&self.descriptor, &self.outcome)
    }
}

/// Display-ready summary of one completed descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    pub id: u64,
    pub outcome_summary: String,
    pub response_time_display: String,
    pub label: String,
    pub details: String,
}

impl ResultRow {
    pub fn new(descriptor: &TaskDescriptor, outcome: &Outcome) -> Self {
        let outcome_summary = if outcome.is_success() { "success" } else { "failure" };
        // A failure with no (or a zero) reported time shows N/A; a success
        // always shows its time.
        let response_time_display = match (outcome, outcome.response_time_ms()) {
            (Outcome::Success { .. }, Some(ms)) => format!("{:.2}", ms / 1000.0),
            (_, Some(ms)) if ms > 0.0 => format!("{:.2}", ms / 1000.0),
            _ => "N/A".to_string(),
        };
        Self {
            id: descriptor.id,
            outcome_summary: outcome_summary.to_string(),
            response_time_display,
            label: outcome.label(),
            details: outcome.details().to_string(),
        }
    }
}
