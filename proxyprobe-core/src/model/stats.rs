use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{FailureKind, Outcome};

/// Response times observed on successful probes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseTimeSummary {
    pub count: u64,
    pub total_ms: f64,
    pub min_ms: Option<f64>,
    pub max_ms: Option<f64>,
}

impl ResponseTimeSummary {
    pub fn observe(&mut self, ms: f64) {
        self.count += 1;
        self.total_ms += ms;
        self.min_ms = Some(self.min_ms.map_or(ms, |m| m.min(ms)));
        self.max_ms = Some(self.max_ms.map_or(ms, |m| m.max(ms)));
    }

    pub fn avg_ms(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.total_ms / self.count as f64)
        }
    }
}

/// Running counters for one test run.
///
/// Every recorded outcome bumps `total`, exactly one of
/// `success`/`failed`/`timeout`, and exactly one histogram bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total: u64,
    pub success: u64,
    pub failed: u64,
    pub timeout: u64,
    pub code_histogram: BTreeMap<String, u64>,
    pub response_time: ResponseTimeSummary,
}

impl Stats {
    pub fn record(&mut self, outcome: &Outcome) {
        self.total += 1;
        match outcome {
            Outcome::Success {
                response_time_ms, ..
            } => {
                self.success += 1;
                self.response_time.observe(*response_time_ms);
            }
            Outcome::Failure {
                kind: FailureKind::Timeout,
                ..
            } => self.timeout += 1,
            Outcome::Failure { .. } => self.failed += 1,
        }
        *self.code_histogram.entry(outcome.label()).or_insert(0) += 1;
    }

    /// True when the counters and the histogram agree with `total`.
    pub fn is_consistent(&self) -> bool {
        let buckets: u64 = self.code_histogram.values().sum();
        self.success + self.failed + self.timeout == self.total && buckets == self.total
    }

    pub fn success_rate(&self) -> f64 {
        self.percent(self.success)
    }

    pub fn failure_rate(&self) -> f64 {
        self.percent(self.failed)
    }

    pub fn timeout_rate(&self) -> f64 {
        self.percent(self.timeout)
    }

    pub fn histogram_share(&self, key: &str) -> f64 {
        self.percent(self.code_histogram.get(key).copied().unwrap_or(0))
    }

    fn percent(&self, n: u64) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (n as f64 / self.total as f64) * 100.0
        }
    }
}
