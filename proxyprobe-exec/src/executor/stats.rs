use proxyprobe_core::{Outcome, Stats};
use tokio::sync::Mutex;

/// Shared statistics for one run.
///
/// All mutation happens under one lock, so a snapshot never observes `total`
/// without the matching counter and histogram bucket.
#[derive(Default)]
pub struct StatsAggregator {
    stats: Mutex<Stats>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one outcome and returns the snapshot taken under the same lock.
    pub async fn record(&self, outcome: &Outcome) -> Stats {
        let mut stats = self.stats.lock().await;
        stats.record(outcome);
        debug_assert!(stats.is_consistent());
        stats.clone()
    }

    pub async fn snapshot(&self) -> Stats {
        self.stats.lock().await.clone()
    }

    /// Only call between runs; the scheduler enforces this for its own
    /// aggregator.
    pub async fn reset(&self) {
        *self.stats.lock().await = Stats::default();
    }
}
