use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Counts descriptors whose retry loop is currently running.
pub struct InFlightGauge {
    limit: usize,
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlightGauge {
    pub fn new(limit: usize) -> Arc<Self> {
        Arc::new(Self {
            limit,
            current: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        })
    }

    pub fn enter(self: &Arc<Self>) -> InFlightPermit {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        debug_assert!(
            now <= self.limit,
            "in-flight count {now} exceeds limit {}",
            self.limit
        );
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlightPermit {
            gauge: Arc::clone(self),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn current(&self) -> usize {
        self.current.load(Ordering::SeqCst)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

pub struct InFlightPermit {
    gauge: Arc<InFlightGauge>,
}

impl Drop for InFlightPermit {
    fn drop(&mut self) {
        self.gauge.current.fetch_sub(1, Ordering::SeqCst);
    }
}
