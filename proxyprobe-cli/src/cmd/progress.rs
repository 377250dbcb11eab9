use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use proxyprobe_core::Stats;
use proxyprobe_exec::executor::{Event, EventSink};

/// Redraws a single stderr status line from the stats snapshot carried by
/// each `task.completed` event.
pub struct ProgressEventSink {
    total: usize,
    running: AtomicUsize,
}

impl ProgressEventSink {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            running: AtomicUsize::new(0),
        }
    }

    fn running(&self) -> usize {
        self.running.load(Ordering::Relaxed)
    }

    fn leave(&self) {
        self.running
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |v| {
                Some(v.saturating_sub(1))
            })
            .ok();
    }

    fn update_progress(&self, stats: &Stats) {
        let done = stats.total as usize;
        let running = self.running();
        let percent = if self.total > 0 {
            (done * 100) / self.total
        } else {
            0
        };
        eprint!(
            "\rProgress: [{}/{}] {}% (✓{} ✗{} ⏱{} →{})",
            done, self.total, percent, stats.success, stats.failed, stats.timeout, running
        );
        if done == self.total {
            eprintln!();
        }
    }
}

#[async_trait]
impl EventSink for ProgressEventSink {
    async fn emit(&self, event: Event) {
        match event {
            Event::TaskStarted { .. } => {
                self.running.fetch_add(1, Ordering::Relaxed);
            }
            Event::TaskCompleted { stats, .. } => {
                self.leave();
                self.update_progress(&stats);
            }
            Event::TaskSkipped { .. } => self.leave(),
            Event::RunFinished {
                cancelled: true, ..
            } => eprintln!(),
            _ => {}
        }
    }
}
