use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use proxyprobe_core::TaskDescriptor;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::executor::backlog::Backlog;
use crate::executor::concurrency::InFlightGauge;
use crate::executor::control::RunControl;
use crate::executor::events::{Event, EventSink};
use crate::executor::stats::StatsAggregator;
use crate::retry::{Execution, RetryPolicy};

/// State shared by every worker of one run and by its supervisor.
pub(crate) struct RunShared {
    pub run_id: Uuid,
    pub backlog: Backlog,
    pub gauge: Arc<InFlightGauge>,
    pub aggregator: Arc<StatsAggregator>,
    pub event_sink: Arc<dyn EventSink>,
    pub control: RunControl,
    pub skipped: AtomicUsize,
}

/// A descriptor whose retry sequence has ended, on its way to the collector.
pub(crate) struct Finished {
    pub descriptor: TaskDescriptor,
    pub execution: Execution,
}

#[derive(Clone)]
pub(crate) struct Worker {
    pub shared: Arc<RunShared>,
    pub policy: RetryPolicy,
    pub done: mpsc::Sender<Finished>,
}

impl Worker {
    /// Pulls descriptors until the backlog is empty or the run is cancelled.
    /// Each descriptor runs its whole retry sequence before the next is taken.
    pub(crate) async fn run(self, worker_no: usize) {
        let shared = &self.shared;
        let mut handled = 0usize;

        loop {
            if shared.control.is_cancelled() {
                break;
            }
            let Some(descriptor) = shared.backlog.pop_next() else {
                break;
            };

            let permit = shared.gauge.enter();
            shared
                .event_sink
                .emit(Event::TaskStarted {
                    run_id: shared.run_id,
                    task_id: descriptor.id,
                })
                .await;
            let execution = self
                .policy
                .execute_controlled(&descriptor, &shared.control)
                .await;
            drop(permit);

            let Some(execution) = execution else {
                shared.skipped.fetch_add(1, Ordering::SeqCst);
                shared
                    .event_sink
                    .emit(Event::TaskSkipped {
                        run_id: shared.run_id,
                        task_id: descriptor.id,
                    })
                    .await;
                continue;
            };
            handled += 1;

            let finished = Finished {
                descriptor,
                execution,
            };
            if self.done.send(finished).await.is_err() {
                tracing::error!(run_id = %shared.run_id, worker_no, "collector gone, worker stopping");
                break;
            }
        }

        tracing::debug!(run_id = %shared.run_id, worker_no, handled, "worker finished");
    }
}
