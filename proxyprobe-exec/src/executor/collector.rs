use std::sync::Arc;

use tokio::sync::mpsc;

use crate::executor::events::Event;
use crate::executor::types::{CompletedProbe, ResultRow};
use crate::executor::worker::{Finished, RunShared};

/// Sole consumer of finished descriptors for one run.
///
/// Recording, the `task.completed` event and the hand-off to the outcome
/// stream happen here one descriptor at a time, so the aggregator, the event
/// sink and the stream all observe the same completion order and every event
/// carries the latest snapshot.
pub(crate) async fn collect(
    shared: Arc<RunShared>,
    mut done: mpsc::Receiver<Finished>,
    out: mpsc::Sender<CompletedProbe>,
) {
    let mut stream_open = true;

    while let Some(Finished {
        descriptor,
        execution,
    }) = done.recv().await
    {
        let stats = shared.aggregator.record(&execution.outcome).await;
        shared
            .event_sink
            .emit(Event::TaskCompleted {
                run_id: shared.run_id,
                row: ResultRow::new(&descriptor, &execution.outcome),
                stats,
            })
            .await;

        if !stream_open {
            continue;
        }
        let completed = CompletedProbe {
            descriptor,
            outcome: execution.outcome,
            attempts: execution.attempts,
        };
        if out.send(completed).await.is_err() {
            tracing::trace!(run_id = %shared.run_id, "outcome stream dropped");
            stream_open = false;
        }
    }
}
