use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::stream::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::executor::result::{ExecutionError, RunSummary};
use crate::executor::types::CompletedProbe;

/// Outcomes of a run in completion order.
///
/// The stream ends once every worker has exited. Dropping it does not stop
/// the run: remaining descriptors still execute and are still aggregated.
pub struct OutcomeStream {
    run_id: Uuid,
    rx: mpsc::Receiver<CompletedProbe>,
    supervisor: JoinHandle<Result<RunSummary, ExecutionError>>,
}

impl OutcomeStream {
    pub(crate) fn new(
        run_id: Uuid,
        rx: mpsc::Receiver<CompletedProbe>,
        supervisor: JoinHandle<Result<RunSummary, ExecutionError>>,
    ) -> Self {
        Self {
            run_id,
            rx,
            supervisor,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub async fn next_outcome(&mut self) -> Option<CompletedProbe> {
        self.rx.recv().await
    }

    /// Drains whatever is left and waits for the run to finish.
    pub async fn into_summary(mut self) -> Result<RunSummary, ExecutionError> {
        while self.rx.recv().await.is_some() {}
        self.join().await
    }

    pub async fn collect_all(
        mut self,
    ) -> Result<(Vec<CompletedProbe>, RunSummary), ExecutionError> {
        let mut completed = Vec::new();
        while let Some(c) = self.rx.recv().await {
            completed.push(c);
        }
        let summary = self.join().await?;
        Ok((completed, summary))
    }

    async fn join(self) -> Result<RunSummary, ExecutionError> {
        let run_id = self.run_id;
        self.supervisor
            .await
            .map_err(|e| ExecutionError::TaskJoin(format!("run {run_id}: {e}")))?
    }
}

impl Stream for OutcomeStream {
    type Item = CompletedProbe;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
