use std::sync::Arc;

use proxyprobe_core::{Outcome, TaskDescriptor};
use tokio::time::Instant;
use uuid::Uuid;

use crate::executor::{Event, EventSink, NoOpEventSink, RunControl};
use crate::probe::ProbeClient;
use crate::retry::config::RetryConfig;
use crate::retry::decision::{decide_retry, RetryDecision};

/// Result of running one descriptor through the retry loop.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub outcome: Outcome,
    pub attempts: u32,
    /// Cancellation stopped the loop before the retry budget was used up.
    pub interrupted: bool,
}

/// Wraps a [`ProbeClient`] and re-attempts transient failures with backoff.
///
/// Attempts for one descriptor are strictly sequential. The only suspension
/// points are the probe call and the backoff sleep.
#[derive(Clone)]
pub struct RetryPolicy {
    probe: Arc<dyn ProbeClient>,
    config: RetryConfig,
    event_sink: Arc<dyn EventSink>,
    run_id: Uuid,
}

impl RetryPolicy {
    pub fn new(probe: Arc<dyn ProbeClient>, config: RetryConfig) -> Self {
        Self {
            probe,
            config,
            event_sink: Arc::new(NoOpEventSink),
            run_id: Uuid::nil(),
        }
    }

    pub fn with_event_sink(mut self, event_sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = event_sink;
        self
    }

    pub fn for_run(mut self, run_id: Uuid) -> Self {
        self.run_id = run_id;
        self
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Runs the descriptor to a final outcome. Never paused or cancelled.
    pub async fn execute(&self, descriptor: &TaskDescriptor) -> Execution {
        let mut attempt_no = 0;
        loop {
            attempt_no += 1;
            if let Step::Done(execution) = self.attempt(descriptor, attempt_no).await {
                return execution;
            }
        }
    }

    /// Like [`execute`](Self::execute), but consults `control` before every
    /// attempt. Returns `None` when cancelled before the first attempt.
    pub async fn execute_controlled(
        &self,
        descriptor: &TaskDescriptor,
        control: &RunControl,
    ) -> Option<Execution> {
        let mut attempt_no = 0;
        let mut last: Option<Outcome> = None;
        loop {
            if control.checkpoint().await.is_err() {
                tracing::debug!(
                    run_id = %self.run_id,
                    task_id = descriptor.id,
                    attempts = attempt_no,
                    "cancelled before next attempt"
                );
                return last.map(|outcome| Execution {
                    outcome,
                    attempts: attempt_no,
                    interrupted: true,
                });
            }
            attempt_no += 1;
            match self.attempt(descriptor, attempt_no).await {
                Step::Done(execution) => return Some(execution),
                Step::Retry(outcome) => last = Some(outcome),
            }
        }
    }

    async fn attempt(&self, descriptor: &TaskDescriptor, attempt_no: u32) -> Step {
        self.event_sink
            .emit(Event::AttemptStarted {
                run_id: self.run_id,
                task_id: descriptor.id,
                attempt_no,
            })
            .await;

        let started = Instant::now();
        let outcome = self.probe.probe(descriptor).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        tracing::debug!(
            run_id = %self.run_id,
            task_id = descriptor.id,
            attempt_no,
            label = %outcome.label(),
            elapsed_ms,
            "attempt finished"
        );
        self.event_sink
            .emit(Event::AttemptFinished {
                run_id: self.run_id,
                task_id: descriptor.id,
                attempt_no,
                succeeded: outcome.is_success(),
                label: outcome.label(),
                elapsed_ms,
            })
            .await;

        match decide_retry(&self.config, attempt_no, &outcome, || fastrand::u64(..)) {
            RetryDecision::Stop { .. } => Step::Done(Execution {
                outcome,
                attempts: attempt_no,
                interrupted: false,
            }),
            RetryDecision::RetryAfter { delay, reason } => {
                let delay_ms = delay.as_millis() as u64;
                tracing::warn!(
                    run_id = %self.run_id,
                    task_id = descriptor.id,
                    attempt_no,
                    delay_ms,
                    ?reason,
                    "probe failed, retry scheduled"
                );
                self.event_sink
                    .emit(Event::RetryScheduled {
                        run_id: self.run_id,
                        task_id: descriptor.id,
                        attempt_no,
                        delay_ms,
                    })
                    .await;
                tokio::time::sleep(delay).await;
                Step::Retry(outcome)
            }
        }
    }
}

enum Step {
    Done(Execution),
    Retry(Outcome),
}
