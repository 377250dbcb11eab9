use async_trait::async_trait;
use proxyprobe_core::Stats;
use serde_json::json;
use uuid::Uuid;

use crate::executor::types::ResultRow;

#[derive(Debug, Clone)]
pub enum Event {
    RunStarted {
        run_id: Uuid,
        total: usize,
        concurrency: usize,
    },
    RunFinished {
        run_id: Uuid,
        stats: Stats,
        skipped: usize,
        cancelled: bool,
    },
    TaskStarted {
        run_id: Uuid,
        task_id: u64,
    },
    TaskCompleted {
        run_id: Uuid,
        row: ResultRow,
        stats: Stats,
    },
    /// Cancelled before its first attempt; no outcome follows.
    TaskSkipped {
        run_id: Uuid,
        task_id: u64,
    },
    AttemptStarted {
        run_id: Uuid,
        task_id: u64,
        attempt_no: u32,
    },
    AttemptFinished {
        run_id: Uuid,
        task_id: u64,
        attempt_no: u32,
        succeeded: bool,
        label: String,
        elapsed_ms: u64,
    },
    RetryScheduled {
        run_id: Uuid,
        task_id: u64,
        attempt_no: u32,
        delay_ms: u64,
    },
}

impl Event {
    pub fn kind(&self) -> &'static str {
        match self {
            Event::RunStarted { .. } => "run.started",
            Event::RunFinished { .. } => "run.finished",
            Event::TaskStarted { .. } => "task.started",
            Event::TaskCompleted { .. } => "task.completed",
            Event::TaskSkipped { .. } => "task.skipped",
            Event::AttemptStarted { .. } => "attempt.started",
            Event::AttemptFinished { .. } => "attempt.finished",
            Event::RetryScheduled { .. } => "retry.scheduled",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let kind = self.kind();
        match self {
            Event::RunStarted { run_id, total, concurrency } => {
                json!({ "type": kind, "run_id": run_id.to_string(), "total": total, "concurrency": concurrency })
            }
            Event::RunFinished { run_id, stats, skipped, cancelled } => {
                json!({ "type": kind, "run_id": run_id.to_string(), "stats": stats, "skipped": skipped, "cancelled": cancelled })
            }
            Event::TaskStarted { run_id, task_id } | Event::TaskSkipped { run_id, task_id } => {
                json!({ "type": kind, "run_id": run_id.to_string(), "task_id": task_id })
            }
            Event::TaskCompleted { run_id, row, stats } => {
                json!({ "type": kind, "run_id": run_id.to_string(), "row": row, "stats": stats })
            }
            Event::AttemptStarted { run_id, task_id, attempt_no } => {
                json!({ "type": kind, "run_id": run_id.to_string(), "task_id": task_id, "attempt_no": attempt_no })
            }
            Event::AttemptFinished { run_id, task_id, attempt_no, succeeded, label, elapsed_ms } => {
                json!({
                    "type": kind,
                    "run_id": run_id.to_string(),
                    "task_id": task_id,
                    "attempt_no": attempt_no,
                    "succeeded": succeeded,
                    "label": label,
                    "elapsed_ms": elapsed_ms
                })
            }
            Event::RetryScheduled { run_id, task_id, attempt_no, delay_ms } => {
                json!({ "type": kind, "run_id": run_id.to_string(), "task_id": task_id, "attempt_no": attempt_no, "delay_ms": delay_ms })
            }
        }
    }
}

#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: Event);
}

pub struct CompositeEventSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl Default for CompositeEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeEventSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn with(mut self, sink: Box<dyn EventSink>) -> Self {
        self.add(sink);
        self
    }
}

#[async_trait]
impl EventSink for CompositeEventSink {
    async fn emit(&self, event: Event) {
        for sink in &self.sinks {
            sink.emit(event.clone()).await;
        }
    }
}

/// One JSON object per line on stdout.
pub struct StdoutEventSink;

#[async_trait]
impl EventSink for StdoutEventSink {
    async fn emit(&self, event: Event) {
        println!("{}", serde_json::to_string(&event.to_json()).unwrap_or_default());
    }
}

/// Forwards per-task events to `tracing`. Run start/finish and retries are
/// logged by the engine, not here.
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn emit(&self, event: Event) {
        match &event {
            Event::TaskCompleted { run_id, row, .. } => {
                tracing::info!(
                    run_id = %run_id,
                    task_id = row.id,
                    outcome = %row.outcome_summary,
                    label = %row.label,
                    response_time = %row.response_time_display,
                    "task completed"
                );
            }
            Event::TaskSkipped { run_id, task_id } => {
                tracing::debug!(run_id = %run_id, task_id, "task skipped");
            }
            Event::TaskStarted { run_id, task_id } => {
                tracing::trace!(run_id = %run_id, task_id, "task started");
            }
            Event::RunStarted { .. }
            | Event::RunFinished { .. }
            | Event::AttemptStarted { .. }
            | Event::AttemptFinished { .. }
            | Event::RetryScheduled { .. } => {}
        }
    }
}

pub struct NoOpEventSink;

#[async_trait]
impl EventSink for NoOpEventSink {
    async fn emit(&self, _event: Event) {}
}
