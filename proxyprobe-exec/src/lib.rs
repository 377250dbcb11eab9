#![forbid(unsafe_code)]

//! Concurrent probe engine: a bounded worker pool that runs each descriptor
//! through a retry policy and aggregates outcomes as they arrive.

pub mod executor;
pub mod probe;
pub mod retry;

pub use crate::executor::{
    CompletedProbe, EventSink, ExecutionError, ExecutorConfig, OutcomeStream, RunControl,
    RunSummary, Scheduler, StatsAggregator,
};
pub use crate::probe::{HttpProbeClient, ProbeClient};
pub use crate::retry::{RetryConfig, RetryPolicy};
