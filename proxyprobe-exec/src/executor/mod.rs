mod backlog;
mod collector;
pub mod concurrency;
mod control;
pub mod events;
mod result;
mod scheduler;
mod stats;
mod stream;
mod types;
mod worker;

pub use backlog::Backlog;
pub use concurrency::{InFlightGauge, InFlightPermit};
pub use control::{Cancelled, RunControl, RunState};
pub use events::{
    CompositeEventSink, Event, EventSink, NoOpEventSink, StdoutEventSink, TracingEventSink,
};
pub use result::{ExecutionError, RunSummary};
pub use scheduler::Scheduler;
pub use stats::StatsAggregator;
pub use stream::OutcomeStream;
pub use types::{CompletedProbe, ExecutorConfig, ResultRow, DEFAULT_ENDPOINT};
