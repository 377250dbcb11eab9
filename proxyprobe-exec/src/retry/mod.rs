mod config;
mod decision;
mod policy;

pub use config::{Jitter, RetryConfig};
pub use decision::{backoff_delay, decide_retry, RetryDecision, RetryReason};
pub use policy::{Execution, RetryPolicy};
