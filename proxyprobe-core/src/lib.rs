#![forbid(unsafe_code)]

//! Data model for proxy probe runs.
//!
//! Everything here is plain data: descriptors, outcomes, statistics and the
//! validated run parameters. The async engine lives in `proxyprobe-exec`.

pub mod error;
pub mod model;

pub use crate::error::{ValidationError, Violation};
pub use crate::model::{
    FailureKind, Outcome, ResponseTimeSummary, RunParams, Stats, TaskDescriptor,
};
