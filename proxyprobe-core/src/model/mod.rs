mod descriptor;
mod outcome;
mod params;
mod stats;

pub use descriptor::TaskDescriptor;
pub use outcome::{FailureKind, Outcome};
pub use params::RunParams;
pub use stats::{ResponseTimeSummary, Stats};
