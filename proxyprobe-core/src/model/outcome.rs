use serde::{Deserialize, Serialize};

/// Why a descriptor did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "code", rename_all = "snake_case")]
pub enum FailureKind {
    /// The attempt exceeded its time budget.
    Timeout,
    /// The test endpoint could not be reached.
    NetworkError,
    /// The endpoint answered and reported a non-success condition.
    ApplicationError(String),
}

impl FailureKind {
    pub const TIMEOUT_LABEL: &'static str = "timeout";
    pub const NETWORK_ERROR_LABEL: &'static str = "NETWORK_ERROR";

    pub fn label(&self) -> &str {
        match self {
            FailureKind::Timeout => Self::TIMEOUT_LABEL,
            FailureKind::NetworkError => Self::NETWORK_ERROR_LABEL,
            FailureKind::ApplicationError(code) => code,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, FailureKind::Timeout | FailureKind::NetworkError)
    }
}

/// Final result of one descriptor, after retries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Outcome {
    Success {
        status_code: u16,
        response_time_ms: f64,
        details: String,
    },
    Failure {
        kind: FailureKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        response_time_ms: Option<f64>,
        details: String,
    },
}

impl Outcome {
    pub fn success(status_code: u16, response_time_ms: f64, details: impl Into<String>) -> Self {
        Outcome::Success {
            status_code,
            response_time_ms,
            details: details.into(),
        }
    }

    pub fn failure(kind: FailureKind, details: impl Into<String>) -> Self {
        Outcome::Failure {
            kind,
            response_time_ms: None,
            details: details.into(),
        }
    }

    pub fn timeout(details: impl Into<String>) -> Self {
        Self::failure(FailureKind::Timeout, details)
    }

    pub fn network_error(details: impl Into<String>) -> Self {
        Self::failure(FailureKind::NetworkError, details)
    }

    pub fn application_error(code: impl Into<String>, details: impl Into<String>) -> Self {
        Self::failure(FailureKind::ApplicationError(code.into()), details)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn failure_kind(&self) -> Option<&FailureKind> {
        match self {
            Outcome::Success { .. } => None,
            Outcome::Failure { kind, .. } => Some(kind),
        }
    }

    /// Histogram key: the status code on success, the failure label otherwise.
    pub fn label(&self) -> String {
        match self {
            Outcome::Success { status_code, .. } => status_code.to_string(),
            Outcome::Failure { kind, .. } => kind.label().to_string(),
        }
    }

    pub fn response_time_ms(&self) -> Option<f64> {
        match self {
            Outcome::Success {
                response_time_ms, ..
            } => Some(*response_time_ms),
            Outcome::Failure {
                response_time_ms, ..
            } => *response_time_ms,
        }
    }

    pub fn details(&self) -> &str {
        match self {
            Outcome::Success { details, .. } | Outcome::Failure { details, .. } => details,
        }
    }
}
