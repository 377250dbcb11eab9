use proxyprobe_core::{FailureKind, Outcome};
use serde::Deserialize;

/// Reply shape of the test endpoint.
///
/// `responseTime` is reported in seconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointReply {
    pub success: bool,
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub response_time: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

impl EndpointReply {
    pub fn into_outcome(self) -> Outcome {
        let response_time_ms = self.response_time.map(|secs| secs * 1000.0);
        let details = self.details.unwrap_or_default();

        if self.success {
            return match self.status_code {
                Some(status_code) => Outcome::Success {
                    status_code,
                    response_time_ms: response_time_ms.unwrap_or(0.0),
                    details,
                },
                None => Outcome::application_error(
                    "INVALID_REPLY",
                    "endpoint reported success without a statusCode",
                ),
            };
        }

        let kind = match self.error.as_deref() {
            Some(FailureKind::TIMEOUT_LABEL) => FailureKind::Timeout,
            Some(code) if !code.is_empty() => FailureKind::ApplicationError(code.to_string()),
            _ => FailureKind::ApplicationError("UNKNOWN_ERROR".to_string()),
        };
        Outcome::Failure {
            kind,
            response_time_ms,
            details,
        }
    }
}
