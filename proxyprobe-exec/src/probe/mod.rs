//! Single-attempt probe against the external test endpoint.

mod http;
mod reply;

use async_trait::async_trait;
use proxyprobe_core::{Outcome, TaskDescriptor};
use serde::Serialize;

pub use http::{HttpProbeClient, ProbeError};
pub use reply::EndpointReply;

/// Body sent to the test endpoint for one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeRequest {
    pub target_url: String,
    pub proxy_url: String,
    pub request_id: u64,
}

impl From<&TaskDescriptor> for ProbeRequest {
    fn from(d: &TaskDescriptor) -> Self {
        Self {
            target_url: d.target_url.clone(),
            proxy_url: d.proxy_url.clone(),
            request_id: d.id,
        }
    }
}

/// Issues exactly one probe attempt. Implementations never retry and never
/// fail: transport problems are reported as `Outcome::Failure`.
#[async_trait]
pub trait ProbeClient: Send + Sync {
    async fn probe(&self, descriptor: &TaskDescriptor) -> Outcome;
}
