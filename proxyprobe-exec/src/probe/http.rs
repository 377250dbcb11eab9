use std::time::Duration;

use async_trait::async_trait;
use proxyprobe_core::{Outcome, TaskDescriptor};

use crate::executor::ExecutorConfig;
use crate::probe::{EndpointReply, ProbeClient, ProbeRequest};

#[derive(Debug, Clone, thiserror::Error)]
pub enum ProbeError {
    #[error("timeout")]
    Timeout,
    #[error("connect/dns/tls error: {0}")]
    Network(String),
    #[error("endpoint returned HTTP {0} with an unreadable body")]
    HttpStatus(u16),
    #[error("invalid endpoint reply: {0}")]
    InvalidReply(String),
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl ProbeError {
    fn into_outcome(self, timeout: Duration) -> Outcome {
        match self {
            ProbeError::Timeout => {
                Outcome::timeout(format!("no reply within {}ms", timeout.as_millis()))
            }
            ProbeError::Network(msg) => Outcome::network_error(msg),
            ProbeError::HttpStatus(code) => Outcome::application_error(
                format!("HTTP_{code}"),
                format!("test endpoint answered HTTP {code} without a readable reply"),
            ),
            ProbeError::InvalidReply(msg) => Outcome::application_error("INVALID_REPLY", msg),
            ProbeError::Client(msg) => Outcome::network_error(msg),
        }
    }
}

/// Probe client that POSTs `{targetUrl, proxyUrl, requestId}` as JSON to the
/// test endpoint.
pub struct HttpProbeClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpProbeClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, ProbeError> {
        // The endpoint applies the proxy under test; ambient HTTP_PROXY settings
        // must not apply to the endpoint call itself.
        let client = reqwest::Client::builder()
            .no_proxy()
            .user_agent(concat!("proxyprobe/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProbeError::Client(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }

    pub fn from_config(config: &ExecutorConfig) -> Result<Self, ProbeError> {
        Self::new(config.endpoint.clone(), config.probe_timeout)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send(&self, req: &ProbeRequest) -> Result<EndpointReply, ProbeError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(req)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = resp.status();

        let body = resp.bytes().await.map_err(map_reqwest_error)?;
        match serde_json::from_slice::<EndpointReply>(&body) {
            Ok(reply) => Ok(reply),
            Err(_) if !status.is_success() => Err(ProbeError::HttpStatus(status.as_u16())),
            Err(e) => Err(ProbeError::InvalidReply(e.to_string())),
        }
    }
}

#[async_trait]
impl ProbeClient for HttpProbeClient {
    async fn probe(&self, descriptor: &TaskDescriptor) -> Outcome {
        match self.send(&ProbeRequest::from(descriptor)).await {
            Ok(reply) => reply.into_outcome(),
            Err(e) => e.into_outcome(self.timeout),
        }
    }
}

fn map_reqwest_error(e: reqwest::Error) -> ProbeError {
    if e.is_timeout() {
        return ProbeError::Timeout;
    }
    ProbeError::Network(e.to_string())
}
