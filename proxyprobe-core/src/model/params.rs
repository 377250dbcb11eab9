use serde::{Deserialize, Serialize};

use crate::error::{ValidationError, Violation};
use crate::model::TaskDescriptor;

const TARGET_SCHEMES: &[&str] = &["http", "https"];
const PROXY_SCHEMES: &[&str] = &["http", "https", "socks5", "socks5h"];

/// Parameters for one run, as supplied by a CLI or form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunParams {
    pub target_url: String,
    /// Empty means "no proxy".
    #[serde(default)]
    pub proxy_url: String,
    pub test_count: usize,
    pub concurrency: usize,
}

impl RunParams {
    pub fn new(
        target_url: impl Into<String>,
        proxy_url: impl Into<String>,
        test_count: usize,
        concurrency: usize,
    ) -> Result<Self, ValidationError> {
        let params = Self {
            target_url: target_url.into().trim().to_string(),
            proxy_url: proxy_url.into().trim().to_string(),
            test_count,
            concurrency,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut violations = Vec::new();

        if self.test_count == 0 {
            violations.push(Violation::new("testCount", "must be greater than 0"));
        }
        if self.concurrency == 0 {
            violations.push(Violation::new("concurrency", "must be greater than 0"));
        }

        if self.target_url.is_empty() {
            violations.push(Violation::new("targetUrl", "must not be empty"));
        } else if let Some(msg) = check_url(&self.target_url, TARGET_SCHEMES) {
            violations.push(Violation::new("targetUrl", msg));
        }

        if !self.proxy_url.is_empty() {
            if let Some(msg) = check_url(&self.proxy_url, PROXY_SCHEMES) {
                violations.push(Violation::new("proxyUrl", msg));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(violations))
        }
    }

    /// One descriptor per requested probe, ids starting at 1.
    pub fn descriptors(&self) -> Vec<TaskDescriptor> {
        TaskDescriptor::batch(1, self.test_count, &self.target_url, &self.proxy_url)
    }
}

fn check_url(raw: &str, schemes: &[&str]) -> Option<String> {
    match url::Url::parse(raw) {
        Ok(u) if schemes.contains(&u.scheme()) => None,
        Ok(u) => Some(format!(
            "unsupported scheme '{}' (expected one of: {})",
            u.scheme(),
            schemes.join(", ")
        )),
        Err(e) => Some(format!("invalid URL: {e}")),
    }
}
