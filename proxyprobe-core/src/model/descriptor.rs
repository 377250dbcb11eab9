use serde::{Deserialize, Serialize};

/// One unit of probe work. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDescriptor {
    pub id: u64,
    pub target_url: String,
    pub proxy_url: String,
}

impl TaskDescriptor {
    pub fn new(id: u64, target_url: impl Into<String>, proxy_url: impl Into<String>) -> Self {
        Self {
            id,
            target_url: target_url.into(),
            proxy_url: proxy_url.into(),
        }
    }

    /// Builds `count` descriptors for the same target/proxy pair with ids
    /// `first_id..first_id + count`.
    pub fn batch(first_id: u64, count: usize, target_url: &str, proxy_url: &str) -> Vec<Self> {
        (0..count as u64)
            .map(|i| Self::new(first_id + i, target_url, proxy_url))
            .collect()
    }
}
