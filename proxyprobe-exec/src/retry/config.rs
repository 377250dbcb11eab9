use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Re-attempts after the first try; total attempts = `max_retries + 1`.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub factor: f64,
    pub max_delay: Duration,
    pub jitter: Jitter,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(1000),
            factor: 2.0,
            max_delay: Duration::from_millis(5000),
            jitter: Jitter::None,
        }
    }
}

impl RetryConfig {
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Jitter {
    /// Sleep exactly the computed backoff.
    #[default]
    None,
    /// Sleep a uniform random duration in `[0, backoff]`.
    Full,
}

impl FromStr for Jitter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(Jitter::None),
            "full" => Ok(Jitter::Full),
            other => Err(format!("unknown jitter mode '{other}' (expected none or full)")),
        }
    }
}
