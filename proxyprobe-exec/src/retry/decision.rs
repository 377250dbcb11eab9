use std::time::Duration;

use proxyprobe_core::{FailureKind, Outcome};

use crate::retry::config::{Jitter, RetryConfig};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter { delay: Duration, reason: RetryReason },
    Stop { reason: RetryReason },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryReason {
    Succeeded,
    NotRetryable,
    AttemptsExhausted,
    Timeout,
    NetworkFailure,
}

/// Decide if we should retry and how long to wait.
///
/// - `attempt_no`: 1-based number of the attempt that produced `outcome`.
/// - `rand_u64`: RNG for full jitter.
pub fn decide_retry(
    cfg: &RetryConfig,
    attempt_no: u32,
    outcome: &Outcome,
    rand_u64: impl Fn() -> u64,
) -> RetryDecision {
    let Some(kind) = outcome.failure_kind() else {
        return RetryDecision::Stop {
            reason: RetryReason::Succeeded,
        };
    };
    if !kind.is_transient() {
        return RetryDecision::Stop {
            reason: RetryReason::NotRetryable,
        };
    }
    let reason = match kind {
        FailureKind::Timeout => RetryReason::Timeout,
        _ => RetryReason::NetworkFailure,
    };

    if attempt_no >= cfg.max_attempts() {
        return RetryDecision::Stop {
            reason: RetryReason::AttemptsExhausted,
        };
    }

    let raw_ms = backoff_delay(cfg, attempt_no).as_millis() as u64;
    let delay_ms = match cfg.jitter {
        Jitter::None => raw_ms,
        Jitter::Full if raw_ms == 0 => 0,
        Jitter::Full => rand_u64() % raw_ms.saturating_add(1),
    };
    RetryDecision::RetryAfter {
        delay: Duration::from_millis(delay_ms),
        reason,
    }
}

/// Exponential backoff without jitter: `base * factor^(attempt_no-1)`,
/// capped at `max_delay`.
pub fn backoff_delay(cfg: &RetryConfig, attempt_no: u32) -> Duration {
    let exp = attempt_no.saturating_sub(1).min(i32::MAX as u32) as i32;
    let raw = (cfg.base_delay.as_millis() as f64) * cfg.factor.powi(exp);
    let capped = raw.min(cfg.max_delay.as_millis() as f64).max(0.0);
    Duration::from_millis(capped as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_then_caps() {
        let cfg = RetryConfig::default();
        let delays: Vec<u64> = (1..=5)
            .map(|n| backoff_delay(&cfg, n).as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![1000, 2000, 4000, 5000, 5000]);
    }

    #[test]
    fn full_jitter_stays_within_backoff() {
        let cfg = RetryConfig {
            jitter: Jitter::Full,
            ..Default::default()
        };
        let d = decide_retry(&cfg, 2, &Outcome::network_error("reset"), || 12_345);
        assert_eq!(
            d,
            RetryDecision::RetryAfter {
                delay: Duration::from_millis(12_345 % 2001),
                reason: RetryReason::NetworkFailure,
            }
        );
    }

    #[test]
    fn only_transient_failures_are_retried() {
        let cfg = RetryConfig::default();
        for outcome in [
            Outcome::timeout("slow"),
            Outcome::network_error("reset"),
            Outcome::application_error("CONNECTION_ERROR", "refused by proxy"),
        ] {
            let transient = outcome.failure_kind().is_some_and(FailureKind::is_transient);
            let retried = matches!(
                decide_retry(&cfg, 1, &outcome, || 0),
                RetryDecision::RetryAfter { .. }
            );
            assert_eq!(retried, transient, "{outcome:?}");
        }
    }

    #[test]
    fn full_jitter_survives_the_largest_delay() {
        let cfg = RetryConfig {
            base_delay: Duration::from_millis(u64::MAX),
            max_delay: Duration::from_millis(u64::MAX),
            jitter: Jitter::Full,
            ..Default::default()
        };
        assert_eq!(backoff_delay(&cfg, 1), Duration::from_millis(u64::MAX));
        let d = decide_retry(&cfg, 1, &Outcome::timeout("slow"), || u64::MAX - 1);
        assert_eq!(
            d,
            RetryDecision::RetryAfter {
                delay: Duration::from_millis(u64::MAX - 1),
                reason: RetryReason::Timeout,
            }
        );
    }
}
