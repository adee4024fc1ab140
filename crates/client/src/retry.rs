// crates/client/src/retry.rs
//! Exponential backoff with bounded jitter.

use std::time::Duration;

use rand::Rng;

/// Retry settings for idempotent calls.
///
/// Non-idempotent calls always get exactly one attempt regardless of
/// `max_attempts`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Upper bound of the uniform jitter factor added to each delay.
    pub max_jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(30_000),
            max_jitter: 0.2,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn attempts_for(&self, idempotent: bool) -> u32 {
        if idempotent {
            self.max_attempts.max(1)
        } else {
            1
        }
    }

    /// Delay to wait after the failed 0-based `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let jitter = if self.max_jitter > 0.0 {
            rand::thread_rng().gen_range(0.0..=self.max_jitter)
        } else {
            0.0
        };
        self.delay_with_jitter(attempt, jitter)
    }

    /// `min(base * 2^attempt * (1 + jitter), max)`.
    pub fn delay_with_jitter(&self, attempt: u32, jitter: f64) -> Duration {
        let base_ms = self.base_delay.as_secs_f64() * 1000.0;
        let cap_ms = self.max_delay.as_secs_f64() * 1000.0;
        let exp = 2f64.powi(attempt.min(62) as i32);
        let ms = (base_ms * exp * (1.0 + jitter)).min(cap_ms);
        Duration::from_millis(ms.round() as u64)
    }
}
