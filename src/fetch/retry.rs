//! Exponential backoff for transient transport failures
//!
//! This policy only covers timeouts and connection errors. API throttling has
//! its own unbounded wait-and-retry loop in [`crate::github::rate_limit`].

use std::time::Duration;

/// Default number of attempts per request, including the first one
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default backoff base; the n-th retry waits `base * 2^n`
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy; `max_attempts` is clamped to at least one
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether another attempt follows the `attempt`-th failure (1-indexed)
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay slept after the `attempt`-th failure (1-indexed)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor)
    }
}
