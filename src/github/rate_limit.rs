//! Throttle detection and clearance waits for the hosting API
//!
//! The API signals throttling in two ways:
//! - primary limit: `403` (or `429`) with `X-RateLimit-Remaining: 0` and an
//!   `X-RateLimit-Reset` epoch timestamp
//! - abuse detection: `403`/`429` with `Retry-After` and no reset time
//!
//! A primary-limit wait lasts until the reset time; an abuse wait lasts a
//! fixed cooldown.

use chrono::Utc;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use std::time::Duration;

pub const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
pub const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

/// Wait applied when a throttled response carries no reset time
pub const DEFAULT_ABUSE_COOLDOWN: Duration = Duration::from_secs(60);

/// Returns true when a response means "slow down", not "denied"
///
/// A bare `403` without rate-limit headers is a permission problem and is
/// not treated as throttling.
pub fn is_throttled(status: StatusCode, headers: &HeaderMap) -> bool {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return true;
    }
    if status != StatusCode::FORBIDDEN {
        return false;
    }

    let exhausted = header_i64(headers, RATE_LIMIT_REMAINING) == Some(0);
    exhausted || headers.contains_key(RETRY_AFTER)
}

/// Computes how long to wait before retrying a throttled request
///
/// `max(0, reset - now)` when `X-RateLimit-Reset` is present and numeric,
/// otherwise `cooldown`.
pub fn clearance_delay(headers: &HeaderMap, now_epoch_secs: i64, cooldown: Duration) -> Duration {
    match header_i64(headers, RATE_LIMIT_RESET) {
        Some(reset) => Duration::from_secs(reset.saturating_sub(now_epoch_secs).max(0) as u64),
        None => cooldown,
    }
}

fn header_i64(headers: &HeaderMap, name: &str) -> Option<i64> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

/// Sleeps until the API is willing to serve requests again
#[derive(Debug, Clone, Copy)]
pub struct RateLimiter {
    cooldown: Duration,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_ABUSE_COOLDOWN)
    }
}

impl RateLimiter {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Waits out the throttle described by `headers` and returns the wait
    pub async fn await_clearance(&self, headers: &HeaderMap) -> Duration {
        let delay = clearance_delay(headers, Utc::now().timestamp(), self.cooldown);

        if headers.contains_key(RATE_LIMIT_RESET) {
            tracing::warn!(
                wait_secs = delay.as_secs(),
                "Rate limit exceeded, sleeping until reset"
            );
        } else {
            tracing::warn!(
                wait_secs = delay.as_secs(),
                "Abuse detection triggered, cooling down"
            );
        }

        tokio::time::sleep(delay).await;
        delay
    }
}
