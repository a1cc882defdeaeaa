//! Shared HTTP transport
//!
//! Both crawlers route every request through a [`Fetcher`], which owns the
//! timeout and the transient-failure retry policy for its call sites.

mod fetcher;
mod retry;

pub use fetcher::{build_http_client, FetchResult, Fetcher};
pub use retry::{RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};
