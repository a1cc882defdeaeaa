//! HTTP fetcher shared by both crawlers
//!
//! This module handles all outbound HTTP requests, including:
//! - Building the HTTP client with a descriptive user agent string
//! - Per-request timeouts
//! - Bounded retry with exponential backoff on transport failures
//! - Classifying responses into success or HTTP error

use crate::config::{FetcherConfig, UserAgentConfig};
use crate::fetch::RetryPolicy;
use crate::HarvestError;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::future::Future;
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Content-Type header value
        content_type: String,
        /// Page body content
        body: String,
    },

    /// Server answered with something other than 200
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Transport failure that survived every retry
    NetworkError {
        /// Error description
        error: String,
        /// Number of attempts made
        attempts: u32,
    },
}

impl FetchResult {
    /// Returns the body of a successful fetch
    pub fn into_body(self) -> Option<String> {
        match self {
            FetchResult::Success { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed with reqwest's default policy; per-request
/// timeouts are applied by the [`Fetcher`] using it.
///
/// # Example
///
/// ```no_run
/// use sumi_harvest::config::UserAgentConfig;
/// use sumi_harvest::fetch::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Reusable request executor parameterized by timeout and retry policy
///
/// Cloning is cheap; the underlying client shares its connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
    retry: RetryPolicy,
}

impl Fetcher {
    pub fn new(client: Client, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            client,
            timeout,
            retry,
        }
    }

    /// Fetcher for web pages (15s timeout by default)
    pub fn for_web(client: Client, config: &FetcherConfig) -> Self {
        Self::new(
            client,
            config.web_timeout(),
            RetryPolicy::new(config.max_attempts, config.backoff_base()),
        )
    }

    /// Fetcher for hosting API calls (10s timeout by default)
    pub fn for_api(client: Client, config: &FetcherConfig) -> Self {
        Self::new(
            client,
            config.api_timeout(),
            RetryPolicy::new(config.max_attempts, config.backoff_base()),
        )
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Sends a request built by `build`, retrying transport failures
    ///
    /// The response is returned whatever its status, so callers can inspect
    /// headers (e.g. throttling signals) themselves.
    pub async fn send<F>(&self, url: &str, build: F) -> Result<Response, HarvestError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        self.with_retry(url, || build(&self.client).timeout(self.timeout).send())
            .await
            .map_err(|(error, _)| error)
    }

    /// Fetches a URL with a GET request
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 200 | Success |
    /// | Any other status | Immediate HttpError, logged |
    /// | Timeout / connection error | Retry with exponential backoff, then NetworkError |
    /// | Malformed URL | Immediate NetworkError |
    pub async fn fetch(&self, url: &str) -> FetchResult {
        match self.with_retry(url, || self.try_fetch(url)).await {
            Ok(FetchResult::HttpError { status_code }) => {
                tracing::warn!(url, status_code, "Couldn't fetch page");
                FetchResult::HttpError { status_code }
            }
            Ok(result) => result,
            Err((e, attempts)) => FetchResult::NetworkError {
                error: e.to_string(),
                attempts,
            },
        }
    }

    /// Fetches a URL and returns its body, or `None` on any failure
    pub async fn fetch_text(&self, url: &str) -> Option<String> {
        self.fetch(url).await.into_body()
    }

    async fn try_fetch(&self, url: &str) -> Result<FetchResult, reqwest::Error> {
        let response = self.client.get(url).timeout(self.timeout).send().await?;
        let status = response.status();

        if status != StatusCode::OK {
            return Ok(FetchResult::HttpError {
                status_code: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let body = response.text().await?;

        Ok(FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
        })
    }

    /// Runs `operation` until it succeeds, fails permanently, or the policy
    /// gives up; errors carry the number of attempts actually made
    async fn with_retry<T, F, Fut>(
        &self,
        url: &str,
        mut operation: F,
    ) -> Result<T, (HarvestError, u32)>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, reqwest::Error>>,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::debug!(url, attempt, "Request succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };

            if !is_transient(&error) {
                tracing::warn!(url, attempts = attempt, "Request failed: {}", error);
                return Err((
                    HarvestError::Http {
                        url: url.to_string(),
                        source: error,
                    },
                    attempt,
                ));
            }

            if !self.retry.should_retry(attempt) {
                tracing::warn!(url, attempts = attempt, "Failed to fetch URL: {}", error);
                let failure = if error.is_timeout() {
                    HarvestError::Timeout {
                        url: url.to_string(),
                    }
                } else {
                    HarvestError::Http {
                        url: url.to_string(),
                        source: error,
                    }
                };
                return Err((failure, attempt));
            }

            let delay = self.retry.backoff(attempt);
            tracing::debug!(
                url,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "Transient failure, backing off: {}",
                error
            );
            tokio::time::sleep(delay).await;
        }
    }
}

/// Timeouts, connection failures and interrupted bodies are worth retrying
fn is_transient(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request() || error.is_body()
}
