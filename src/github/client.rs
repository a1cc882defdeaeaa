//! Authenticated hosting-API client with the throttle-retry loop

use crate::fetch::Fetcher;
use crate::github::rate_limit::{is_throttled, RateLimiter};
use crate::HarvestError;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Response;
use serde::de::DeserializeOwned;

/// Media type requested from the API
pub const API_ACCEPT: &str = "application/vnd.github.v3+json";

/// Sends authenticated API requests, waiting out throttles
///
/// Transport failures are retried a bounded number of times by the
/// underlying [`Fetcher`]. Throttled responses are retried without bound
/// after each clearance wait. Every other non-success status is returned as
/// [`HarvestError::Status`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    fetcher: Fetcher,
    token: String,
    limiter: RateLimiter,
}

impl ApiClient {
    pub fn new(fetcher: Fetcher, token: impl Into<String>, limiter: RateLimiter) -> Self {
        Self {
            fetcher,
            token: token.into(),
            limiter,
        }
    }

    pub fn limiter(&self) -> RateLimiter {
        self.limiter
    }

    /// GETs `url` until it succeeds or fails for a reason other than throttling
    pub async fn get(&self, url: &str) -> Result<Response, HarvestError> {
        let authorization = format!("token {}", self.token);
        let mut throttled = 0u32;

        loop {
            let response = self
                .fetcher
                .send(url, |client| {
                    client
                        .get(url)
                        .header(AUTHORIZATION, authorization.as_str())
                        .header(ACCEPT, API_ACCEPT)
                })
                .await?;

            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            if is_throttled(status, response.headers()) {
                throttled += 1;
                tracing::debug!(url, throttled, status = status.as_u16(), "Request throttled");
                self.limiter.await_clearance(response.headers()).await;
                continue;
            }

            tracing::warn!(url, status = status.as_u16(), "API request failed");
            return Err(HarvestError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
    }

    /// GETs `url` and decodes the JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, HarvestError> {
        let response = self.get(url).await?;
        let body = response.bytes().await.map_err(|source| HarvestError::Http {
            url: url.to_string(),
            source,
        })?;

        serde_json::from_slice(&body).map_err(|e| HarvestError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// GETs `url` and returns the body as text
    pub async fn get_text(&self, url: &str) -> Result<String, HarvestError> {
        let response = self.get(url).await?;
        response.text().await.map_err(|source| HarvestError::Http {
            url: url.to_string(),
            source,
        })
    }
}
