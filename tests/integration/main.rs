//! Integration tests for both crawlers
//!
//! These tests use wiremock to create mock HTTP servers and exercise the
//! fetcher, the web crawl and the repository crawl end-to-end.

mod fetch_tests;
mod repository_tests;

use std::time::Duration;
use sumi_harvest::config::UserAgentConfig;
use sumi_harvest::fetch::{build_http_client, Fetcher, RetryPolicy};
use sumi_harvest::github::{ApiClient, RateLimiter, RepositoryCrawler};

/// Fetcher with short timeouts and fast backoff
pub fn test_fetcher(max_attempts: u32) -> Fetcher {
    let client = build_http_client(&UserAgentConfig::default()).expect("client builds");
    Fetcher::new(
        client,
        Duration::from_secs(2),
        RetryPolicy::new(max_attempts, Duration::from_millis(10)),
    )
}

/// Repository crawler pointed at a mock API, with a short abuse cooldown
pub fn test_repository_crawler(api_base: &str) -> RepositoryCrawler {
    let api = ApiClient::new(
        test_fetcher(1),
        "secret",
        RateLimiter::new(Duration::from_millis(50)),
    );
    RepositoryCrawler::new(api, api_base)
}

/// Minimal HTML page with a title and the given anchors
pub fn html_page(title: &str, hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body>{}</body></html>",
        title, anchors
    )
}
