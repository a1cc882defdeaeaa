//! Code-hosting organization crawler
//!
//! This module collects documentation files from an organization's
//! repositories:
//! - `client`: authenticated requests with the unbounded throttle-retry loop
//! - `rate_limit`: throttle detection and clearance waits
//! - `repos`: paginated repository listing
//! - `tree`: recursive contents walk with the file/directory filter
//! - `files`: content download and last-commit lookup into records

mod client;
mod crawler;
mod files;
mod rate_limit;
mod repos;
mod tree;
mod types;

pub use client::{ApiClient, API_ACCEPT};
pub use crawler::{RepositoryCrawler, DEFAULT_CONCURRENCY, MAX_PER_PAGE};
pub use files::normalize_commit_date;
pub use rate_limit::{
    clearance_delay, is_throttled, RateLimiter, DEFAULT_ABUSE_COOLDOWN, RATE_LIMIT_REMAINING,
    RATE_LIMIT_RESET,
};
pub use tree::TreeFilter;
pub use types::{DirectoryEntry, EntryKind, RepositoryDescriptor};

use crate::config::{FetcherConfig, RepositoryConfig, UserAgentConfig};
use crate::record::Record;
use crate::HarvestError;

/// Scrapes an organization's documentation with default settings
///
/// Uses the public API endpoint, the default user agent and fetcher
/// settings, and the default markdown filter.
pub async fn scrape_organization(
    organization: &str,
    token: &str,
    repo_limit: Option<usize>,
) -> Result<Vec<Record>, HarvestError> {
    let crawler = RepositoryCrawler::from_repository_config(
        &UserAgentConfig::default(),
        &FetcherConfig::default(),
        &RepositoryConfig::for_organization(organization),
        token,
    )?;

    Ok(crawler.scrape(organization, repo_limit).await)
}
