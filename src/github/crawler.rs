//! Organization documentation crawler
//!
//! Listing, tree walking and file materialization live in sibling modules as
//! further `impl RepositoryCrawler` blocks.

use crate::config::{Config, FetcherConfig, RepositoryConfig, UserAgentConfig};
use crate::fetch::{build_http_client, Fetcher};
use crate::github::client::ApiClient;
use crate::github::rate_limit::RateLimiter;
use crate::github::tree::TreeFilter;
use crate::github::types::RepositoryDescriptor;
use crate::record::Record;
use crate::{HarvestError, UrlError};
use futures::stream::{self, StreamExt};
use std::time::Instant;
use url::Url;

/// Largest page size the API accepts
pub const MAX_PER_PAGE: usize = 100;

/// Default number of concurrent repositories or files
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Collects documentation files from every repository of an organization
#[derive(Debug, Clone)]
pub struct RepositoryCrawler {
    pub(crate) client: ApiClient,
    pub(crate) api_base: String,
    pub(crate) per_page: usize,
    pub(crate) concurrency: usize,
    pub(crate) filter: TreeFilter,
}

impl RepositoryCrawler {
    pub fn new(client: ApiClient, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            per_page: MAX_PER_PAGE,
            concurrency: DEFAULT_CONCURRENCY,
            filter: TreeFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: TreeFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Sets how many repositories (and files per repository) are processed at once
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Sets the listing page size, clamped to `1..=100`
    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    /// Builds a crawler from a repository section and an already-resolved token
    pub fn from_repository_config(
        user_agent: &UserAgentConfig,
        fetcher: &FetcherConfig,
        repository: &RepositoryConfig,
        token: &str,
    ) -> Result<Self, HarvestError> {
        let client = build_http_client(user_agent)?;
        let fetcher = Fetcher::for_api(client, fetcher);
        let limiter = RateLimiter::new(repository.abuse_cooldown());

        Ok(
            Self::new(ApiClient::new(fetcher, token, limiter), repository.api_base.clone())
                .with_per_page(repository.per_page)
                .with_concurrency(repository.concurrency)
                .with_filter(TreeFilter::new(
                    repository.file_suffixes.iter().cloned(),
                    repository.excluded_dirs.iter().cloned(),
                )),
        )
    }

    /// Builds a crawler from the `[repository]` section, if present
    ///
    /// # Errors
    ///
    /// [`HarvestError::MissingToken`] when the configured environment
    /// variable holding the API token is unset.
    pub fn from_config(config: &Config) -> Result<Option<Self>, HarvestError> {
        let Some(repository) = &config.repository else {
            return Ok(None);
        };

        let token = std::env::var(&repository.token_env)
            .map_err(|_| HarvestError::MissingToken(repository.token_env.clone()))?;

        Self::from_repository_config(&config.user_agent, &config.fetcher, repository, &token)
            .map(Some)
    }

    pub fn filter(&self) -> &TreeFilter {
        &self.filter
    }

    /// Scrapes every documentation file of `organization` into records
    ///
    /// Never fails as a whole: listing errors truncate the repository list,
    /// unreadable directories and files are skipped.
    pub async fn scrape(&self, organization: &str, repo_limit: Option<usize>) -> Vec<Record> {
        tracing::info!(organization, ?repo_limit, "Starting repository crawl");
        let start_time = Instant::now();

        let repositories = self.list_repositories(organization, repo_limit).await;
        tracing::info!(
            organization,
            repositories = repositories.len(),
            "Listed repositories"
        );

        let per_repository: Vec<Vec<Record>> = stream::iter(&repositories)
            .map(|repository| self.scrape_repository(repository))
            .buffered(self.concurrency)
            .collect()
            .await;

        let records: Vec<Record> = per_repository.into_iter().flatten().collect();

        tracing::info!(
            "Repository crawl completed: {} records from {} repositories in {:?}",
            records.len(),
            repositories.len(),
            start_time.elapsed()
        );

        records
    }

    /// Walks one repository and materializes its documentation files
    pub async fn scrape_repository(&self, repository: &RepositoryDescriptor) -> Vec<Record> {
        let files = self.list_markdown_files(repository, "").await;
        tracing::debug!(
            repository = %repository.full_name,
            files = files.len(),
            "Collected documentation files"
        );

        let records: Vec<Option<Record>> = stream::iter(&files)
            .map(|entry| self.materialize(repository, entry))
            .buffered(self.concurrency)
            .collect()
            .await;

        records.into_iter().flatten().collect()
    }

    /// Absolute API URL for `path` with the given query parameters
    pub(crate) fn endpoint(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<String, HarvestError> {
        let mut url = Url::parse(&format!(
            "{}/{}",
            self.api_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))?;

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        Ok(url.to_string())
    }

    /// Contents API URL for `path` inside `repository`
    ///
    /// Each path component is percent-encoded, so names such as `C#` or
    /// `why?.md` address the right resource.
    pub(crate) fn contents_endpoint(
        &self,
        repository: &RepositoryDescriptor,
        path: &str,
    ) -> Result<String, HarvestError> {
        let base = self.endpoint(&format!("repos/{}/contents", repository.full_name), &[])?;
        let mut url = Url::parse(&base)?;
        url.path_segments_mut()
            .map_err(|_| UrlError::Parse(base.clone()))?
            .extend(path.split('/').filter(|segment| !segment.is_empty()));

        Ok(url.to_string())
    }
}

/// Crawler with fast-failing transport, for unit tests
#[cfg(test)]
pub(crate) fn test_crawler(api_base: &str) -> RepositoryCrawler {
    use crate::fetch::RetryPolicy;
    use std::time::Duration;

    let client = build_http_client(&UserAgentConfig::default()).unwrap();
    let fetcher = Fetcher::new(
        client,
        Duration::from_secs(1),
        RetryPolicy::new(1, Duration::from_millis(1)),
    );
    RepositoryCrawler::new(
        ApiClient::new(fetcher, "secret", RateLimiter::default()),
        api_base,
    )
}
