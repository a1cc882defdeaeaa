//! Web crawler: link discovery and page extraction
//!
//! This module contains the crawling logic, including:
//! - HTML parsing and link extraction
//! - The shared visited set and breadth-first frontier
//! - Worker-pool crawl coordination
//! - Per-page record extraction over the discovered URLs

mod coordinator;
mod frontier;
mod parser;

pub use coordinator::{CrawlReport, WebCrawler, DEFAULT_WORKERS};
pub use frontier::{Frontier, PendingUrl, VisitedSet};
pub use parser::{extract_links_simple, parse_html, ParsedPage};

pub(crate) use parser::extract_title;

use crate::config::{FetcherConfig, UserAgentConfig};
use crate::extract::fetch_and_extract;
use crate::fetch::{build_http_client, Fetcher};
use crate::record::Record;
use crate::url::{parse_http_url, UrlPolicy};
use crate::HarvestError;
use futures::stream::{self, StreamExt};

/// Default number of pages extracted concurrently after a crawl
pub const DEFAULT_EXTRACT_CONCURRENCY: usize = 8;

/// Crawls from `entry_url` and returns every discovered URL
///
/// Uses the default user agent and fetcher settings. The result contains the
/// entry URL plus every policy-allowed link reached within `max_depth` hops,
/// each exactly once, in the order it was first scheduled.
///
/// # Errors
///
/// Fails if `entry_url` is not an absolute HTTP(S) URL or the HTTP client
/// cannot be built; unreachable pages are logged and skipped.
pub async fn start_web_crawl(
    entry_url: &str,
    max_depth: u32,
    policy: Option<UrlPolicy>,
) -> Result<Vec<String>, HarvestError> {
    parse_http_url(entry_url)?;
    let client = build_http_client(&UserAgentConfig::default())?;
    let fetcher = Fetcher::for_web(client, &FetcherConfig::default());

    let report = WebCrawler::new(fetcher, entry_url, max_depth)
        .with_policy(policy)
        .run()
        .await;

    Ok(report.into_urls())
}

/// Runs a crawl, then extracts records from every discovered page
///
/// Pages are re-fetched for extraction with at most `concurrency` requests in
/// flight. Records keep the crawl's URL order; pages that fail to fetch
/// contribute nothing.
pub async fn crawl_and_extract(
    crawler: &WebCrawler,
    concurrency: usize,
) -> (CrawlReport, Vec<Record>) {
    let report = crawler.run().await;
    let fetcher = crawler.fetcher();

    tracing::info!(pages = report.len(), "Extracting records from crawled pages");

    let pages: Vec<Option<Vec<Record>>> = stream::iter(report.urls())
        .map(|url| fetch_and_extract(fetcher, url))
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let failed = pages.iter().filter(|page| page.is_none()).count();
    let records: Vec<Record> = pages.into_iter().flatten().flatten().collect();

    tracing::info!(
        records = records.len(),
        failed_pages = failed,
        "Web extraction completed"
    );

    (report, records)
}
