//! Web crawl coordinator - depth-bounded traversal with a bounded worker pool
//!
//! The coordinator owns the frontier and keeps at most `workers` page visits
//! in flight. Each visit fetches one page, extracts its links and claims the
//! unvisited, policy-allowed ones in the shared [`VisitedSet`]; the claimed
//! children come back to the coordinator and are queued one level deeper.
//! The crawl ends when the frontier is empty and no visit is running.

use crate::config::Config;
use crate::crawler::frontier::{Frontier, PendingUrl, VisitedSet};
use crate::crawler::parser::extract_links_simple;
use crate::fetch::{build_http_client, FetchResult, Fetcher};
use crate::state::NodeState;
use crate::url::UrlPolicy;
use crate::HarvestError;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use url::Url;

/// Default number of concurrent page visits
pub const DEFAULT_WORKERS: usize = 16;

/// Outcome of one crawl invocation
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    urls: Vec<String>,
    states: HashMap<String, NodeState>,

    /// Links seen on fetched pages, after per-page deduplication
    pub links_discovered: usize,

    /// Links dropped by the URL policy
    pub links_rejected: usize,

    /// Links already claimed by another page
    pub links_already_visited: usize,
}

impl CrawlReport {
    /// Discovered URLs in the order they were first scheduled
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    pub fn into_urls(self) -> Vec<String> {
        self.urls
    }

    pub fn state_of(&self, url: &str) -> Option<NodeState> {
        self.states.get(url).copied()
    }

    /// Number of URLs whose final state is `state`
    pub fn count(&self, state: NodeState) -> usize {
        self.states.values().filter(|s| **s == state).count()
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Everything a page visit needs, shared across spawned tasks
struct VisitContext {
    fetcher: Fetcher,
    visited: Arc<VisitedSet>,
    policy: Option<UrlPolicy>,
    max_depth: u32,
}

/// Result of visiting one page
#[derive(Debug)]
struct VisitOutcome {
    url: String,
    state: NodeState,
    children: Vec<PendingUrl>,
    links_discovered: usize,
    links_rejected: usize,
    links_already_visited: usize,
}

impl VisitOutcome {
    fn new(url: String) -> Self {
        Self {
            url,
            state: NodeState::Pending,
            children: Vec::new(),
            links_discovered: 0,
            links_rejected: 0,
            links_already_visited: 0,
        }
    }

    fn advance(&mut self, next: NodeState) {
        match self.state.transition(next) {
            Ok(state) => self.state = state,
            Err(e) => tracing::error!(url = %self.url, "{}", e),
        }
    }
}

/// Depth-bounded, policy-filtered web crawler
#[derive(Debug, Clone)]
pub struct WebCrawler {
    fetcher: Fetcher,
    entry_url: String,
    max_depth: u32,
    workers: usize,
    policy: Option<UrlPolicy>,
}

impl WebCrawler {
    /// Creates a crawler with no URL policy and the default worker count
    pub fn new(fetcher: Fetcher, entry_url: impl Into<String>, max_depth: u32) -> Self {
        Self {
            fetcher,
            entry_url: entry_url.into(),
            max_depth,
            workers: DEFAULT_WORKERS,
            policy: None,
        }
    }

    pub fn with_policy(mut self, policy: Option<UrlPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the worker pool size (at least one)
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Builds a crawler from the `[web]` section, if present
    pub fn from_config(config: &Config) -> Result<Option<Self>, HarvestError> {
        let Some(web) = &config.web else {
            return Ok(None);
        };

        let client = build_http_client(&config.user_agent)?;
        let fetcher = Fetcher::for_web(client, &config.fetcher);

        Ok(Some(
            Self::new(fetcher, web.entry_url.clone(), web.max_depth)
                .with_workers(web.workers)
                .with_policy(web.policy.as_ref().map(UrlPolicy::from)),
        ))
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub fn entry_url(&self) -> &str {
        &self.entry_url
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Runs the crawl to completion
    ///
    /// Never fails: pages that cannot be fetched end in
    /// [`NodeState::FetchFailed`] and the rest of the crawl continues.
    pub async fn run(&self) -> CrawlReport {
        tracing::info!(
            entry_url = %self.entry_url,
            max_depth = self.max_depth,
            workers = self.workers,
            "Starting web crawl"
        );
        let start_time = Instant::now();

        let visited = Arc::new(VisitedSet::new());
        let context = Arc::new(VisitContext {
            fetcher: self.fetcher.clone(),
            visited: Arc::clone(&visited),
            policy: self.policy.clone(),
            max_depth: self.max_depth,
        });

        let mut report = CrawlReport::default();
        let mut frontier = Frontier::new();
        let mut in_flight = JoinSet::new();

        visited.mark(&self.entry_url);
        report
            .states
            .insert(self.entry_url.clone(), NodeState::Pending);
        frontier.push(PendingUrl::new(self.entry_url.clone(), 0));

        let mut pages_visited = 0usize;

        loop {
            while in_flight.len() < self.workers {
                let Some(pending) = frontier.pop() else {
                    break;
                };
                in_flight.spawn(visit(Arc::clone(&context), pending));
            }

            let Some(joined) = in_flight.join_next().await else {
                break;
            };

            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Page visit task failed: {}", e);
                    continue;
                }
            };

            report.links_discovered += outcome.links_discovered;
            report.links_rejected += outcome.links_rejected;
            report.links_already_visited += outcome.links_already_visited;
            report.states.insert(outcome.url, outcome.state);

            for child in outcome.children {
                report.states.insert(child.url.clone(), NodeState::Pending);
                frontier.push(child);
            }

            pages_visited += 1;
            if pages_visited % 10 == 0 {
                tracing::info!(
                    "Progress: {} pages visited, {} in frontier, {} in flight",
                    pages_visited,
                    frontier.len(),
                    in_flight.len()
                );
            }
        }

        report.urls = visited.snapshot();

        tracing::info!(
            "Web crawl completed: {} URLs discovered in {:?}",
            report.urls.len(),
            start_time.elapsed()
        );

        report
    }
}

/// Fetches one page and claims its unvisited, allowed links
async fn visit(context: Arc<VisitContext>, pending: PendingUrl) -> VisitOutcome {
    let mut outcome = VisitOutcome::new(pending.url.clone());

    let body = match context.fetcher.fetch(&pending.url).await {
        FetchResult::Success { body, .. } => body,
        FetchResult::HttpError { status_code } => {
            tracing::debug!(url = %pending.url, status_code, "Page not expanded");
            outcome.advance(NodeState::FetchFailed);
            return outcome;
        }
        FetchResult::NetworkError { error, attempts } => {
            tracing::debug!(url = %pending.url, attempts, "Page not expanded: {}", error);
            outcome.advance(NodeState::FetchFailed);
            return outcome;
        }
    };
    outcome.advance(NodeState::Fetched);

    // Relative links resolve against the requested URL, not the post-redirect one
    let links = match Url::parse(&pending.url) {
        Ok(base) => extract_links_simple(&body, &base),
        Err(e) => {
            tracing::warn!(url = %pending.url, "Cannot resolve links: {}", e);
            Vec::new()
        }
    };
    outcome.links_discovered = links.len();

    if pending.depth >= context.max_depth {
        tracing::debug!(
            url = %pending.url,
            depth = pending.depth,
            links = links.len(),
            "Depth limit reached"
        );
        outcome.advance(NodeState::DepthLimit);
        return outcome;
    }

    for link in links {
        if !UrlPolicy::permits(context.policy.as_ref(), &link) {
            tracing::trace!(url = %link, "Rejected by policy");
            outcome.links_rejected += 1;
            continue;
        }

        if context.visited.mark(&link) {
            outcome
                .children
                .push(PendingUrl::new(link, pending.depth + 1));
        } else {
            outcome.links_already_visited += 1;
        }
    }

    tracing::debug!(
        url = %pending.url,
        depth = pending.depth,
        children = outcome.children.len(),
        "Page expanded"
    );
    outcome.advance(NodeState::Expanded);
    outcome
}
