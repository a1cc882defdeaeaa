//! Crawl frontier and visited-set bookkeeping
//!
//! The [`VisitedSet`] is the only state shared between concurrently running
//! page visits. Its [`VisitedSet::mark`] performs check-and-insert under one
//! lock, so two visits discovering the same link cannot both schedule it.

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, PoisonError};

/// A URL waiting to be fetched at a given depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUrl {
    pub url: String,
    pub depth: u32,
}

impl PendingUrl {
    pub fn new(url: impl Into<String>, depth: u32) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// Insertion-ordered set of URLs scheduled during one crawl
#[derive(Debug, Default)]
pub struct VisitedSet {
    inner: Mutex<VisitedInner>,
}

#[derive(Debug, Default)]
struct VisitedInner {
    seen: HashSet<String>,
    order: Vec<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a URL as visited
    ///
    /// Returns `true` if the URL was not yet present, in which case the
    /// caller owns scheduling it.
    pub fn mark(&self, url: &str) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if inner.seen.contains(url) {
            return false;
        }
        inner.seen.insert(url.to_string());
        inner.order.push(url.to_string());
        true
    }

    pub fn contains(&self, url: &str) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .seen
            .contains(url)
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the visited URLs in the order they were marked
    pub fn snapshot(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .clone()
    }
}

/// FIFO queue of pending URLs, giving breadth-first visiting order
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<PendingUrl>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pending: PendingUrl) {
        tracing::trace!(url = %pending.url, depth = pending.depth, "Queued");
        self.queue.push_back(pending);
    }

    pub fn pop(&mut self) -> Option<PendingUrl> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
