//! Recursive repository tree walk

use crate::github::crawler::RepositoryCrawler;
use crate::github::types::{DirectoryEntry, EntryKind, RepositoryDescriptor};
use futures::future::{self, BoxFuture, FutureExt};
use std::collections::BTreeSet;

/// Decides which files are collected and which directories are entered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeFilter {
    suffixes: Vec<String>,
    excluded_dirs: BTreeSet<String>,
}

impl Default for TreeFilter {
    /// Markdown files, skipping `.github`
    fn default() -> Self {
        Self::new([".md"], [".github"])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Collect,
    Descend,
    Skip,
}

impl TreeFilter {
    pub fn new<S, D>(suffixes: S, excluded_dirs: D) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        Self {
            suffixes: suffixes.into_iter().map(Into::into).collect(),
            excluded_dirs: excluded_dirs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    pub fn excluded_dirs(&self) -> &BTreeSet<String> {
        &self.excluded_dirs
    }

    /// Suffix match is case-sensitive: `README.MD` is not collected
    pub fn accepts_file(&self, name: &str) -> bool {
        self.suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
    }

    pub fn descends_into(&self, name: &str) -> bool {
        !self.excluded_dirs.contains(name)
    }

    fn classify(&self, entry: &DirectoryEntry) -> Visit {
        match entry.kind {
            EntryKind::File if self.accepts_file(&entry.name) => Visit::Collect,
            EntryKind::Dir if self.descends_into(&entry.name) => Visit::Descend,
            _ => Visit::Skip,
        }
    }
}

impl RepositoryCrawler {
    /// Lists every file under `path` accepted by the tree filter
    ///
    /// Subdirectories are listed concurrently; results keep listing order.
    /// A directory that cannot be listed contributes nothing.
    pub async fn list_markdown_files(
        &self,
        repository: &RepositoryDescriptor,
        path: &str,
    ) -> Vec<DirectoryEntry> {
        self.walk(repository, path.to_string()).await
    }

    fn walk<'a>(
        &'a self,
        repository: &'a RepositoryDescriptor,
        path: String,
    ) -> BoxFuture<'a, Vec<DirectoryEntry>> {
        async move {
            let entries = match self.list_directory(repository, &path).await {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(
                        repository = %repository.full_name,
                        path = %path,
                        "Skipping directory: {}",
                        e
                    );
                    return Vec::new();
                }
            };

            let branches: Vec<BoxFuture<'a, Vec<DirectoryEntry>>> = entries
                .into_iter()
                .filter_map(|entry| match self.filter.classify(&entry) {
                    Visit::Collect => Some(future::ready(vec![entry]).boxed()),
                    Visit::Descend => Some(self.walk(repository, entry.path)),
                    Visit::Skip => None,
                })
                .collect();

            future::join_all(branches)
                .await
                .into_iter()
                .flatten()
                .collect()
        }
        .boxed()
    }

    async fn list_directory(
        &self,
        repository: &RepositoryDescriptor,
        path: &str,
    ) -> Result<Vec<DirectoryEntry>, crate::HarvestError> {
        let url = self.contents_endpoint(repository, path)?;
        self.client.get_json(&url).await
    }
}
