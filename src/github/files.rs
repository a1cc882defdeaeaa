//! Turning repository files into records

use crate::github::crawler::RepositoryCrawler;
use crate::github::types::{CommitEntry, DirectoryEntry, RepositoryDescriptor};
use crate::record::{Record, RecordMetadata, UNKNOWN};
use chrono::DateTime;

/// Reduces an RFC 3339 commit timestamp to `YYYY-MM-DD`, or `"Unknown"`
pub fn normalize_commit_date(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|timestamp| timestamp.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| UNKNOWN.to_string())
}

impl RepositoryCrawler {
    /// Downloads a file's raw content
    ///
    /// Returns `None` (logged) when the entry has no download URL or the
    /// download fails for a reason other than throttling.
    pub async fn fetch_file_content(&self, entry: &DirectoryEntry) -> Option<String> {
        let Some(download_url) = entry.download_url.as_deref() else {
            tracing::debug!(path = %entry.path, "Entry has no download URL");
            return None;
        };

        match self.client.get_text(download_url).await {
            Ok(content) => Some(content),
            Err(e) => {
                tracing::warn!(path = %entry.path, "Couldn't download file: {}", e);
                None
            }
        }
    }

    /// Date of the most recent commit touching `path`, as `YYYY-MM-DD`
    ///
    /// `"Unknown"` when the history is empty, unreadable or undated.
    pub async fn last_modified(&self, repository: &RepositoryDescriptor, path: &str) -> String {
        let resource = format!("repos/{}/commits", repository.full_name);
        let url = match self.endpoint(&resource, &[("path", path), ("per_page", "1")]) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(path, "Cannot build commit history URL: {}", e);
                return UNKNOWN.to_string();
            }
        };

        match self.client.get_json::<Vec<CommitEntry>>(&url).await {
            Ok(commits) => commits
                .first()
                .and_then(CommitEntry::committed_at)
                .map_or_else(|| UNKNOWN.to_string(), normalize_commit_date),
            Err(e) => {
                tracing::debug!(path, "No commit history: {}", e);
                UNKNOWN.to_string()
            }
        }
    }

    /// Downloads a file and its last-modified date into a record
    ///
    /// Content and history are requested concurrently. Files whose content
    /// cannot be downloaded yield `None`.
    pub async fn materialize(
        &self,
        repository: &RepositoryDescriptor,
        entry: &DirectoryEntry,
    ) -> Option<Record> {
        let (content, date) = tokio::join!(
            self.fetch_file_content(entry),
            self.last_modified(repository, &entry.path)
        );

        let metadata = RecordMetadata::new(
            entry.html_url.clone().unwrap_or_default(),
            format!("{}/{}", repository.short_name(), entry.path),
            "",
            date,
        );

        Some(Record::new(content?, metadata))
    }
}
