//! Extracted content records handed to downstream indexing

use serde::{Deserialize, Serialize};

/// Sentinel used for a missing title or an undeterminable date
pub const UNKNOWN: &str = "Unknown";

/// Provenance metadata attached to every record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    url: String,
    title: String,
    /// Empty for repository records, which are not split by headline
    headline: String,
    /// `YYYY-MM-DD` or [`UNKNOWN`]
    date: String,
}

impl RecordMetadata {
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        headline: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            headline: headline.into(),
            date: date.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn headline(&self) -> &str {
        &self.headline
    }

    pub fn date(&self) -> &str {
        &self.date
    }
}

/// A unit of extracted content paired with its provenance
///
/// Records are immutable once constructed; all accessors borrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    content: String,
    metadata: RecordMetadata,
}

impl Record {
    pub fn new(content: impl Into<String>, metadata: RecordMetadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn metadata(&self) -> &RecordMetadata {
        &self.metadata
    }
}
