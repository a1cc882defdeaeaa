//! Hosting-API payloads
//!
//! Only the fields the crawler reads are declared; serde ignores the rest.

use serde::{Deserialize, Serialize};

/// One repository from an organization listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryDescriptor {
    /// `owner/name`
    pub full_name: String,
}

impl RepositoryDescriptor {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
        }
    }

    /// The repository name without its owner
    pub fn short_name(&self) -> &str {
        self.full_name
            .rsplit_once('/')
            .map_or(self.full_name.as_str(), |(_, name)| name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    /// Symlinks, submodules and anything newer
    #[serde(other)]
    Other,
}

/// One item of a repository contents listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Element of the commit history endpoint's response
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CommitEntry {
    pub commit: CommitDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CommitDetail {
    #[serde(default)]
    pub committer: Option<CommitSignature>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CommitSignature {
    #[serde(default)]
    pub date: Option<String>,
}

impl CommitEntry {
    pub fn committed_at(&self) -> Option<&str> {
        self.commit.committer.as_ref()?.date.as_deref()
    }
}
