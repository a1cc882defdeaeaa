//! Node state definitions for tracking web crawl progress
//!
//! Every scheduled URL moves through this state machine exactly once per crawl.

use crate::HarvestError;
use std::fmt;

/// Represents the current state of a scheduled URL in the web crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeState {
    // ===== Active States =====
    /// Scheduled at some depth, not yet fetched
    Pending,

    /// Page body retrieved, links not yet processed
    Fetched,

    // ===== Terminal States =====
    /// Links processed and unvisited, allowed children scheduled
    Expanded,

    /// Page sits at the maximum depth; links discovered but not followed
    DepthLimit,

    /// Page could not be fetched (HTTP error or exhausted retries)
    FetchFailed,
}

impl NodeState {
    /// Returns true if no further processing happens for this node
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Fetched)
    }

    /// Returns true if the page body was retrieved
    pub fn was_fetched(&self) -> bool {
        matches!(self, Self::Fetched | Self::Expanded | Self::DepthLimit)
    }

    /// Returns true if the transition from `self` to `next` is legal
    pub fn can_transition_to(&self, next: NodeState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Fetched)
                | (Self::Pending, Self::FetchFailed)
                | (Self::Fetched, Self::Expanded)
                | (Self::Fetched, Self::DepthLimit)
        )
    }

    /// Performs a checked transition
    pub fn transition(self, next: NodeState) -> Result<NodeState, HarvestError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(HarvestError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Stable lowercase name used in logs and statistics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetched => "fetched",
            Self::Expanded => "expanded",
            Self::DepthLimit => "depth_limit",
            Self::FetchFailed => "fetch_failed",
        }
    }

    /// All states, in lifecycle order
    pub fn all() -> [NodeState; 5] {
        [
            Self::Pending,
            Self::Fetched,
            Self::Expanded,
            Self::DepthLimit,
            Self::FetchFailed,
        ]
    }
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
