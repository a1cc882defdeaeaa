//! State module for tracking web crawl progress
//!
//! `NodeState` tracks each scheduled URL through
//! `Pending -> Fetched -> Expanded | DepthLimit`, or `Pending -> FetchFailed`.

mod node_state;

pub use node_state::NodeState;
