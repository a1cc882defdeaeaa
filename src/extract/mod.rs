//! Record extraction from crawled pages
//!
//! - `content`: headline-grouped text sections
//! - `date`: latest-date heuristic over the page text

mod content;
mod date;

pub use content::{extract_records, page_text, split_sections, Section};
pub use date::{
    extract_date, find_date_candidates, latest_date, parse_date, DATE_FORMATS, DATE_PATTERNS,
};

use crate::fetch::Fetcher;
use crate::record::Record;

/// Fetches a page and splits it into records
///
/// Returns `None` when the page cannot be fetched; the failure is logged and
/// the caller moves on to the next URL.
pub async fn fetch_and_extract(fetcher: &Fetcher, url: &str) -> Option<Vec<Record>> {
    let body = fetcher.fetch_text(url).await?;
    let records = extract_records(&body, url);
    tracing::debug!(url, records = records.len(), "Extracted records");
    Some(records)
}
