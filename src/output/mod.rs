//! Output module for handing extracted records to downstream indexing
//!
//! This module handles:
//! - Writing the record list as pretty-printed JSON
//! - Summarizing a run's crawl and extraction statistics

pub mod stats;

pub use stats::{print_statistics, CrawlStatistics};

use crate::record::Record;
use crate::HarvestError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes records to `path` as a pretty-printed JSON array
///
/// Parent directories are created when missing; an existing file is replaced.
///
/// # Errors
///
/// Returns [`HarvestError::Io`] or [`HarvestError::Json`] on failure.
pub fn write_records(records: &[Record], path: &Path) -> Result<(), HarvestError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::info!(
        records = records.len(),
        path = %path.display(),
        "Wrote records"
    );
    Ok(())
}

/// Reads records previously written by [`write_records`]
pub fn read_records(path: &Path) -> Result<Vec<Record>, HarvestError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
