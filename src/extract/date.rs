//! Heuristic publication-date extraction from free text
//!
//! Two phases: every pattern in [`DATE_PATTERNS`] is run over the text and all
//! matches are collected; each match is then parsed with the formats in
//! [`DATE_FORMATS`], first successful format wins, and the latest parsed date
//! is returned as `YYYY-MM-DD`.
//!
//! Both lists overlap on purpose and their order is significant. A numeric
//! string like `03-04-2024` fits both month-first and day-first shapes; the
//! month-first format comes earlier, so it is read as 4 March. Day-first is
//! only reached when month-first cannot parse (e.g. `20-09-2024`).

use crate::record::UNKNOWN;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

/// Regular expressions locating date-like substrings, in match order
pub const DATE_PATTERNS: [&str; 20] = [
    r"\b\d{4}-\d{2}-\d{2}\b",                          // 2024-09-20
    r"\b\d{4}/\d{2}/\d{2}\b",                          // 2024/09/20
    r"\b\d{2}-\d{2}-\d{4}\b",                          // 09-20-2024
    r"\b\d{2}/\d{2}/\d{4}\b",                          // 09/20/2024
    r"\b\d{2}-\d{2}-\d{4}\b",                          // 20-09-2024
    r"\b\d{2}/\d{2}/\d{4}\b",                          // 20/09/2024
    r"\b\d{1,2}\s+[A-Za-z]+\s+\d{4}\b",                // 20 September 2024
    r"\b[A-Za-z]+\s+\d{1,2},\s+\d{4}\b",               // September 20, 2024
    r"\b\d{1,2}\s+[A-Za-z]{3}\s+\d{4}\b",              // 20 Sep 2024
    r"\b[A-Za-z]{3}\s+\d{1,2},\s+\d{4}\b",             // Sep 20, 2024
    r"\b\d{1,2}-[A-Za-z]{3}-\d{4}\b",                  // 20-Sep-2024
    r"\b[A-Za-z]{3}-\d{1,2}-\d{4}\b",                  // Sep-20-2024
    r"\b[A-Za-z]+,\s+\d{1,2}\s+[A-Za-z]+\s+\d{4}\b",   // Friday, 20 September 2024
    r"\b[A-Za-z]+,\s+[A-Za-z]+\s+\d{1,2},\s+\d{4}\b",  // Friday, September 20, 2024
    r"\b\d{4}\.\d{2}\.\d{2}\b",                        // 2024.09.20
    r"\b\d{2}\.\d{2}\.\d{4}\b",                        // 20.09.2024
    r"\b\d{4}\s+[A-Za-z]{3}\s+\d{1,2}\b",              // 2024 Sep 20
    r"\b\d{4}\s+[A-Za-z]+\s+\d{1,2}\b",                // 2024 September 20
    r"\b\d{1,2}\s+[A-Za-z]+,\s+\d{4}\b",               // 20 September, 2024
    r"\b[A-Za-z]+\s+\d{1,2}\s+\d{4}\b",                // September 20 2024
];

/// `chrono` formats tried against each candidate, in order
pub const DATE_FORMATS: [&str; 20] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%d %B %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%d-%b-%Y",
    "%b-%d-%Y",
    "%A, %d %B %Y",
    "%A, %B %d, %Y",
    "%Y.%m.%d",
    "%d.%m.%Y",
    "%Y %b %d",
    "%Y %B %d",
    "%d %B, %Y",
    "%B %d %Y",
];

fn compiled_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        DATE_PATTERNS
            .iter()
            .filter_map(|pattern| Regex::new(pattern).ok())
            .collect()
    })
}

/// Collects every substring matched by any date pattern
///
/// Matches are returned pattern by pattern, so one date may appear several times.
pub fn find_date_candidates(text: &str) -> Vec<&str> {
    compiled_patterns()
        .iter()
        .flat_map(|regex| regex.find_iter(text).map(|m| m.as_str()))
        .collect()
}

/// Parses a candidate with the first format that accepts it
pub fn parse_date(candidate: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(candidate, format).ok())
}

/// Returns the most recent parseable date among the candidates
pub fn latest_date<'a>(candidates: impl IntoIterator<Item = &'a str>) -> Option<NaiveDate> {
    candidates.into_iter().filter_map(parse_date).max()
}

/// Extracts the latest date mentioned in `text` as `YYYY-MM-DD`
///
/// Returns `"Unknown"` when nothing parses.
///
/// # Examples
///
/// ```
/// use sumi_harvest::extract_date;
///
/// assert_eq!(extract_date("Posted 2023-01-05, edited March 3, 2024"), "2024-03-03");
/// assert_eq!(extract_date("no dates here"), "Unknown");
/// ```
pub fn extract_date(text: &str) -> String {
    match latest_date(find_date_candidates(text)) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => UNKNOWN.to_string(),
    }
}
