//! Headline-grouped content extraction from HTML pages

use crate::crawler::extract_title;
use crate::extract::date::extract_date;
use crate::record::{Record, RecordMetadata, UNKNOWN};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

/// Elements considered when grouping content, matched in document order
const CONTENT_SELECTOR: &str = "h1, h2, h3, h4, h5, h6, p, ul, ol";

/// Elements whose text never counts as page text
const HIDDEN_ELEMENTS: [&str; 3] = ["script", "style", "noscript"];

/// One headline with the text gathered under it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub headline: String,
    pub content: String,
}

/// Splits an HTML page into one record per distinct headline
///
/// Every record shares the page's title (or `"Unknown"`) and the latest date
/// found anywhere in the page text.
///
/// # Example
///
/// ```
/// use sumi_harvest::extract_records;
///
/// let html = "<h2>A</h2><p>x</p><h2>B</h2><p>y</p><p>z</p>";
/// let records = extract_records(html, "https://example.com/");
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[1].metadata().headline(), "B");
/// assert_eq!(records[1].content(), "y z");
/// ```
pub fn extract_records(html: &str, url: &str) -> Vec<Record> {
    let document = Html::parse_document(html);

    let title = extract_title(&document).unwrap_or_else(|| UNKNOWN.to_string());
    let date = extract_date(&page_text(&document));

    split_sections(&document)
        .into_iter()
        .map(|section| {
            Record::new(
                section.content,
                RecordMetadata::new(url, title.as_str(), section.headline, date.as_str()),
            )
        })
        .collect()
}

/// Groups paragraph and list text under the closest preceding headline
///
/// - Headline text has its whitespace collapsed
/// - Text before the first headline, or under an empty headline, is dropped
/// - A headline seen twice keeps its first position and accumulates content
/// - Nested matches (a `<p>` inside a `<ul>`) contribute their text once per match
pub fn split_sections(document: &Html) -> Vec<Section> {
    let Ok(selector) = Selector::parse(CONTENT_SELECTOR) else {
        return Vec::new();
    };

    let mut sections: Vec<(String, Vec<String>)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut current: Option<usize> = None;

    for element in document.select(&selector) {
        let text = collapsed_text(element);

        if is_headline(element.value().name()) {
            current = if text.is_empty() {
                None
            } else {
                Some(*positions.entry(text.clone()).or_insert_with(|| {
                    sections.push((text, Vec::new()));
                    sections.len() - 1
                }))
            };
            continue;
        }

        if let Some(index) = current {
            if !text.is_empty() {
                sections[index].1.push(text);
            }
        }
    }

    sections
        .into_iter()
        .map(|(headline, parts)| Section {
            headline,
            content: parts.join(" "),
        })
        .collect()
}

/// Visible text of the whole document, one space between text nodes
pub fn page_text(document: &Html) -> String {
    document
        .root_element()
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node
                .parent()
                .and_then(|parent| parent.value().as_element().map(|e| e.name()))
                .is_some_and(|name| HIDDEN_ELEMENTS.contains(&name));
            (!hidden).then(|| text.trim())
        })
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_headline(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

fn collapsed_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
