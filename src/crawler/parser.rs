//! HTML parser for extracting links and the page title
//!
//! This module handles parsing HTML content to extract:
//! - Links to follow (from `<a href>` tags)
//! - Page title

use crate::url::is_http_scheme;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// Distinct links found on the page (absolute URLs, document order)
    pub links: Vec<String>,
}

/// Parses HTML content and extracts links and metadata
///
/// # Link Extraction Rules
///
/// - Every `<a href="...">` is resolved against `base_url`
/// - Only `http` and `https` results are kept, which drops
///   `javascript:`, `mailto:`, `tel:` and data URIs
/// - Fragment-only hrefs (`#section`) point back at the page itself and are skipped
/// - Duplicates are removed, first occurrence wins
///
/// # Example
///
/// ```
/// use sumi_harvest::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document, base_url),
    }
}

/// Extracts the page title from the HTML document
pub(crate) fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts all followable links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        if let Some(absolute_url) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, base_url))
        {
            if seen.insert(absolute_url.clone()) {
                links.push(absolute_url);
            }
        }
    }

    links
}

/// Resolves a link href to an absolute HTTP(S) URL
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    is_http_scheme(absolute_url.scheme()).then(|| absolute_url.to_string())
}

/// Convenience function for extracting just the links from HTML
pub fn extract_links_simple(html: &str, base_url: &Url) -> Vec<String> {
    parse_html(html, base_url).links
}
