//! URL handling module for Sumi-Harvest
//!
//! This module provides the allow/deny URL policy and HTTP(S) URL parsing.

mod policy;

use crate::UrlError;
use url::Url;

pub use policy::UrlPolicy;

/// Returns true for the schemes the web crawler follows
pub fn is_http_scheme(scheme: &str) -> bool {
    scheme == "http" || scheme == "https"
}

/// Parses an absolute HTTP(S) URL
///
/// # Examples
///
/// ```
/// use sumi_harvest::url::parse_http_url;
///
/// assert!(parse_http_url("https://example.com/page").is_ok());
/// assert!(parse_http_url("mailto:someone@example.com").is_err());
/// ```
pub fn parse_http_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if !is_http_scheme(url.scheme()) {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    Ok(url)
}
