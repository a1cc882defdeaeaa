use crate::config::PolicyConfig;
use std::collections::BTreeSet;

/// Allow/deny prefix rules constraining crawl expansion
///
/// A URL is allowed iff it starts with some white-list prefix and with no
/// black-list prefix. An empty white list therefore allows nothing; the
/// absence of a policy altogether (see [`UrlPolicy::permits`]) allows
/// everything.
///
/// # Examples
///
/// ```
/// use sumi_harvest::url::UrlPolicy;
///
/// let policy = UrlPolicy::new(
///     ["https://docs.example.com/"],
///     ["https://docs.example.com/archive/"],
/// );
///
/// assert!(policy.is_allowed("https://docs.example.com/guide"));
/// assert!(!policy.is_allowed("https://docs.example.com/archive/2019"));
/// assert!(!policy.is_allowed("https://blog.example.com/"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlPolicy {
    white_list: BTreeSet<String>,
    black_list: BTreeSet<String>,
}

impl UrlPolicy {
    pub fn new<W, B>(white_list: W, black_list: B) -> Self
    where
        W: IntoIterator,
        W::Item: Into<String>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        Self {
            white_list: white_list.into_iter().map(Into::into).collect(),
            black_list: black_list.into_iter().map(Into::into).collect(),
        }
    }

    pub fn white_list(&self) -> impl Iterator<Item = &str> {
        self.white_list.iter().map(String::as_str)
    }

    pub fn black_list(&self) -> impl Iterator<Item = &str> {
        self.black_list.iter().map(String::as_str)
    }

    /// Checks a URL against the prefix lists
    pub fn is_allowed(&self, url: &str) -> bool {
        if !self.white_list.iter().any(|prefix| url.starts_with(prefix.as_str())) {
            return false;
        }

        !self.black_list.iter().any(|prefix| url.starts_with(prefix.as_str()))
    }

    /// Applies an optional policy; `None` allows every URL
    pub fn permits(policy: Option<&UrlPolicy>, url: &str) -> bool {
        policy.map_or(true, |p| p.is_allowed(url))
    }
}

impl From<&PolicyConfig> for UrlPolicy {
    fn from(config: &PolicyConfig) -> Self {
        Self::new(config.white_list.iter().cloned(), config.black_list.iter().cloned())
    }
}
