use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sumi-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    pub web: Option<WebConfig>,
    pub repository: Option<RepositoryConfig>,
    pub output: OutputConfig,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Formats the user agent as `Name/Version (+ContactURL; ContactEmail)`
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "SumiHarvest".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/sumi-harvest".to_string(),
            contact_email: "crawler@example.com".to_string(),
        }
    }
}

/// Transport timeouts and transient-failure retry settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Timeout for a single web page GET (seconds)
    #[serde(rename = "web-timeout-secs")]
    pub web_timeout_secs: u64,

    /// Timeout for a single hosting API call (seconds)
    #[serde(rename = "api-timeout-secs")]
    pub api_timeout_secs: u64,

    /// Attempts per request before giving up on transport failures
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Base of the exponential backoff; retry `n` waits `base * 2^n`
    #[serde(rename = "backoff-base-ms")]
    pub backoff_base_ms: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            web_timeout_secs: 15,
            api_timeout_secs: 10,
            max_attempts: 3,
            backoff_base_ms: 1000,
        }
    }
}

impl FetcherConfig {
    pub fn web_timeout(&self) -> Duration {
        Duration::from_secs(self.web_timeout_secs)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.backoff_base_ms)
    }
}

/// Web crawl configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    /// Page the crawl starts from (depth 0)
    #[serde(rename = "entry-url")]
    pub entry_url: String,

    /// Maximum depth; pages at this depth are fetched but not expanded
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Number of pages fetched concurrently
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Number of pages downloaded concurrently during content extraction
    #[serde(rename = "extract-concurrency", default = "default_concurrency")]
    pub extract_concurrency: usize,

    /// Optional allow/deny prefix lists
    pub policy: Option<PolicyConfig>,
}

/// Allow/deny URL prefix lists
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyConfig {
    #[serde(rename = "white-list", default)]
    pub white_list: Vec<String>,

    #[serde(rename = "black-list", default)]
    pub black_list: Vec<String>,
}

/// Code-hosting organization crawl configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryConfig {
    /// Organization whose repositories are scanned
    pub organization: String,

    /// Environment variable holding the API token
    #[serde(rename = "token-env", default = "default_token_env")]
    pub token_env: String,

    /// Optional cap on the number of repositories
    #[serde(rename = "repo-limit")]
    pub repo_limit: Option<usize>,

    /// Base URL of the hosting API
    #[serde(rename = "api-base", default = "default_api_base")]
    pub api_base: String,

    /// Page size for repository listing (1..=100)
    #[serde(rename = "per-page", default = "default_per_page")]
    pub per_page: usize,

    /// Number of files materialized concurrently
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Sleep applied when throttled without an explicit reset time (seconds)
    #[serde(rename = "abuse-cooldown-secs", default = "default_abuse_cooldown")]
    pub abuse_cooldown_secs: u64,

    /// File name suffixes collected by the tree walk
    #[serde(rename = "file-suffixes", default = "default_file_suffixes")]
    pub file_suffixes: Vec<String>,

    /// Directory names never descended into
    #[serde(rename = "excluded-dirs", default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,
}

impl RepositoryConfig {
    /// Builds a configuration with defaults for everything but the organization
    pub fn for_organization(organization: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            token_env: default_token_env(),
            repo_limit: None,
            api_base: default_api_base(),
            per_page: default_per_page(),
            concurrency: default_concurrency(),
            abuse_cooldown_secs: default_abuse_cooldown(),
            file_suffixes: default_file_suffixes(),
            excluded_dirs: default_excluded_dirs(),
        }
    }

    pub fn abuse_cooldown(&self) -> Duration {
        Duration::from_secs(self.abuse_cooldown_secs)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the JSON file receiving the extracted records
    #[serde(rename = "records-path")]
    pub records_path: String,
}

fn default_workers() -> usize {
    16
}

fn default_concurrency() -> usize {
    8
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_per_page() -> usize {
    100
}

fn default_abuse_cooldown() -> u64 {
    60
}

fn default_file_suffixes() -> Vec<String> {
    vec![".md".to_string()]
}

fn default_excluded_dirs() -> Vec<String> {
    vec![".github".to_string()]
}
