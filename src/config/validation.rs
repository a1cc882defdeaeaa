use crate::config::types::{Config, FetcherConfig, RepositoryConfig, UserAgentConfig, WebConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.web.is_none() && config.repository.is_none() {
        return Err(ConfigError::Validation(
            "at least one of [web] or [repository] must be configured".to_string(),
        ));
    }

    validate_user_agent_config(&config.user_agent)?;
    validate_fetcher_config(&config.fetcher)?;

    if let Some(web) = &config.web {
        validate_web_config(web)?;
    }

    if let Some(repository) = &config.repository {
        validate_repository_config(repository)?;
    }

    if config.output.records_path.is_empty() {
        return Err(ConfigError::Validation(
            "records_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    if !config.contact_email.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            config.contact_email
        )));
    }

    Ok(())
}

fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.web_timeout_secs == 0 || config.api_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeouts must be at least one second".to_string(),
        ));
    }

    Ok(())
}

/// Validates the web crawl section
fn validate_web_config(config: &WebConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.entry_url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid entry URL '{}': {}", config.entry_url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Entry URL '{}' must use HTTP or HTTPS",
            config.entry_url
        )));
    }

    if config.workers < 1 || config.workers > 256 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 256, got {}",
            config.workers
        )));
    }

    if config.extract_concurrency < 1 {
        return Err(ConfigError::Validation(
            "extract_concurrency must be >= 1".to_string(),
        ));
    }

    if let Some(policy) = &config.policy {
        if policy.white_list.iter().any(|p| p.is_empty())
            || policy.black_list.iter().any(|p| p.is_empty())
        {
            return Err(ConfigError::Validation(
                "policy prefixes cannot be empty strings".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates the repository crawl section
fn validate_repository_config(config: &RepositoryConfig) -> Result<(), ConfigError> {
    if config.organization.trim().is_empty() {
        return Err(ConfigError::Validation(
            "organization cannot be empty".to_string(),
        ));
    }

    if config.token_env.is_empty() {
        return Err(ConfigError::Validation(
            "token_env cannot be empty".to_string(),
        ));
    }

    Url::parse(&config.api_base)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid api_base: {}", e)))?;

    if config.per_page < 1 || config.per_page > 100 {
        return Err(ConfigError::Validation(format!(
            "per_page must be between 1 and 100, got {}",
            config.per_page
        )));
    }

    if config.concurrency < 1 {
        return Err(ConfigError::Validation(
            "concurrency must be >= 1".to_string(),
        ));
    }

    if config.repo_limit == Some(0) {
        return Err(ConfigError::Validation(
            "repo_limit must be >= 1 when set".to_string(),
        ));
    }

    if config.file_suffixes.is_empty() {
        return Err(ConfigError::Validation(
            "file_suffixes must list at least one suffix".to_string(),
        ));
    }

    Ok(())
}
