use crate::config::types::{CrawlConfig, Selectors};
use crate::url::normalize_url;
use crate::ConfigError;

/// Upper bound on concurrently running page tasks
const MAX_THREADS: usize = 1000;

/// Validates the entire configuration
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_limits(config)?;
    validate_selectors(&config.selectors)?;
    validate_seeds(&config.urls)?;
    Ok(())
}

/// Validates numeric limits
fn validate_limits(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.threads < 1 || config.threads > MAX_THREADS {
        return Err(ConfigError::Validation(format!(
            "threads must be between 1 and {}, got {}",
            MAX_THREADS, config.threads
        )));
    }

    if config.timeout == 0 {
        return Err(ConfigError::Validation(
            "timeout must be a positive number of seconds".to_string(),
        ));
    }

    if config.max_depth < 1 {
        return Err(ConfigError::Validation(format!(
            "max-depth cannot be less than 1, got {}",
            config.max_depth
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates selector lists
fn validate_selectors(selectors: &Selectors) -> Result<(), ConfigError> {
    for domain in selectors.domains.iter().chain(&selectors.exclude_domains) {
        validate_domain_suffix(domain)?;
    }

    for name in &selectors.collections {
        if name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "collection type cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates seed URLs
pub(crate) fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    for seed in seeds {
        normalize_url(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;
    }
    Ok(())
}

/// Validates a host suffix used for allow/deny matching
fn validate_domain_suffix(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if domain
        .chars()
        .any(|c| c.is_whitespace() || c == '/' || c == ':')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must be a bare host suffix",
            domain
        )));
    }

    Ok(())
}
