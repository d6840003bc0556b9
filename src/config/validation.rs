use crate::config::types::{
    Config, DiscoveryConfig, OutputConfig, PlacesConfig, ProviderConfig, RateLimitConfig,
    UserAgentConfig,
};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_discovery_config(&config.discovery)?;
    validate_rate_limit_config(&config.rate_limit)?;
    validate_provider_config(&config.provider)?;
    validate_places_config(&config.places)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates discovery pipeline configuration
fn validate_discovery_config(config: &DiscoveryConfig) -> ConfigResult<()> {
    if !config.search_query.contains("{location}") {
        return Err(ConfigError::Validation(format!(
            "search_query must contain the {{location}} placeholder, got '{}'",
            config.search_query
        )));
    }

    if config.max_concurrent_businesses < 1 || config.max_concurrent_businesses > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_businesses must be between 1 and 100, got {}",
            config.max_concurrent_businesses
        )));
    }

    if config.map_limit < 1 {
        return Err(ConfigError::Validation(
            "map_limit must be >= 1".to_string(),
        ));
    }

    if config.crawl_limit < 1 {
        return Err(ConfigError::Validation(
            "crawl_limit must be >= 1".to_string(),
        ));
    }

    if config.crawl_max_polls < 1 {
        return Err(ConfigError::Validation(
            "crawl_max_polls must be >= 1".to_string(),
        ));
    }

    if config.max_pages_per_site < 1 {
        return Err(ConfigError::Validation(
            "max_pages_per_site must be >= 1".to_string(),
        ));
    }

    if config.relevant_keywords.is_empty() {
        return Err(ConfigError::Validation(
            "relevant_keywords cannot be empty".to_string(),
        ));
    }

    if let Some(blank) = config
        .relevant_keywords
        .iter()
        .find(|k| k.trim().is_empty())
    {
        return Err(ConfigError::Validation(format!(
            "relevant_keywords cannot contain blank entries, got '{}'",
            blank
        )));
    }

    Ok(())
}

/// Validates token bucket configuration
fn validate_rate_limit_config(config: &RateLimitConfig) -> ConfigResult<()> {
    if config.capacity < 1 {
        return Err(ConfigError::Validation(format!(
            "rate limit capacity must be >= 1, got {}",
            config.capacity
        )));
    }

    if config.refill_interval_ms < 1 {
        return Err(ConfigError::Validation(
            "refill_interval_ms must be >= 1ms".to_string(),
        ));
    }

    Ok(())
}

fn validate_provider_config(config: &ProviderConfig) -> ConfigResult<()> {
    validate_base_url("provider base_url", &config.base_url)?;

    if config.extract_prompt.trim().is_empty() {
        return Err(ConfigError::Validation(
            "extract_prompt cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_places_config(config: &PlacesConfig) -> ConfigResult<()> {
    validate_base_url("places base_url", &config.base_url)?;

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(
            "places max_retries must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
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

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if matches!(config.report_path.as_deref(), Some("")) {
        return Err(ConfigError::Validation(
            "report_path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates that a base URL is an absolute http(s) URL
fn validate_base_url(field: &str, value: &str) -> ConfigResult<()> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            field, value
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> ConfigResult<()> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    // Basic email format check: must contain @ and have text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
    }

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("provider", "https://api.firecrawl.dev").is_ok());
        assert!(validate_base_url("provider", "http://127.0.0.1:3002").is_ok());

        assert!(validate_base_url("provider", "not a url").is_err());
        assert!(validate_base_url("provider", "ftp://files.example.com").is_err());
    }

    #[test]
    fn test_discovery_requires_location_placeholder() {
        let config = DiscoveryConfig {
            search_query: "bounce houses".to_string(),
            ..DiscoveryConfig::default()
        };
        assert!(validate_discovery_config(&config).is_err());
    }

    #[test]
    fn test_discovery_rejects_blank_keyword() {
        let config = DiscoveryConfig {
            relevant_keywords: vec!["/rentals".to_string(), "  ".to_string()],
            ..DiscoveryConfig::default()
        };
        assert!(validate_discovery_config(&config).is_err());
    }

    #[test]
    fn test_rate_limit_rejects_zero_capacity() {
        let config = RateLimitConfig {
            capacity: 0,
            ..RateLimitConfig::default()
        };
        assert!(validate_rate_limit_config(&config).is_err());
        assert!(validate_rate_limit_config(&RateLimitConfig::default()).is_ok());
    }
}
