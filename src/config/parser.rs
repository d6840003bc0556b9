use crate::config::types::Config;
use crate::config::validation::validate;
use crate::{ConfigError, ConfigResult};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable holding the crawl provider API key
pub const FIRECRAWL_API_KEY_ENV: &str = "FIRECRAWL_API_KEY";

/// Environment variable holding the place search API key
pub const GOOGLE_PLACES_API_KEY_ENV: &str = "GOOGLE_PLACES_API_KEY";

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Recorded with every discovery run so stored results can be traced back to
/// the settings that produced them.
pub fn compute_config_hash(path: &Path) -> ConfigResult<String> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> ConfigResult<(Config, String)> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Resolves an API key from the config value or an environment variable
///
/// A key present in the config wins; blank values count as missing.
pub fn resolve_api_key(
    configured: Option<&str>,
    service: &'static str,
    env_var: &'static str,
) -> ConfigResult<String> {
    if let Some(key) = configured.map(str::trim).filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }

    std::env::var(env_var)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .ok_or(ConfigError::MissingApiKey { service, env_var })
}
