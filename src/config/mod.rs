//! Configuration module for Competitor-Scout
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and resolving provider API keys from the config or the environment.
//!
//! # Example
//!
//! ```no_run
//! use competitor_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scout.toml")).unwrap();
//! println!("Pool size: {}", config.discovery.max_concurrent_businesses);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, DiscoveryConfig, OutputConfig, PlacesConfig, ProviderConfig, RateLimitConfig,
    UserAgentConfig, DEFAULT_EXTRACT_PROMPT,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config, resolve_api_key,
    FIRECRAWL_API_KEY_ENV, GOOGLE_PLACES_API_KEY_ENV,
};
