//! Competitor-Scout: local competitor catalog discovery
//!
//! This crate finds the rental businesses operating in a location, works out
//! which pages of each business website carry its product catalog, extracts
//! structured product records from those pages, and aggregates everything into
//! a per-location report.

pub mod config;
pub mod crawler;
pub mod model;
pub mod output;
pub mod places;
pub mod provider;
pub mod ratelimit;
pub mod state;
pub mod storage;
pub mod url;

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Main error type for Competitor-Scout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limited by {service}")]
    RateLimited { service: String },

    #[error("External service error from {service}: {message}")]
    ExternalService { service: String, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScoutError {
    /// Builds an `ExternalService` error for the named collaborator
    pub fn external(service: &str, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.to_string(),
            message: message.into(),
        }
    }

    /// Builds a `RateLimited` error for the named collaborator
    pub fn rate_limited(service: &str) -> Self {
        Self::RateLimited {
            service: service.to_string(),
        }
    }

    /// Returns the coarse classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::ExternalService { .. } => ErrorKind::ExternalService,
            Self::Parse(_) => ErrorKind::Parse,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Config(_) | Self::Storage(_) | Self::Url(_) | Self::Io(_) => ErrorKind::Internal,
        }
    }

    /// Returns true if retrying the failed operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::RateLimited | ErrorKind::ExternalService
        )
    }
}

/// Coarse error classification, recorded with per-business failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    RateLimited,
    ExternalService,
    Parse,
    NotFound,
    Cancelled,
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Validation => "validation",
            Self::RateLimited => "rate_limited",
            Self::ExternalService => "external_service",
            Self::Parse => "parse",
            Self::NotFound => "not_found",
            Self::Cancelled => "cancelled",
            Self::Internal => "internal",
        };
        write!(f, "{}", s)
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing API key for {service}: set it in the config or via {env_var}")]
    MissingApiKey {
        service: &'static str,
        env_var: &'static str,
    },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Competitor-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CompetitorOrchestrator, DiscoveryOutcome};
pub use model::{Competitor, Place, Product, ProductCategory, SearchResult};
pub use ratelimit::RateLimiter;
pub use crate::url::{filter_relevant_urls, normalize_website};
