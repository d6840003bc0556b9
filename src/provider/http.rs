//! Shared HTTP plumbing for the provider clients
//!
//! This module handles:
//! - Building the HTTP client with the configured user agent and timeouts
//! - Classifying transport failures and non-success responses
//! - Decoding JSON bodies into typed records

use crate::config::UserAgentConfig;
use crate::ScoutError;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Longest response body excerpt carried in an error message
const MAX_ERROR_BODY: usize = 200;

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use competitor_scout::config::UserAgentConfig;
/// use competitor_scout::provider::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "CompetitorScout".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_email: "admin@example.com".to_string(),
///     timeout_secs: 60,
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Formats the user agent: `Name/Version (+mailto:ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+mailto:{})",
        config.crawler_name, config.crawler_version, config.contact_email
    )
}

/// Turns a reqwest send result into a decoded JSON body
///
/// | Condition | Error |
/// |-----------|-------|
/// | Timeout / connection failure | `ExternalService` |
/// | HTTP 429 | `RateLimited` |
/// | Other non-2xx status | `ExternalService` |
/// | Body is not the expected JSON | `Parse` |
pub(crate) async fn read_json<R: DeserializeOwned>(
    service: &str,
    sent: Result<Response, reqwest::Error>,
) -> crate::Result<R> {
    let response = sent.map_err(|e| transport_error(service, &e))?;
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ScoutError::rate_limited(service));
    }

    let body = response
        .text()
        .await
        .map_err(|e| transport_error(service, &e))?;

    if !status.is_success() {
        return Err(ScoutError::external(
            service,
            format!("HTTP {}: {}", status.as_u16(), excerpt(&body)),
        ));
    }

    serde_json::from_str(&body)
        .map_err(|e| ScoutError::Parse(format!("Unexpected {} response: {}", service, e)))
}

/// Classifies a transport-level failure
pub(crate) fn transport_error(service: &str, err: &reqwest::Error) -> ScoutError {
    if err.is_timeout() {
        ScoutError::external(service, "Request timeout")
    } else if err.is_connect() {
        ScoutError::external(service, "Connection refused")
    } else {
        ScoutError::external(service, err.to_string())
    }
}

fn excerpt(body: &str) -> &str {
    let trimmed = body.trim();
    if trimmed.len() <= MAX_ERROR_BODY {
        return trimmed;
    }

    let mut end = MAX_ERROR_BODY;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    &trimmed[..end]
}
