//! Crawl provider trait and the records it exchanges
//!
//! The pipeline only talks to the crawl/extraction provider through
//! `CrawlProvider`, so tests can drive it with scripted implementations.

use crate::state::CrawlStatus;
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Options for a site map request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapOptions {
    pub include_subdomains: bool,
    pub limit: u32,
}

/// Result of a site map request
///
/// `success == false` means the provider answered but could not map the site;
/// transport failures surface as errors instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapResult {
    pub success: bool,
    pub links: Vec<String>,
    pub error: Option<String>,
}

impl MapResult {
    pub fn success(links: Vec<String>) -> Self {
        Self {
            success: true,
            links,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            links: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Options for a fallback crawl job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlOptions {
    pub limit: u32,
}

/// One status poll of a crawl job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlStatusReport {
    pub status: CrawlStatus,
    pub links: Vec<String>,
}

/// Trait for crawl/extraction provider implementations
///
/// Implementations must be safe to share between concurrently running
/// business pipelines.
#[async_trait]
pub trait CrawlProvider: Send + Sync {
    /// Requests the flat list of known URLs for a website
    async fn map(&self, url: &str, options: MapOptions) -> Result<MapResult>;

    /// Submits an asynchronous crawl job and returns its id
    async fn submit_crawl(&self, url: &str, options: CrawlOptions) -> Result<String>;

    /// Reports the current status of a crawl job
    async fn crawl_status(&self, job_id: &str) -> Result<CrawlStatusReport>;

    /// Runs a schema- and prompt-guided extraction of one page
    ///
    /// Returns the raw extraction payload; validating it against the schema
    /// is the caller's job.
    async fn extract(&self, url: &str, schema: &Value, prompt: &str) -> Result<Value>;
}
