//! Firecrawl v1 REST client
//!
//! Endpoints used:
//! - `POST /v1/map` for the site map request
//! - `POST /v1/crawl` and `GET /v1/crawl/{id}` for the fallback crawl
//! - `POST /v1/scrape` with the `extract` format for product extraction

use super::http::read_json;
use super::traits::{CrawlOptions, CrawlProvider, CrawlStatusReport, MapOptions, MapResult};
use crate::config::{resolve_api_key, ProviderConfig, FIRECRAWL_API_KEY_ENV};
use crate::state::CrawlStatus;
use crate::{ConfigResult, ScoutError};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Service name used in errors and logs
pub const SERVICE: &str = "firecrawl";

/// HTTP client for the Firecrawl API
#[derive(Debug, Clone)]
pub struct FirecrawlClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FirecrawlClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Creates a client from configuration, resolving the API key from the
    /// environment when the config leaves it unset
    pub fn from_config(config: &ProviderConfig, client: Client) -> ConfigResult<Self> {
        let api_key = resolve_api_key(
            config.api_key.as_deref(),
            "Firecrawl",
            FIRECRAWL_API_KEY_ENV,
        )?;
        Ok(Self::new(client, config.base_url.clone(), api_key))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn post<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> crate::Result<R> {
        let sent = self
            .client
            .post(self.endpoint(path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await;
        read_json(SERVICE, sent).await
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MapRequest<'a> {
    url: &'a str,
    include_subdomains: bool,
    limit: u32,
}

#[derive(Debug, Deserialize)]
struct MapResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    links: Vec<MapLink>,
    error: Option<String>,
}

/// Map links are plain strings in v1 and `{url, title}` objects in later
/// API versions
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MapLink {
    Url(String),
    Entry { url: String },
}

impl MapLink {
    fn into_url(self) -> String {
        match self {
            Self::Url(url) | Self::Entry { url } => url,
        }
    }
}

#[derive(Debug, Serialize)]
struct CrawlRequest<'a> {
    url: &'a str,
    limit: u32,
}

#[derive(Debug, Deserialize)]
struct CrawlSubmitResponse {
    #[serde(default)]
    success: bool,
    id: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CrawlStatusResponse {
    status: String,
    #[serde(default)]
    data: Vec<CrawlDocument>,
}

#[derive(Debug, Deserialize)]
struct CrawlDocument {
    #[serde(default)]
    metadata: Option<DocumentMetadata>,
}

#[derive(Debug, Deserialize)]
struct DocumentMetadata {
    #[serde(rename = "sourceURL")]
    source_url: Option<String>,
    url: Option<String>,
}

impl CrawlDocument {
    fn into_link(self) -> Option<String> {
        let metadata = self.metadata?;
        metadata.source_url.or(metadata.url)
    }
}

#[derive(Debug, Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: [&'static str; 1],
    extract: ExtractSpec<'a>,
}

#[derive(Debug, Serialize)]
struct ExtractSpec<'a> {
    schema: &'a Value,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    success: bool,
    data: Option<ScrapeData>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScrapeData {
    extract: Option<Value>,
}

#[async_trait]
impl CrawlProvider for FirecrawlClient {
    async fn map(&self, url: &str, options: MapOptions) -> crate::Result<MapResult> {
        let request = MapRequest {
            url,
            include_subdomains: options.include_subdomains,
            limit: options.limit,
        };
        let response: MapResponse = self.post("map", &request).await?;

        if !response.success {
            return Ok(MapResult::failure(
                response
                    .error
                    .unwrap_or_else(|| "map request was not successful".to_string()),
            ));
        }

        Ok(MapResult::success(
            response.links.into_iter().map(MapLink::into_url).collect(),
        ))
    }

    async fn submit_crawl(&self, url: &str, options: CrawlOptions) -> crate::Result<String> {
        let request = CrawlRequest {
            url,
            limit: options.limit,
        };
        let response: CrawlSubmitResponse = self.post("crawl", &request).await?;

        match response.id {
            Some(id) if response.success && !id.is_empty() => Ok(id),
            _ => Err(ScoutError::external(
                SERVICE,
                format!(
                    "crawl submission rejected: {}",
                    response.error.as_deref().unwrap_or("no job id returned")
                ),
            )),
        }
    }

    async fn crawl_status(&self, job_id: &str) -> crate::Result<CrawlStatusReport> {
        let sent = self
            .client
            .get(self.endpoint(&format!("crawl/{}", job_id)))
            .bearer_auth(&self.api_key)
            .send()
            .await;
        let response: CrawlStatusResponse = read_json(SERVICE, sent).await?;

        let status = CrawlStatus::from_provider(&response.status).ok_or_else(|| {
            ScoutError::Parse(format!("Unknown crawl status '{}'", response.status))
        })?;

        Ok(CrawlStatusReport {
            status,
            links: response
                .data
                .into_iter()
                .filter_map(CrawlDocument::into_link)
                .collect(),
        })
    }

    async fn extract(&self, url: &str, schema: &Value, prompt: &str) -> crate::Result<Value> {
        let request = ScrapeRequest {
            url,
            formats: ["extract"],
            extract: ExtractSpec { schema, prompt },
        };
        let response: ScrapeResponse = self.post("scrape", &request).await?;

        if !response.success {
            return Err(ScoutError::external(
                SERVICE,
                format!(
                    "scrape failed for {}: {}",
                    url,
                    response.error.as_deref().unwrap_or("unknown error")
                ),
            ));
        }

        response
            .data
            .and_then(|data| data.extract)
            .ok_or_else(|| ScoutError::Parse(format!("Scrape of {} returned no extract", url)))
    }
}
