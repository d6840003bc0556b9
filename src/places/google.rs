//! Google Places web service client

use super::PlaceSearch;
use crate::config::{resolve_api_key, PlacesConfig, GOOGLE_PLACES_API_KEY_ENV};
use crate::model::{Place, PlaceDetails};
use crate::provider::read_json;
use crate::{ConfigResult, ScoutError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// Service name used in errors and logs
pub const SERVICE: &str = "places";

/// HTTP client for the Google Places text search and details endpoints
#[derive(Debug, Clone)]
pub struct GooglePlacesClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GooglePlacesClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Creates a client from configuration, resolving the API key from the
    /// environment when the config leaves it unset
    pub fn from_config(config: &PlacesConfig, client: Client) -> ConfigResult<Self> {
        let api_key = resolve_api_key(
            config.api_key.as_deref(),
            "Google Places",
            GOOGLE_PLACES_API_KEY_ENV,
        )?;
        Ok(Self::new(client, config.base_url.clone(), api_key))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<PlaceResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    #[serde(default)]
    place_id: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    result: Option<DetailsResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResult {
    website: Option<String>,
}

/// Fails unless the API status is `OK` or `ZERO_RESULTS`
fn check_status(status: &str, error_message: Option<&str>) -> crate::Result<()> {
    match status {
        "OK" | "ZERO_RESULTS" => Ok(()),
        other => Err(ScoutError::external(
            SERVICE,
            match error_message {
                Some(message) => format!("{}: {}", other, message),
                None => other.to_string(),
            },
        )),
    }
}

#[async_trait]
impl PlaceSearch for GooglePlacesClient {
    async fn text_search(&self, query: &str) -> crate::Result<Vec<Place>> {
        let sent = self
            .client
            .get(self.endpoint("textsearch/json"))
            .query(&[("query", query), ("key", self.api_key.as_str())])
            .send()
            .await;
        let response: TextSearchResponse = read_json(SERVICE, sent).await?;
        check_status(&response.status, response.error_message.as_deref())?;

        Ok(response
            .results
            .into_iter()
            .filter(|r| !r.place_id.is_empty())
            .map(|r| Place::new(r.place_id, r.name))
            .collect())
    }

    async fn details(&self, place_id: &str) -> crate::Result<PlaceDetails> {
        let sent = self
            .client
            .get(self.endpoint("details/json"))
            .query(&[
                ("place_id", place_id),
                ("fields", "website"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await;
        let response: DetailsResponse = read_json(SERVICE, sent).await?;
        check_status(&response.status, response.error_message.as_deref())?;

        Ok(PlaceDetails {
            website: response
                .result
                .and_then(|r| r.website)
                .filter(|w| !w.trim().is_empty()),
        })
    }
}
