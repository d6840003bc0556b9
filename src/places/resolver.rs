use super::PlaceSearch;
use crate::config::PlacesConfig;
use crate::model::Place;
use crate::url::normalize_website;
use crate::ScoutError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Resolves a location to candidate businesses and a business to its website
///
/// Every provider call is retried on retryable errors with a linear backoff:
/// attempt `n` that fails waits `n * backoff` before the next attempt.
#[derive(Clone)]
pub struct PlaceResolver {
    search: Arc<dyn PlaceSearch>,
    max_retries: u32,
    backoff: Duration,
}

impl PlaceResolver {
    pub fn new(search: Arc<dyn PlaceSearch>, max_retries: u32, backoff: Duration) -> Self {
        Self {
            search,
            max_retries: max_retries.max(1),
            backoff,
        }
    }

    pub fn from_config(search: Arc<dyn PlaceSearch>, config: &PlacesConfig) -> Self {
        Self::new(
            search,
            config.max_retries,
            Duration::from_millis(config.retry_backoff_ms),
        )
    }

    /// Finds candidate businesses for a query
    pub async fn search(&self, query: &str) -> crate::Result<Vec<Place>> {
        let places = self
            .with_retry("text search", || self.search.text_search(query))
            .await?;

        tracing::info!(query, candidates = places.len(), "Place search complete");
        Ok(places)
    }

    /// Looks up and normalizes the website of a place
    ///
    /// Returns `NotFound` when the provider has no website for the place and
    /// `Validation` when the website it has is not a usable URL.
    pub async fn resolve_website(&self, place: &Place) -> crate::Result<String> {
        let details = self
            .with_retry("place details", || self.search.details(&place.id))
            .await?;

        let website = details
            .website
            .ok_or_else(|| ScoutError::NotFound(format!("No website listed for {}", place.name)))?;

        normalize_website(&website).map_err(|e| {
            ScoutError::Validation(format!(
                "Unusable website '{}' for {}: {}",
                website, place.name, e
            ))
        })
    }

    async fn with_retry<T, F, Fut>(&self, operation: &str, mut call: F) -> crate::Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = crate::Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let wait = self.backoff * attempt;
                    tracing::warn!(
                        operation,
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        error = %e,
                        "Place lookup failed, retrying"
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
