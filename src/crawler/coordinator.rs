//! Competitor discovery coordinator - fan-out/fan-in over candidate businesses
//!
//! This module contains the top-level discovery flow:
//! - Validating the location and running the place search
//! - Spawning one bounded pipeline task per candidate business
//! - Collecting competitors and per-business failures as tasks complete
//! - Persisting successful runs

use super::extractor::ProductExtractor;
use super::pipeline::{BusinessPipeline, BusinessReport};
use super::sitemap::SiteDiscoverer;
use super::LimitedProvider;
use crate::config::{Config, DiscoveryConfig};
use crate::model::{Competitor, Place, SearchResult};
use crate::places::{PlaceResolver, PlaceSearch};
use crate::provider::CrawlProvider;
use crate::ratelimit::RateLimiter;
use crate::storage::{persist_search_result, Store};
use crate::{ErrorKind, ScoutError};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};
use tokio_util::sync::CancellationToken;

/// A business whose pipeline failed, fully or for some pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusinessFailure {
    pub business: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl BusinessFailure {
    pub fn new(business: &str, error: &ScoutError) -> Self {
        Self {
            business: business.to_string(),
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Full outcome of a discovery run
///
/// `result` is what `discover` returns; the other fields explain what
/// happened to the candidates that did not become competitors.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryOutcome {
    pub result: SearchResult,
    /// Number of businesses returned by the place search
    pub candidates: usize,
    /// Businesses skipped because no website is listed
    pub skipped: Vec<String>,
    pub failures: Vec<BusinessFailure>,
    /// True if the run was cancelled before every business finished
    pub cancelled: bool,
}

/// Finds the competitors operating in a location
pub struct CompetitorOrchestrator {
    config: DiscoveryConfig,
    resolver: PlaceResolver,
    pipeline: Arc<BusinessPipeline>,
    store: Option<Arc<dyn Store>>,
}

impl CompetitorOrchestrator {
    /// Creates an orchestrator over the given collaborators
    ///
    /// The limiter is shared by every business pipeline of every run made
    /// through this orchestrator.
    pub fn new(
        config: &Config,
        places: Arc<dyn PlaceSearch>,
        provider: Arc<dyn CrawlProvider>,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        let limited = LimitedProvider::new(provider, limiter, config.rate_limit.max_wait_attempts);
        let resolver = PlaceResolver::from_config(places, &config.places);

        let pipeline = BusinessPipeline {
            resolver: resolver.clone(),
            discoverer: SiteDiscoverer::from_config(limited.clone(), &config.discovery),
            extractor: ProductExtractor::new(limited, config.provider.extract_prompt.clone()),
        };

        Self {
            config: config.discovery.clone(),
            resolver,
            pipeline: Arc::new(pipeline),
            store: None,
        }
    }

    /// Persists every successful, uncancelled run to `store`
    pub fn with_store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Discovers the competitors of a location
    ///
    /// Fails only if the location is blank or the place search fails;
    /// individual businesses that fail are left out of the result.
    pub async fn discover(&self, location: &str) -> crate::Result<SearchResult> {
        self.discover_detailed(location, CancellationToken::new())
            .await
            .map(|outcome| outcome.result)
    }

    /// Discovers the competitors of a location, reporting per-business
    /// failures and honouring `cancel`
    ///
    /// Cancellation before the place search completes is an error.
    /// Cancellation afterwards returns the competitors assembled so far with
    /// `cancelled` set; in-flight businesses contribute nothing.
    pub async fn discover_detailed(
        &self,
        location: &str,
        cancel: CancellationToken,
    ) -> crate::Result<DiscoveryOutcome> {
        let location = validate_location(location)?;
        let query = self.config.query_for(location);

        let places = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ScoutError::Cancelled),
            places = self.resolver.search(&query) => places?,
        };

        tracing::info!(
            location,
            candidates = places.len(),
            max_concurrent = self.config.max_concurrent_businesses,
            "Starting competitor discovery"
        );

        let candidates = places.len();
        let semaphore = Arc::new(Semaphore::new(
            self.config.max_concurrent_businesses as usize,
        ));
        let mut tasks = JoinSet::new();
        let mut names: HashMap<task::Id, String> = HashMap::with_capacity(candidates);

        for place in places {
            let pipeline = Arc::clone(&self.pipeline);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            let name = place.name.clone();

            let handle = tasks.spawn(async move {
                let result = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(ScoutError::Cancelled),
                    result = run_gated(&pipeline, &semaphore, &place, &cancel) => result,
                };
                (place, result)
            });
            names.insert(handle.id(), name);
        }

        let mut competitors: Vec<Competitor> = Vec::new();
        let mut skipped = Vec::new();
        let mut failures = Vec::new();

        while let Some(joined) = tasks.join_next_with_id().await {
            let (place, result) = match joined {
                Ok((id, output)) => {
                    names.remove(&id);
                    output
                }
                Err(e) => {
                    let business = names
                        .remove(&e.id())
                        .unwrap_or_else(|| "unknown".to_string());
                    tracing::error!(business = %business, error = %e, "Business task panicked");
                    failures.push(BusinessFailure {
                        business,
                        kind: ErrorKind::Internal,
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            match result {
                Ok(BusinessReport::Skipped) => skipped.push(place.name),
                Ok(BusinessReport::Finished {
                    competitor,
                    page_failures,
                }) => {
                    for (url, e) in page_failures {
                        failures.push(BusinessFailure {
                            business: place.name.clone(),
                            kind: e.kind(),
                            message: format!("{}: {}", url, e),
                        });
                    }

                    match competitor {
                        Some(competitor) => {
                            tracing::info!(
                                business = %competitor.name,
                                products = competitor.products.len(),
                                "Competitor assembled"
                            );
                            competitors.push(competitor);
                        }
                        None => {
                            tracing::info!(business = %place.name, "No products found")
                        }
                    }
                }
                Err(ScoutError::Cancelled) => {
                    tracing::debug!(business = %place.name, "Business pipeline cancelled");
                }
                Err(e) => {
                    tracing::warn!(business = %place.name, error = %e, "Business pipeline failed");
                    failures.push(BusinessFailure::new(&place.name, &e));
                }
            }
        }

        let cancelled = cancel.is_cancelled();
        let result = SearchResult::new(location, competitors);

        tracing::info!(
            location,
            competitors = result.total_found,
            products = result.product_count(),
            skipped = skipped.len(),
            failures = failures.len(),
            cancelled,
            "Competitor discovery finished"
        );

        if !cancelled {
            self.persist(&result);
        }

        Ok(DiscoveryOutcome {
            result,
            candidates,
            skipped,
            failures,
            cancelled,
        })
    }

    fn persist(&self, result: &SearchResult) {
        let Some(store) = &self.store else {
            return;
        };

        match persist_search_result(store.as_ref(), result) {
            Ok(keys) => tracing::info!(location = %result.location, keys, "Stored search result"),
            Err(e) => {
                tracing::warn!(location = %result.location, error = %e, "Failed to store search result")
            }
        }
    }
}

/// Runs one business pipeline while holding a gate permit
async fn run_gated(
    pipeline: &BusinessPipeline,
    semaphore: &Arc<Semaphore>,
    place: &Place,
    cancel: &CancellationToken,
) -> crate::Result<BusinessReport> {
    let _permit = Arc::clone(semaphore)
        .acquire_owned()
        .await
        .map_err(|_| ScoutError::Cancelled)?;

    tracing::debug!(business = %place.name, "Business pipeline started");
    pipeline.run(place, cancel).await
}

fn validate_location(location: &str) -> crate::Result<&str> {
    let trimmed = location.trim();
    if trimmed.is_empty() {
        return Err(ScoutError::Validation(
            "location must not be empty".to_string(),
        ));
    }
    Ok(trimmed)
}
