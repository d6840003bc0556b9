//! Discovery pipeline for competitor websites
//!
//! This module contains the per-business pipeline and its orchestration:
//! - Site map lookup with a crawl fallback
//! - Crawl job polling
//! - Schema-guided product extraction
//! - Bounded fan-out over candidate businesses and result aggregation

mod coordinator;
mod extractor;
mod pipeline;
mod sitemap;
mod site_crawler;

pub use coordinator::{BusinessFailure, CompetitorOrchestrator, DiscoveryOutcome};
pub use extractor::{parse_price, parse_price_text, product_schema, PageExtraction, ProductExtractor};
pub use sitemap::SiteDiscoverer;
pub use site_crawler::SiteCrawler;

use crate::provider::{CrawlProvider, FIRECRAWL_SERVICE};
use crate::ratelimit::RateLimiter;
use crate::ScoutError;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Crawl provider handle that hands out the provider only after a rate
/// limit token was granted
#[derive(Clone)]
pub struct LimitedProvider {
    provider: Arc<dyn CrawlProvider>,
    limiter: Arc<RateLimiter>,
    max_wait_attempts: u32,
}

impl LimitedProvider {
    pub fn new(
        provider: Arc<dyn CrawlProvider>,
        limiter: Arc<RateLimiter>,
        max_wait_attempts: u32,
    ) -> Self {
        Self {
            provider,
            limiter,
            max_wait_attempts,
        }
    }

    /// Waits for a token, then returns the provider for exactly one call
    pub async fn acquire(&self, cancel: &CancellationToken) -> crate::Result<&dyn CrawlProvider> {
        self.limiter
            .acquire(FIRECRAWL_SERVICE, self.max_wait_attempts, cancel)
            .await?;
        Ok(self.provider.as_ref())
    }
}

/// Sleeps for `duration` unless `cancel` fires first
pub(crate) async fn sleep_or_cancel(
    duration: Duration,
    cancel: &CancellationToken,
) -> crate::Result<()> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ScoutError::Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}
