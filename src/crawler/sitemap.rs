//! Relevant page discovery for one website
//!
//! Drives the per-site state machine: a cheap site map request first, and the
//! fallback crawl only when the map yields nothing relevant.

use super::site_crawler::SiteCrawler;
use super::LimitedProvider;
use crate::config::DiscoveryConfig;
use crate::provider::{MapOptions, FIRECRAWL_SERVICE};
use crate::state::{SiteEvent, SiteState};
use crate::url::RelevanceFilter;
use crate::ScoutError;
use tokio_util::sync::CancellationToken;

/// Finds the catalog-like pages of a website
#[derive(Clone)]
pub struct SiteDiscoverer {
    provider: LimitedProvider,
    crawler: SiteCrawler,
    filter: RelevanceFilter,
    map_options: MapOptions,
    max_pages: usize,
}

impl SiteDiscoverer {
    pub fn new(
        provider: LimitedProvider,
        crawler: SiteCrawler,
        filter: RelevanceFilter,
        map_options: MapOptions,
        max_pages: usize,
    ) -> Self {
        Self {
            provider,
            crawler,
            filter,
            map_options,
            max_pages,
        }
    }

    pub fn from_config(provider: LimitedProvider, config: &DiscoveryConfig) -> Self {
        let crawler = SiteCrawler::from_config(provider.clone(), config);
        Self::new(
            provider,
            crawler,
            RelevanceFilter::new(&config.relevant_keywords),
            MapOptions {
                include_subdomains: config.include_subdomains,
                limit: config.map_limit,
            },
            config.max_pages_per_site,
        )
    }

    /// Returns the relevant URLs of `website`, capped at the per-site limit
    ///
    /// An empty list means the site was exhausted without finding anything.
    /// Errors are limited to cancellation and a failed crawl submission; a
    /// failed map request always falls back to crawling.
    pub async fn relevant_urls(
        &self,
        website: &str,
        cancel: &CancellationToken,
    ) -> crate::Result<Vec<String>> {
        let mut state = SiteState::Mapping;
        let mut relevant = Vec::new();

        loop {
            let event = match state {
                SiteState::Mapping => match self.map_site(website, cancel).await {
                    Ok(urls) => {
                        relevant = urls;
                        SiteEvent::RelevantUrls(relevant.len())
                    }
                    Err(ScoutError::Cancelled) => return Err(ScoutError::Cancelled),
                    Err(e) => {
                        tracing::warn!(website, error = %e, "Site map request failed");
                        SiteEvent::Failed
                    }
                },
                SiteState::Crawling => {
                    let job = self.crawler.crawl(website, cancel).await?;
                    relevant = self.filter.filter(&job.discovered_links);
                    SiteEvent::RelevantUrls(relevant.len())
                }
                SiteState::Extracting | SiteState::Exhausted => break,
            };

            let next = state.next(event);
            tracing::debug!(website, from = %state, to = %next, "Site state transition");
            state = next;
        }

        if state == SiteState::Exhausted {
            tracing::info!(website, "No relevant pages found");
            return Ok(Vec::new());
        }

        if relevant.len() > self.max_pages {
            tracing::debug!(
                website,
                found = relevant.len(),
                kept = self.max_pages,
                "Capping relevant pages"
            );
            relevant.truncate(self.max_pages);
        }

        Ok(relevant)
    }

    async fn map_site(
        &self,
        website: &str,
        cancel: &CancellationToken,
    ) -> crate::Result<Vec<String>> {
        let result = self
            .provider
            .acquire(cancel)
            .await?
            .map(website, self.map_options)
            .await?;

        if !result.success {
            return Err(ScoutError::external(
                FIRECRAWL_SERVICE,
                result
                    .error
                    .unwrap_or_else(|| "site map unavailable".to_string()),
            ));
        }

        let relevant = self.filter.filter(&result.links);
        tracing::debug!(
            website,
            links = result.links.len(),
            relevant = relevant.len(),
            "Site map request complete"
        );
        Ok(relevant)
    }
}
