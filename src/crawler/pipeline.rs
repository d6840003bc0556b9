use super::extractor::ProductExtractor;
use super::sitemap::SiteDiscoverer;
use crate::model::{Competitor, Place};
use crate::places::PlaceResolver;
use crate::ScoutError;
use tokio_util::sync::CancellationToken;

/// What one business pipeline produced
#[derive(Debug)]
pub(crate) enum BusinessReport {
    /// The place has no website listed
    Skipped,

    /// The pipeline ran to the end; `competitor` is None when no products
    /// were extracted
    Finished {
        competitor: Option<Competitor>,
        page_failures: Vec<(String, ScoutError)>,
    },
}

/// Website resolution, page discovery and extraction for one business
pub(crate) struct BusinessPipeline {
    pub(crate) resolver: PlaceResolver,
    pub(crate) discoverer: SiteDiscoverer,
    pub(crate) extractor: ProductExtractor,
}

impl BusinessPipeline {
    pub(crate) async fn run(
        &self,
        place: &Place,
        cancel: &CancellationToken,
    ) -> crate::Result<BusinessReport> {
        let website = match self.resolver.resolve_website(place).await {
            Ok(website) => website,
            Err(ScoutError::NotFound(reason)) => {
                tracing::info!(business = %place.name, %reason, "Skipping business");
                return Ok(BusinessReport::Skipped);
            }
            Err(e) => return Err(e),
        };

        let urls = self.discoverer.relevant_urls(&website, cancel).await?;
        if urls.is_empty() {
            return Ok(BusinessReport::Finished {
                competitor: None,
                page_failures: Vec::new(),
            });
        }

        tracing::info!(business = %place.name, pages = urls.len(), "Extracting products");
        let extraction = self.extractor.extract_all(&urls, cancel).await?;

        Ok(BusinessReport::Finished {
            competitor: Competitor::from_products(&place.name, website, extraction.products),
            page_failures: extraction.failures,
        })
    }
}
