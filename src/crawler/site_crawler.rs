//! Fallback crawl: submit a job, then poll it to a terminal status

use super::{sleep_or_cancel, LimitedProvider};
use crate::config::DiscoveryConfig;
use crate::provider::CrawlOptions;
use crate::state::{CrawlJob, CrawlStatus};
use crate::ScoutError;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Runs fallback crawl jobs with a bounded polling schedule
#[derive(Clone)]
pub struct SiteCrawler {
    provider: LimitedProvider,
    options: CrawlOptions,
    poll_interval: Duration,
    max_polls: u32,
}

impl SiteCrawler {
    pub fn new(
        provider: LimitedProvider,
        options: CrawlOptions,
        poll_interval: Duration,
        max_polls: u32,
    ) -> Self {
        Self {
            provider,
            options,
            poll_interval,
            max_polls,
        }
    }

    pub fn from_config(provider: LimitedProvider, config: &DiscoveryConfig) -> Self {
        Self::new(
            provider,
            CrawlOptions {
                limit: config.crawl_limit,
            },
            Duration::from_millis(config.crawl_poll_interval_ms),
            config.crawl_max_polls,
        )
    }

    /// Submits a crawl of `website` and polls it until it is terminal or the
    /// poll budget is spent
    ///
    /// Only a failed submission (or cancellation) is an error. A job that
    /// fails provider-side or outlives the budget is returned as-is and
    /// carries no links.
    pub async fn crawl(
        &self,
        website: &str,
        cancel: &CancellationToken,
    ) -> crate::Result<CrawlJob> {
        let job_id = self
            .provider
            .acquire(cancel)
            .await?
            .submit_crawl(website, self.options)
            .await?;

        let mut job = CrawlJob::submitted(job_id);
        tracing::info!(website, job_id = %job.id, "Crawl job submitted");

        for attempt in 1..=self.max_polls {
            sleep_or_cancel(self.poll_interval, cancel).await?;

            let report = match self.provider.acquire(cancel).await {
                Ok(provider) => provider.crawl_status(&job.id).await,
                Err(e) => Err(e),
            };

            match report {
                Ok(report) => {
                    if !job.apply_poll(report.status, report.links) {
                        tracing::debug!(
                            job_id = %job.id,
                            current = %job.status,
                            reported = %report.status,
                            "Ignoring out-of-order crawl status"
                        );
                    }
                }
                Err(ScoutError::Cancelled) => return Err(ScoutError::Cancelled),
                Err(e) => {
                    tracing::warn!(job_id = %job.id, attempt, error = %e, "Crawl status poll failed");
                }
            }

            if job.is_terminal() {
                break;
            }
        }

        match job.status {
            CrawlStatus::Completed => tracing::info!(
                website,
                job_id = %job.id,
                links = job.discovered_links.len(),
                "Crawl job completed"
            ),
            CrawlStatus::Failed => {
                tracing::warn!(website, job_id = %job.id, "Crawl job failed")
            }
            CrawlStatus::Queued | CrawlStatus::Running => tracing::warn!(
                website,
                job_id = %job.id,
                max_polls = self.max_polls,
                "Crawl job did not finish within the poll budget"
            ),
        }

        Ok(job)
    }
}
