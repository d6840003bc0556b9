//! State module for tracking discovery progress
//!
//! This module provides the small state machines the pipeline runs per website.
//!
//! # Components
//!
//! - `CrawlStatus` / `CrawlJob`: lifecycle of a fallback crawl job, mutated only by polling
//! - `SiteState`: the map → crawl → extract fallback sequence for one website

mod crawl_job;
mod site_state;

// Re-export main types
pub use crawl_job::{CrawlJob, CrawlStatus};
pub use site_state::{SiteEvent, SiteState};
