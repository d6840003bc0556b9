//! Crawl/extraction provider access
//!
//! `CrawlProvider` is the seam the discovery pipeline talks through;
//! `FirecrawlClient` is the production implementation.

mod firecrawl;
mod http;
mod traits;

pub use firecrawl::{FirecrawlClient, SERVICE as FIRECRAWL_SERVICE};
pub use http::{build_http_client, user_agent_string};
pub use traits::{CrawlOptions, CrawlProvider, CrawlStatusReport, MapOptions, MapResult};

pub(crate) use http::read_json;
