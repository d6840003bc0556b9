use serde::Deserialize;

/// Main configuration structure for Competitor-Scout
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(rename = "rate-limit", default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub places: PlacesConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Discovery pipeline behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DiscoveryConfig {
    /// Place search query; `{location}` is replaced by the requested location
    pub search_query: String,

    /// Maximum number of businesses processed concurrently
    pub max_concurrent_businesses: u32,

    /// Maximum number of links requested from the site map request
    pub map_limit: u32,

    /// Whether the site map request includes subdomains
    pub include_subdomains: bool,

    /// Maximum number of pages the fallback crawl may visit
    pub crawl_limit: u32,

    /// Delay between crawl status polls (milliseconds)
    pub crawl_poll_interval_ms: u64,

    /// Maximum number of crawl status polls before giving up
    pub crawl_max_polls: u32,

    /// Maximum number of relevant pages extracted per business
    pub max_pages_per_site: usize,

    /// Path keywords that mark a URL as catalog-like
    pub relevant_keywords: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            search_query: "bounce house rentals in {location}".to_string(),
            max_concurrent_businesses: 5,
            map_limit: 500,
            include_subdomains: true,
            crawl_limit: 100,
            crawl_poll_interval_ms: 2000,
            crawl_max_polls: 30,
            max_pages_per_site: 50,
            relevant_keywords: crate::url::DEFAULT_RELEVANT_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
        }
    }
}

impl DiscoveryConfig {
    /// Renders the place search query for a location
    pub fn query_for(&self, location: &str) -> String {
        self.search_query.replace("{location}", location)
    }
}

/// Token bucket settings for the crawl provider
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RateLimitConfig {
    /// Maximum number of tokens in the bucket
    pub capacity: u32,

    /// Time to refill one token (milliseconds)
    pub refill_interval_ms: u64,

    /// How many refill intervals a caller waits for a token before failing
    pub max_wait_attempts: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: 5,
            refill_interval_ms: 1000,
            max_wait_attempts: 30,
        }
    }
}

/// Crawl/extraction provider connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ProviderConfig {
    /// Base URL of the provider API
    pub base_url: String,

    /// API key; falls back to the `FIRECRAWL_API_KEY` environment variable
    pub api_key: Option<String>,

    /// Extraction prompt sent with every scrape request
    pub extract_prompt: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.firecrawl.dev".to_string(),
            api_key: None,
            extract_prompt: DEFAULT_EXTRACT_PROMPT.to_string(),
        }
    }
}

/// Default instruction for product extraction
pub const DEFAULT_EXTRACT_PROMPT: &str = "Extract all rental products from the page. \
For each product, include its name, rental price, and URL if available. \
If a price range is given, use the lowest price. \
Categorize each product as either 'Bounce House', 'Water Slide', 'Obstacle Course', or 'Other'.";

/// Place search provider connection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct PlacesConfig {
    /// Base URL of the place search API
    pub base_url: String,

    /// API key; falls back to the `GOOGLE_PLACES_API_KEY` environment variable
    pub api_key: Option<String>,

    /// Attempts per place search call
    pub max_retries: u32,

    /// Linear backoff step between attempts (milliseconds)
    pub retry_backoff_ms: u64,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maps.googleapis.com/maps/api/place".to_string(),
            api_key: None,
            max_retries: 3,
            retry_backoff_ms: 1000,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the client
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the client
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// Email address for contact about this client
    #[serde(rename = "contact-email")]
    pub contact_email: String,

    /// Request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    60
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown report file
    #[serde(rename = "report-path", default)]
    pub report_path: Option<String>,
}
