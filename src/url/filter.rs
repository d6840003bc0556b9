use url::Url;

/// Path keywords that mark a catalog-like page
pub const DEFAULT_RELEVANT_KEYWORDS: &[&str] = &[
    "/products",
    "/rentals",
    "/inventory",
    "/bounce-house",
    "/inflatables",
    "/catalog",
    "/equipment",
    "/items",
];

/// Keyword-based keep/drop decision for discovered URLs
///
/// Keywords are matched case-insensitively against the URL path only, so a
/// host or query string that happens to contain a keyword does not count.
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    keywords: Vec<String>,
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self::new(DEFAULT_RELEVANT_KEYWORDS.iter().copied())
    }
}

impl RelevanceFilter {
    /// Creates a filter from a keyword set
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Returns true if the URL path contains any keyword
    ///
    /// URLs that do not parse as absolute URLs are never relevant.
    pub fn is_relevant(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url.trim()) else {
            return false;
        };

        let path = parsed.path().to_lowercase();
        self.keywords.iter().any(|k| path.contains(k.as_str()))
    }

    /// Keeps the relevant URLs, preserving their relative order
    pub fn filter<S: AsRef<str>>(&self, urls: &[S]) -> Vec<String> {
        urls.iter()
            .map(AsRef::as_ref)
            .filter(|u| self.is_relevant(u))
            .map(str::to_string)
            .collect()
    }
}

/// Filters URLs with the default keyword set
///
/// # Examples
///
/// ```
/// use competitor_scout::url::filter_relevant_urls;
///
/// let kept = filter_relevant_urls(&[
///     "https://site.com/about",
///     "https://site.com/Bounce-House/castle",
/// ]);
/// assert_eq!(kept, vec!["https://site.com/Bounce-House/castle"]);
/// ```
pub fn filter_relevant_urls<S: AsRef<str>>(urls: &[S]) -> Vec<String> {
    RelevanceFilter::default().filter(urls)
}
