/// Per-website discovery states
///
/// A website starts in `Mapping`. A map that yields relevant URLs goes
/// straight to `Extracting`; anything else falls back to `Crawling`. A crawl
/// either yields relevant URLs (`Extracting`) or gives up (`Exhausted`).
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SiteState {
    /// Waiting for the site map request
    Mapping,

    /// Waiting for the fallback crawl to reach a terminal status
    Crawling,

    /// Relevant URLs are known; products are being extracted
    Extracting,

    /// No relevant URLs could be found
    Exhausted,
}

/// Outcome of a discovery step, fed into `SiteState::next`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteEvent {
    /// The step produced this many relevant URLs (after filtering)
    RelevantUrls(usize),

    /// The step failed outright
    Failed,
}

impl SiteState {
    /// Returns the state reached after `event`
    ///
    /// Terminal states absorb every event.
    pub fn next(self, event: SiteEvent) -> SiteState {
        let found = matches!(event, SiteEvent::RelevantUrls(n) if n > 0);

        match self {
            Self::Mapping if found => Self::Extracting,
            Self::Mapping => Self::Crawling,
            Self::Crawling if found => Self::Extracting,
            Self::Crawling => Self::Exhausted,
            Self::Extracting | Self::Exhausted => self,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Extracting | Self::Exhausted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mapping => "mapping",
            Self::Crawling => "crawling",
            Self::Extracting => "extracting",
            Self::Exhausted => "exhausted",
        }
    }
}

impl fmt::Display for SiteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
