/// Crawl job state definitions
///
/// A crawl job is created by submission and then only changes through status
/// polls until it reaches a terminal status.
use std::fmt;

/// Lifecycle status of a provider crawl job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlStatus {
    // ===== Active States =====
    /// Submitted, not yet started by the provider
    Queued,

    /// Provider is traversing the site
    Running,

    // ===== Terminal States =====
    /// Traversal finished; discovered links are final
    Completed,

    /// Traversal failed or was cancelled provider-side
    Failed,
}

impl CrawlStatus {
    /// Returns true if no further polling is needed
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true if a job may move from this status to `next`
    ///
    /// Terminal statuses never change and a running job never goes back to
    /// queued.
    pub fn can_transition_to(&self, next: CrawlStatus) -> bool {
        match self {
            Self::Queued => true,
            Self::Running => next != Self::Queued,
            Self::Completed | Self::Failed => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Maps a provider status string to a crawl status
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_provider(status: &str) -> Option<Self> {
        match status.trim().to_ascii_lowercase().as_str() {
            "queued" | "pending" | "waiting" => Some(Self::Queued),
            "running" | "scraping" | "in_progress" | "active" => Some(Self::Running),
            "completed" | "done" => Some(Self::Completed),
            "failed" | "cancelled" | "canceled" | "error" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submitted crawl job and the links it has discovered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlJob {
    pub id: String,
    pub status: CrawlStatus,
    pub discovered_links: Vec<String>,
}

impl CrawlJob {
    /// Creates a freshly submitted job
    pub fn submitted(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: CrawlStatus::Queued,
            discovered_links: Vec::new(),
        }
    }

    /// Applies one status poll to the job
    ///
    /// Returns false, leaving the job untouched, when the reported status is
    /// not a valid successor of the current one. Links are only recorded when
    /// the job completes.
    pub fn apply_poll(&mut self, status: CrawlStatus, links: Vec<String>) -> bool {
        if !self.status.can_transition_to(status) {
            return false;
        }

        self.status = status;
        if status == CrawlStatus::Completed {
            self.discovered_links = links;
        }
        true
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
