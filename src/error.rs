use thiserror::Error;

/// Failure while fetching a single seller page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("page numbers start at 1, got {page}")]
    InvalidPage { page: u32 },

    #[error("page {page} returned HTTP {status}")]
    Status { page: u32, status: u16 },

    #[error("page {page} could not be fetched: {source}")]
    Transport {
        page: u32,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    pub fn page(&self) -> u32 {
        match self {
            FetchError::InvalidPage { page }
            | FetchError::Status { page, .. }
            | FetchError::Transport { page, .. } => *page,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            FetchError::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            FetchError::InvalidPage { .. } => None,
        }
    }

    /// 404 and 410 mean the seller has no page with this index
    pub fn is_end_of_pagination(&self) -> bool {
        matches!(self, FetchError::Status { status: 404 | 410, .. })
    }

    /// The site answered in a way that usually means we are being throttled
    pub fn looks_blocked(&self) -> bool {
        matches!(self.status(), Some(403 | 429))
    }
}

/// Errors that abort a scrape
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("not a seller profile URL ({reason}): '{url}'")]
    InvalidSeller { url: String, reason: String },

    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("scrape aborted after {count} links: {source}", count = .partial.len())]
    Fetch {
        #[source]
        source: FetchError,
        partial: Vec<String>,
    },
}

impl ScrapeError {
    /// Links collected before a hard failure, if any
    pub fn partial(&self) -> &[String] {
        match self {
            ScrapeError::Fetch { partial, .. } => partial,
            _ => &[],
        }
    }

    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ScrapeError::Fetch { source, .. } if source.looks_blocked() => Some(
                "the site appears to be blocking or rate limiting requests; wait a while and run again",
            ),
            ScrapeError::Fetch { source, .. } if source.status().is_some_and(|s| s >= 500) => {
                Some("the site reported a server error; try again later")
            }
            ScrapeError::InvalidSeller { .. } => {
                Some("expected something like https://www.kleinanzeigen.de/pro/<seller>")
            }
            _ => None,
        }
    }
}

/// Failure while encoding an export payload
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP packaging failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}
