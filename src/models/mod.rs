use crate::error::ScrapeError;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Root every relative advert link is resolved against
pub const SITE_ROOT: &str = "https://www.kleinanzeigen.de";

/// Query parameter selecting the page of a seller's adverts
pub const PAGE_PARAM: &str = "seite";

/// Adverts shown per seller page; fixed by the site
pub const PAGE_SIZE: u32 = 25;

static SLUG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").expect("valid slug pattern"));

pub fn is_site_host(host: &str) -> bool {
    matches!(host, "www.kleinanzeigen.de" | "kleinanzeigen.de")
}

/// A validated seller profile URL of the form `https://www.kleinanzeigen.de/pro/<slug>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellerSource {
    url: Url,
    slug: String,
}

impl SellerSource {
    /// Validate a user supplied seller URL. Query and fragment are dropped.
    pub fn parse(input: &str) -> Result<Self, ScrapeError> {
        let input = input.trim();
        let invalid = |reason: &str| ScrapeError::InvalidSeller {
            url: input.to_string(),
            reason: reason.to_string(),
        };

        if input.is_empty() {
            return Err(invalid("empty URL"));
        }

        let mut url = Url::parse(input).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        match url.host_str() {
            Some(host) if is_site_host(host) => {}
            _ => return Err(invalid("not a kleinanzeigen.de address")),
        }

        let slug = {
            let segments: Vec<&str> = url
                .path_segments()
                .map(|segments| segments.filter(|s| !s.is_empty()).collect())
                .unwrap_or_default();
            match segments.as_slice() {
                ["pro", slug] if SLUG.is_match(slug) => slug.to_string(),
                _ => return Err(invalid("path must be /pro/<seller>")),
            }
        };

        url.set_query(None);
        url.set_fragment(None);
        url.set_path(&format!("/pro/{}", slug));

        Ok(Self { url, slug })
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// URL of the given 1-based page, e.g. `.../pro/some-dealer?seite=3`
    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.url.clone();
        url.query_pairs_mut()
            .append_pair(PAGE_PARAM, &page.to_string());
        url
    }
}

impl fmt::Display for SellerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the pagination loop finished without an error
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    /// The page added nothing that was not already collected
    NoNewLinks { page: u32 },
    /// The site answered 404/410 for this page
    EndOfPagination { page: u32, status: u16 },
    /// All pages implied by the seller's advertised total were fetched
    AdvertisedTotalReached { pages: u32 },
    /// The configured page ceiling was hit
    PageCeiling { pages: u32 },
    /// The stop flag was raised before this page was requested
    Cancelled { page: u32 },
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::NoNewLinks { page } => write!(f, "page {} had no new adverts", page),
            StopReason::EndOfPagination { page, status } => {
                write!(f, "page {} does not exist (HTTP {})", page, status)
            }
            StopReason::AdvertisedTotalReached { pages } => {
                write!(f, "all {} advertised pages fetched", pages)
            }
            StopReason::PageCeiling { pages } => write!(f, "page ceiling of {} reached", pages),
            StopReason::Cancelled { page } => write!(f, "cancelled before page {}", page),
        }
    }
}

/// Outcome of one scrape: the advert URLs in first-seen order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResult {
    seller: String,
    count: usize,
    links: Vec<String>,
    pages_fetched: u32,
    advertised_total: Option<u32>,
    stop_reason: StopReason,
    scraped_at: DateTime<Utc>,
}

impl ScrapeResult {
    pub(crate) fn new(
        seller: &SellerSource,
        links: Vec<String>,
        pages_fetched: u32,
        advertised_total: Option<u32>,
        stop_reason: StopReason,
    ) -> Self {
        Self {
            seller: seller.to_string(),
            count: links.len(),
            links,
            pages_fetched,
            advertised_total,
            stop_reason,
            scraped_at: Utc::now(),
        }
    }

    pub fn seller(&self) -> &str {
        &self.seller
    }

    pub fn links(&self) -> &[String] {
        &self.links
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    pub fn advertised_total(&self) -> Option<u32> {
        self.advertised_total
    }

    pub fn stop_reason(&self) -> StopReason {
        self.stop_reason
    }

    pub fn scraped_at(&self) -> DateTime<Utc> {
        self.scraped_at
    }

    pub fn into_links(self) -> Vec<String> {
        self.links
    }
}
