use crate::models::SITE_ROOT;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Default cap on pages fetched for one seller
pub const DEFAULT_MAX_PAGES: u32 = 2000;

/// Settings for fetching and paging through a seller profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Root relative advert links are resolved against
    pub site_root: Url,
    /// User-Agent sent with every request
    pub user_agent: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Hard upper bound on pages requested in one run
    pub max_pages: u32,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            site_root: Url::parse(SITE_ROOT).expect("SITE_ROOT is a valid URL"),
            user_agent: concat!(
                "Mozilla/5.0 (compatible; kleinanzeigen-links/",
                env!("CARGO_PKG_VERSION"),
                ")"
            )
            .to_string(),
            timeout: Duration::from_secs(15),
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}
