//! Collects every advert link from a kleinanzeigen.de seller profile and
//! exports the list as text, CSV, XLSX, DOCX or JSON.

pub mod error;
pub mod export;
pub mod models;
pub mod scrapers;

pub use error::{ExportError, FetchError, ScrapeError};
pub use export::{export, ExportFormat};
pub use models::{ScrapeResult, SellerSource, StopReason};
pub use scrapers::{HttpPageFetcher, ListingCollector, PageSource, ScraperConfig};

/// Validate `seller_url` and collect all of its advert links over HTTP
pub async fn scrape_seller_listings(
    seller_url: &str,
    config: &ScraperConfig,
) -> Result<ScrapeResult, ScrapeError> {
    let seller = SellerSource::parse(seller_url)?;
    let fetcher = HttpPageFetcher::with_config(config)?;
    ListingCollector::new(fetcher, config).collect(&seller).await
}
