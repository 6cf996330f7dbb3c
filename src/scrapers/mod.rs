pub mod collector;
pub mod extract;
pub mod fetcher;
pub mod traits;
pub mod types;

pub use collector::ListingCollector;
pub use extract::LinkExtractor;
pub use fetcher::HttpPageFetcher;
pub use traits::{FetchedPage, PageSource};
pub use types::ScraperConfig;
