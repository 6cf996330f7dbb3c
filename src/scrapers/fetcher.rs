use crate::error::{FetchError, ScrapeError};
use crate::models::SellerSource;
use crate::scrapers::traits::{FetchedPage, PageSource};
use crate::scrapers::types::ScraperConfig;
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

/// Fetches seller pages from kleinanzeigen.de over plain HTTP
pub struct HttpPageFetcher {
    client: Client,
}

impl HttpPageFetcher {
    /// Create a fetcher with the default configuration
    pub fn new() -> Result<Self, ScrapeError> {
        Self::with_config(&ScraperConfig::default())
    }

    /// Create a fetcher using the timeout and User-Agent from `config`
    pub fn with_config(config: &ScraperConfig) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(ScrapeError::Client)?;

        Ok(Self { client })
    }

    /// Single GET, no retries
    async fn fetch_url(&self, url: Url, page: u32) -> Result<FetchedPage, FetchError> {
        if page == 0 {
            return Err(FetchError::InvalidPage { page });
        }

        debug!("Fetching page {}: {}", page, url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport { page, source })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Page {} returned status: {}", page, status);
            return Err(FetchError::Status {
                page,
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Transport { page, source })?;

        debug!("Downloaded {} bytes of HTML for page {}", body.len(), page);

        Ok(FetchedPage {
            page,
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl PageSource for HttpPageFetcher {
    async fn fetch_page(&self, seller: &SellerSource, page: u32) -> Result<FetchedPage, FetchError> {
        self.fetch_url(seller.page_url(page), page).await
    }

    fn source_name(&self) -> &'static str {
        "kleinanzeigen.de"
    }
}
