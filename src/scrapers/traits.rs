use crate::error::FetchError;
use crate::models::SellerSource;
use async_trait::async_trait;
use std::sync::Arc;

/// Raw HTML of one seller page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub page: u32,
    pub status: u16,
    pub body: String,
}

/// Anything that can hand out seller pages by index.
/// The collector only talks to this, so tests can serve fixture HTML.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the 1-based `page` of the seller's advert list
    async fn fetch_page(&self, seller: &SellerSource, page: u32) -> Result<FetchedPage, FetchError>;

    /// Name used in log lines
    fn source_name(&self) -> &'static str;
}

#[async_trait]
impl<T: PageSource + ?Sized> PageSource for Arc<T> {
    async fn fetch_page(&self, seller: &SellerSource, page: u32) -> Result<FetchedPage, FetchError> {
        (**self).fetch_page(seller, page).await
    }

    fn source_name(&self) -> &'static str {
        (**self).source_name()
    }
}
