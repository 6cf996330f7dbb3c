use crate::error::ScrapeError;
use crate::models::{ScrapeResult, SellerSource, StopReason, PAGE_SIZE};
use crate::scrapers::extract::{extract_advertised_total, LinkExtractor};
use crate::scrapers::traits::PageSource;
use crate::scrapers::types::ScraperConfig;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Pages through a seller profile and gathers every advert link
pub struct ListingCollector<S> {
    source: S,
    extractor: LinkExtractor,
    max_pages: u32,
    stop: Option<Arc<AtomicBool>>,
}

impl<S: PageSource> ListingCollector<S> {
    pub fn new(source: S, config: &ScraperConfig) -> Self {
        Self {
            source,
            extractor: LinkExtractor::new(config.site_root.clone()),
            max_pages: config.max_pages.max(1),
            stop: None,
        }
    }

    /// Checked before each page request; once set the scrape ends with what it has
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    fn stop_requested(&self) -> bool {
        self.stop
            .as_ref()
            .is_some_and(|stop| stop.load(Ordering::Relaxed))
    }

    /// Fetch pages 1, 2, ... until a page adds nothing new or pagination ends.
    ///
    /// A hard fetch failure returns `ScrapeError::Fetch` holding the links
    /// collected up to that point.
    pub async fn collect(&self, seller: &SellerSource) -> Result<ScrapeResult, ScrapeError> {
        info!(
            "Collecting adverts for seller '{}' from {}",
            seller.slug(),
            self.source.source_name()
        );

        let mut links: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut advertised_total = None;
        let mut last_page = self.max_pages;
        let mut pages_fetched = 0;

        let mut page = 1;
        let stop_reason = loop {
            if page > last_page {
                break if last_page < self.max_pages {
                    StopReason::AdvertisedTotalReached { pages: last_page }
                } else {
                    warn!("Stopped at page ceiling of {} pages", self.max_pages);
                    StopReason::PageCeiling {
                        pages: self.max_pages,
                    }
                };
            }

            if self.stop_requested() {
                info!("Stop requested, finishing before page {}", page);
                break StopReason::Cancelled { page };
            }

            let fetched = match self.source.fetch_page(seller, page).await {
                Ok(fetched) => fetched,
                Err(err) if err.is_end_of_pagination() => {
                    info!("Page {} not found, reached end of pagination", page);
                    break StopReason::EndOfPagination {
                        page,
                        status: err.status().unwrap_or(404),
                    };
                }
                Err(err) => {
                    warn!("Aborting after {} links: {}", links.len(), err);
                    return Err(ScrapeError::Fetch {
                        source: err,
                        partial: links,
                    });
                }
            };
            pages_fetched += 1;

            if page == 1 {
                advertised_total = extract_advertised_total(&fetched.body);
                if let Some(total) = advertised_total.filter(|total| *total > 0) {
                    let expected = total.div_ceil(PAGE_SIZE);
                    info!("Seller advertises {} adverts (~{} pages)", total, expected);
                    last_page = expected.min(self.max_pages);
                }
            }

            let found = self.extractor.extract(&fetched.body);
            let found_count = found.len();
            let new_links: Vec<String> = found
                .into_iter()
                .filter(|link| seen.insert(link.clone()))
                .collect();

            debug!(
                "Page {} (HTTP {}): {} advert links, {} new",
                fetched.page,
                fetched.status,
                found_count,
                new_links.len()
            );

            if new_links.is_empty() {
                info!("Page {} had no new adverts, stopping", page);
                break StopReason::NoNewLinks { page };
            }

            links.extend(new_links);
            page += 1;
        };

        info!(
            "✅ Collected {} advert links from {} pages ({})",
            links.len(),
            pages_fetched,
            stop_reason
        );

        Ok(ScrapeResult::new(
            seller,
            links,
            pages_fetched,
            advertised_total,
            stop_reason,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::scrapers::traits::FetchedPage;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    enum Reply {
        Html(String),
        Status(u16),
    }

    /// Serves canned pages; anything not configured is a 404
    #[derive(Default)]
    struct FixturePages {
        pages: HashMap<u32, Reply>,
        requested: Mutex<Vec<u32>>,
        stop_after: Option<(u32, Arc<AtomicBool>)>,
    }

    impl FixturePages {
        fn html(mut self, page: u32, html: String) -> Self {
            self.pages.insert(page, Reply::Html(html));
            self
        }

        fn status(mut self, page: u32, status: u16) -> Self {
            self.pages.insert(page, Reply::Status(status));
            self
        }

        fn requested(&self) -> Vec<u32> {
            self.requested.lock().expect("lock").clone()
        }
    }

    #[async_trait]
    impl PageSource for FixturePages {
        async fn fetch_page(&self, _seller: &SellerSource, page: u32) -> Result<FetchedPage, FetchError> {
            self.requested.lock().expect("lock").push(page);
            if let Some((after, stop)) = &self.stop_after {
                if page == *after {
                    stop.store(true, Ordering::Relaxed);
                }
            }
            match self.pages.get(&page) {
                Some(Reply::Html(body)) => Ok(FetchedPage {
                    page,
                    status: 200,
                    body: body.clone(),
                }),
                Some(Reply::Status(status)) => Err(FetchError::Status {
                    page,
                    status: *status,
                }),
                None => Err(FetchError::Status { page, status: 404 }),
            }
        }

        fn source_name(&self) -> &'static str {
            "fixture"
        }
    }

    fn seller() -> SellerSource {
        SellerSource::parse("https://www.kleinanzeigen.de/pro/ff-wheels-by-felgenforum")
            .expect("seller")
    }

    fn advert(id: u64) -> String {
        format!("https://www.kleinanzeigen.de/s-anzeige/felge/{}-223-8242", id)
    }

    fn page_html(ids: &[u64]) -> String {
        let anchors: String = ids
            .iter()
            .map(|id| format!("<li><a href=\"/s-anzeige/felge/{}-223-8242\">Felge</a></li>", id))
            .collect();
        format!(
            "<html><body><a href=\"/impressum\">Impressum</a><ul>{}</ul></body></html>",
            anchors
        )
    }

    fn collector(pages: FixturePages, max_pages: u32) -> (ListingCollector<Arc<FixturePages>>, Arc<FixturePages>) {
        let pages = Arc::new(pages);
        let config = ScraperConfig {
            max_pages,
            ..ScraperConfig::default()
        };
        (ListingCollector::new(pages.clone(), &config), pages)
    }

    #[tokio::test]
    async fn test_stops_when_page_repeats_known_links() {
        let (collector, pages) = collector(
            FixturePages::default()
                .html(1, page_html(&[1, 2, 3]))
                .html(2, page_html(&[4, 5]))
                .html(3, page_html(&[4, 5])),
            100,
        );

        let result = collector.collect(&seller()).await.expect("scrape");
        assert_eq!(result.links(), &[advert(1), advert(2), advert(3), advert(4), advert(5)]);
        assert_eq!(result.stop_reason(), StopReason::NoNewLinks { page: 3 });
        assert_eq!(result.pages_fetched(), 3);
        assert_eq!(pages.requested(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_merges_overlapping_pages_in_first_seen_order() {
        let (collector, _) = collector(
            FixturePages::default()
                .html(1, page_html(&[10]))
                .html(2, page_html(&[10, 20])),
            100,
        );

        let result = collector.collect(&seller()).await.expect("scrape");
        assert_eq!(result.links(), &[advert(10), advert(20)]);
        assert_eq!(result.count(), 2);
        assert_eq!(
            result.stop_reason(),
            StopReason::EndOfPagination { page: 3, status: 404 }
        );
    }

    #[tokio::test]
    async fn test_empty_page_ends_scrape() {
        let (collector, _) = collector(
            FixturePages::default()
                .html(1, page_html(&[1, 2]))
                .html(2, page_html(&[]))
                .html(3, page_html(&[3])),
            100,
        );

        let result = collector.collect(&seller()).await.expect("scrape");
        assert_eq!(result.links(), &[advert(1), advert(2)]);
        assert_eq!(result.stop_reason(), StopReason::NoNewLinks { page: 2 });
    }

    #[tokio::test]
    async fn test_hard_failure_on_first_page_has_nothing_collected() {
        let (collector, _) = collector(FixturePages::default().status(1, 500), 100);

        let err = collector.collect(&seller()).await.expect_err("500 on page 1");
        match err {
            ScrapeError::Fetch { source, partial } => {
                assert_eq!(source.page(), 1);
                assert_eq!(source.status(), Some(500));
                assert!(partial.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_hard_failure_keeps_partial_links() {
        let (collector, _) = collector(
            FixturePages::default()
                .html(1, page_html(&[1, 2]))
                .status(2, 429),
            100,
        );

        let err = collector.collect(&seller()).await.expect_err("429 on page 2");
        assert_eq!(err.partial(), &[advert(1), advert(2)]);
        assert!(err.hint().is_some());
    }

    #[tokio::test]
    async fn test_not_found_on_first_page_is_empty_result() {
        let (collector, _) = collector(FixturePages::default(), 100);

        let result = collector.collect(&seller()).await.expect("scrape");
        assert!(result.is_empty());
        assert_eq!(result.pages_fetched(), 0);
    }

    #[tokio::test]
    async fn test_page_ceiling_is_normal_termination() {
        let mut fixtures = FixturePages::default();
        for page in 1..=10u32 {
            fixtures = fixtures.html(page, page_html(&[u64::from(page)]));
        }
        let (collector, pages) = collector(fixtures, 4);

        let result = collector.collect(&seller()).await.expect("scrape");
        assert_eq!(result.count(), 4);
        assert_eq!(result.stop_reason(), StopReason::PageCeiling { pages: 4 });
        assert_eq!(pages.requested(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_advertised_total_bounds_page_count() {
        let first = page_html(&[1]).replace("<ul>", "<p>26 Anzeigen online</p><ul>");
        let (collector, pages) = collector(
            FixturePages::default()
                .html(1, first)
                .html(2, page_html(&[2]))
                .html(3, page_html(&[3])),
            100,
        );

        let result = collector.collect(&seller()).await.expect("scrape");
        assert_eq!(result.advertised_total(), Some(26));
        assert_eq!(result.links(), &[advert(1), advert(2)]);
        assert_eq!(
            result.stop_reason(),
            StopReason::AdvertisedTotalReached { pages: 2 }
        );
        assert_eq!(pages.requested(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_stop_flag_ends_between_pages() {
        let stop = Arc::new(AtomicBool::new(false));
        let fixtures = FixturePages {
            stop_after: Some((2, stop.clone())),
            ..FixturePages::default()
        }
        .html(1, page_html(&[1]))
        .html(2, page_html(&[2]))
        .html(3, page_html(&[3]));

        let (collector, pages) = collector(fixtures, 100);
        let collector = collector.with_stop_flag(stop);

        let result = collector.collect(&seller()).await.expect("scrape");
        assert_eq!(result.links(), &[advert(1), advert(2)]);
        assert_eq!(result.stop_reason(), StopReason::Cancelled { page: 3 });
        assert_eq!(pages.requested(), vec![1, 2]);
    }
}
