use crate::models::is_site_host;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

static ANCHORS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href]").expect("valid anchor selector"));

// e.g. /s-anzeige/bbs-felgen-19-zoll/2801821674-223-8242
static ADVERT_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/s-anzeige/(?:[^/]+/)*\d+(?:-\d+)*/?$").expect("valid advert path pattern")
});

// "1.489 Anzeigen online" near the seller description
static ADVERTISED_TOTAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,3}(?:\.\d{3})+|\d+)(?:\s|&nbsp;)+Anzeigen(?:\s|&nbsp;)+online")
        .expect("valid advertised total pattern")
});

/// Pulls advert links out of seller page HTML
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    root: Url,
}

impl LinkExtractor {
    pub fn new(root: Url) -> Self {
        Self { root }
    }

    /// Advert URLs on one page, absolute, deduplicated, in document order
    pub fn extract(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);

        let mut seen = HashSet::new();
        let mut links = Vec::new();
        let mut ignored = 0usize;

        for anchor in document.select(&ANCHORS) {
            let href = anchor.value().attr("href").unwrap_or("");
            match self.advert_url(href) {
                Some(url) => {
                    let url = String::from(url);
                    if seen.insert(url.clone()) {
                        links.push(url);
                    }
                }
                None => ignored += 1,
            }
        }

        debug!("Found {} advert links, ignored {} other anchors", links.len(), ignored);
        links
    }

    /// Resolve `href` against the site root and keep it only if it points at an advert
    pub fn advert_url(&self, href: &str) -> Option<Url> {
        let href = href.trim();
        if href.is_empty() {
            return None;
        }

        let mut url = self.root.join(href).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }

        let host = url.host_str()?;
        if !(is_site_host(host) || Some(host) == self.root.host_str()) {
            return None;
        }

        if !ADVERT_PATH.is_match(url.path()) {
            return None;
        }

        url.set_fragment(None);
        Some(url)
    }
}

/// Number from the seller's "<N> Anzeigen online" counter, if the page shows one
pub fn extract_advertised_total(html: &str) -> Option<u32> {
    let captures = ADVERTISED_TOTAL.captures(html)?;
    captures[1].replace('.', "").parse().ok()
}
