//! Test utilities: an in-memory page fetcher and HTML fixture builders
//!
//! Every test gets its own `FixtureFetcher`, so nothing touches the network
//! and request logs never leak between tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::infrastructure::http_client::PageFetcher;

/// Serves canned pages by absolute URL. Unknown URLs answer 404.
#[derive(Default)]
pub struct FixtureFetcher {
    pages: HashMap<String, String>,
    // Served before the page, one per request, in order
    statuses: Mutex<HashMap<String, VecDeque<u16>>>,
    requests: Mutex<Vec<String>>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    pub fn with_statuses(self, url: &str, statuses: &[u16]) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .extend(statuses.iter().copied());
        self
    }

    /// Hold every response for `latency`, so overlapping requests are observable
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Every requested URL, in request order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    /// Highest number of requests that were in progress at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn respond(&self, url: &str) -> Result<String, FetchError> {
        let queued = self.statuses.lock().unwrap().get_mut(url).and_then(VecDeque::pop_front);
        if let Some(status) = queued {
            return Err(FetchError::Status { status, url: url.to_string() });
        }

        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status { status: 404, url: url.to_string() })
    }
}

#[async_trait]
impl PageFetcher for FixtureFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let result = self.respond(url);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// One `product-card` on a fixture collection page
#[derive(Debug, Clone)]
pub struct FixtureCard {
    name: String,
    href: String,
    price: Option<String>,
}

impl FixtureCard {
    pub fn new(name: &str, href: &str) -> Self {
        Self { name: name.to_string(), href: href.to_string(), price: None }
    }

    pub fn price(mut self, text: &str) -> Self {
        self.price = Some(text.to_string());
        self
    }
}

/// Collection page in the store's theme markup
pub fn listing_html(cards: &[FixtureCard], next_href: Option<&str>) -> String {
    let mut html = String::from("<html><body><main><div class=\"collection\">\n");

    for card in cards {
        html.push_str("<product-card class=\"card\">\n");
        html.push_str(&format!(
            "  <a class=\"card-link\" href=\"{}\">\n    {}\n  </a>\n",
            card.href, card.name
        ));
        if let Some(price) = &card.price {
            html.push_str(&format!(
                "  <div class=\"price\"><span class=\"price__current\">{price}</span></div>\n"
            ));
        }
        html.push_str("</product-card>\n");
    }

    html.push_str("</div>\n<nav class=\"pagination\">");
    if let Some(href) = next_href {
        html.push_str(&format!("<a class=\"pagination__arrow--next\" href=\"{href}\">Next</a>"));
    }
    html.push_str("</nav></main></body></html>");
    html
}

/// Product page whose description lists `features`
pub fn detail_html(features: &[&str]) -> String {
    let bullets: String = features.iter().map(|f| format!("<li>{f}</li>")).collect();
    format!(
        "<html><body><h1>Product</h1><div class=\"product-description\"><ul>{bullets}</ul></div>\
         <footer><ul><li>Free shipping over $100</li></ul></footer></body></html>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixture_fetcher_serves_statuses_then_page() {
        let fetcher = FixtureFetcher::new()
            .with_page("https://a.test/", "ok")
            .with_statuses("https://a.test/", &[500]);

        assert_eq!(fetcher.fetch_html("https://a.test/").await.unwrap_err().status(), Some(500));
        assert_eq!(fetcher.fetch_html("https://a.test/").await.unwrap(), "ok");
        assert_eq!(fetcher.fetch_html("https://a.test/missing").await.unwrap_err().status(), Some(404));
        assert_eq!(fetcher.requests().len(), 3);
        assert_eq!(fetcher.peak_in_flight(), 1);
    }
}
