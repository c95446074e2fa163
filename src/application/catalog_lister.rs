//! Per-category catalog listing
//!
//! Two stages per category:
//! 1. **List**: walk the collection's listing pages sequentially, following
//!    "next page" links up to `max_pages`, turning product cards into items.
//! 2. **Enrich**: fetch every item's detail page on a bounded worker pool
//!    and attach its feature bullets. Output keeps card order.

#![allow(clippy::uninlined_format_args)]

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::{CatalogItem, CollectionMap};
use crate::error::{ScraperError, ScraperResult};
use crate::infrastructure::config::{ScrapeConfig, SiteConfig};
use crate::infrastructure::http_client::PageFetcher;
use crate::infrastructure::parsing::{
    ContextualParser, DetailParseContext, ParseContext, ParsingError, ProductDetailParser, ProductListParser,
};
use crate::infrastructure::throttle::PoliteDelay;

pub use crate::infrastructure::config::DetailFailurePolicy;

/// Per-run listing options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Listing pages fetched per category at most; 0 fetches nothing
    pub max_pages: u32,
    /// Detail pages in flight at once
    pub detail_concurrency: usize,
    /// Pause after each detail fetch and before following a next link
    pub delay: PoliteDelay,
    pub detail_failure: DetailFailurePolicy,
}

impl From<&ScrapeConfig> for ListOptions {
    fn from(config: &ScrapeConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            detail_concurrency: config.detail_concurrency,
            delay: config.delay(),
            detail_failure: config.detail_failure,
        }
    }
}

impl Default for ListOptions {
    fn default() -> Self {
        Self::from(&ScrapeConfig::default())
    }
}

/// Lists one category of one site into `CatalogItem`s
pub struct CatalogLister {
    fetcher: Arc<dyn PageFetcher>,
    list_parser: ProductListParser,
    detail_parser: Arc<ProductDetailParser>,
    collections: CollectionMap,
    base_url: Url,
    source: String,
    cancel: CancellationToken,
}

impl CatalogLister {
    pub fn new(site: &SiteConfig, fetcher: Arc<dyn PageFetcher>) -> ScraperResult<Self> {
        let base_url = Url::parse(&site.base_url)
            .map_err(|e| ParsingError::url_resolution_failed(&site.base_url, e, None))?;

        Ok(Self {
            fetcher,
            list_parser: ProductListParser::with_config(&site.selectors)?,
            detail_parser: Arc::new(ProductDetailParser::with_config(&site.selectors)?),
            collections: site.collections.clone(),
            base_url,
            source: site.source.clone(),
            cancel: CancellationToken::new(),
        })
    }

    /// Stop at the next listing or detail fetch once `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn collections(&self) -> &CollectionMap {
        &self.collections
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Absolute URL of a category's first listing page
    pub fn category_url(&self, category: &str) -> ScraperResult<Url> {
        let path = self.collections.resolve(category)?;
        self.base_url
            .join(path)
            .map_err(|e| ParsingError::url_resolution_failed(path, e, Some(self.base_url.as_str())).into())
    }

    /// List every product of `category`, enriched with detail features
    pub async fn list_category(&self, category: &str, options: &ListOptions) -> ScraperResult<Vec<CatalogItem>> {
        let first_page = self.category_url(category)?;

        let listed = self.list_pages(category, first_page, options).await?;
        info!("📋 {}: {} products listed, fetching details", category, listed.len());

        self.enrich(listed, options).await
    }

    async fn list_pages(&self, category: &str, first_page: Url, options: &ListOptions) -> ScraperResult<Vec<CatalogItem>> {
        let mut items = Vec::new();
        let mut next = Some(first_page);
        let mut page = 0;

        while let Some(page_url) = next.take() {
            if page >= options.max_pages {
                debug!("{}: stopping at max_pages ({})", category, options.max_pages);
                break;
            }
            if self.cancel.is_cancelled() {
                return Err(ScraperError::Cancelled);
            }
            page += 1;

            let body = self.fetcher.fetch_html(page_url.as_str()).await?;
            let context = ParseContext::new(page, page_url.clone(), self.base_url.clone());
            let listing = self.list_parser.parse_body(&body, &context);

            let before = items.len();
            for card in listing.cards {
                match (card.name, card.link) {
                    (Some(name), Some(link)) => {
                        items.push(CatalogItem::listed(name, link.to_string(), card.price, category, &self.source));
                    }
                    (name, _) => {
                        warn!(
                            "Skipping card without {} on {}",
                            if name.is_none() { "name" } else { "link" },
                            page_url
                        );
                    }
                }
            }
            info!("📄 {} page {}: {} items", category, page, items.len() - before);

            next = listing.next_page;
            if next.is_some() && page < options.max_pages {
                pause_or_cancel(options.delay, &self.cancel).await?;
            }
        }

        Ok(items)
    }

    async fn enrich(&self, items: Vec<CatalogItem>, options: &ListOptions) -> ScraperResult<Vec<CatalogItem>> {
        if items.is_empty() {
            return Ok(items);
        }

        let semaphore = Arc::new(Semaphore::new(options.detail_concurrency.max(1)));
        // Cancelled by the first aborting failure; never propagates upwards
        let stage_cancel = self.cancel.child_token();

        let mut tasks = Vec::with_capacity(items.len());
        for item in items {
            let semaphore = Arc::clone(&semaphore);
            let fetcher = Arc::clone(&self.fetcher);
            let parser = Arc::clone(&self.detail_parser);
            let cancel = stage_cancel.clone();
            let options = *options;

            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.map_err(|_| ScraperError::Cancelled)?;
                if cancel.is_cancelled() {
                    return Err(ScraperError::Cancelled);
                }

                let fetched = fetch_features(fetcher.as_ref(), &parser, &item.link).await;
                let item = match fetched {
                    Ok(features) => item.with_features(features),
                    Err(e) if options.detail_failure == DetailFailurePolicy::Isolate => {
                        warn!("⚠️ Keeping {} without features: {}", item.link, e);
                        item
                    }
                    Err(e) => {
                        cancel.cancel();
                        return Err(e);
                    }
                };

                pause_or_cancel(options.delay, &cancel).await?;
                Ok::<_, ScraperError>(item)
            }));
        }

        let mut enriched = Vec::with_capacity(tasks.len());
        let mut failure: Option<ScraperError> = None;

        for result in join_all(tasks).await {
            let error = match result {
                Ok(Ok(item)) => {
                    enriched.push(item);
                    continue;
                }
                Ok(Err(e)) => e,
                Err(join_error) => ScraperError::Task(join_error),
            };

            // The failure that triggered the abort wins over the cancellations it caused
            match &failure {
                None => failure = Some(error),
                Some(current) if current.is_cancelled() && !error.is_cancelled() => failure = Some(error),
                Some(_) => {}
            }
        }

        match failure {
            Some(error) => Err(error),
            None => Ok(enriched),
        }
    }
}

async fn fetch_features(
    fetcher: &dyn PageFetcher,
    parser: &ProductDetailParser,
    link: &str,
) -> ScraperResult<Vec<String>> {
    let body = fetcher.fetch_html(link).await?;
    let detail = parser.parse_body(&body, &DetailParseContext::new(link));
    debug!("🔍 {}: {} features", link, detail.features.len());
    Ok(detail.features)
}

async fn pause_or_cancel(delay: PoliteDelay, cancel: &CancellationToken) -> ScraperResult<()> {
    tokio::select! {
        () = cancel.cancelled() => Err(ScraperError::Cancelled),
        () = delay.pause() => Ok(()),
    }
}
