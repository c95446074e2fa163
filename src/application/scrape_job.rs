//! End-to-end scrape run: fetch → list → enrich → save

#![allow(clippy::uninlined_format_args)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http_client::{HttpClient, PageFetcher};
use crate::infrastructure::retry::RetryingFetcher;
use crate::infrastructure::storage::save_json;

use super::catalog_lister::{CatalogLister, ListOptions};
use super::parts_driver::PartsDriver;

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub items: usize,
    pub categories: Vec<String>,
    pub output: PathBuf,
    pub elapsed: Duration,
}

/// One configured scrape. Nothing is written unless every category succeeds.
pub struct ScrapeJob {
    config: AppConfig,
    cancel: CancellationToken,
}

impl ScrapeJob {
    pub fn new(config: AppConfig) -> Self {
        Self { config, cancel: CancellationToken::new() }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// reqwest client wrapped in the configured retry policy
    pub fn build_fetcher(&self) -> Result<Arc<dyn PageFetcher>> {
        let client = HttpClient::new(self.config.http.clone()).context("Failed to build HTTP client")?;
        Ok(Arc::new(RetryingFetcher::new(client, self.config.retry.clone())))
    }

    pub async fn run(&self) -> Result<ScrapeSummary> {
        let fetcher = self.build_fetcher()?;
        self.run_with(fetcher).await
    }

    /// Run against any fetcher. Library errors come back as `ScraperError`
    /// inside the `anyhow::Error`, so callers can still spot cancellation.
    pub async fn run_with(&self, fetcher: Arc<dyn PageFetcher>) -> Result<ScrapeSummary> {
        let started = Instant::now();
        let scrape = &self.config.scrape;

        info!(
            "🚀 Scraping {} categories from {} (max {} pages each)",
            scrape.categories.len(),
            self.config.site.base_url,
            scrape.max_pages
        );

        let lister = CatalogLister::new(&self.config.site, fetcher)?.with_cancellation(self.cancel.clone());
        let driver = PartsDriver::new(lister).with_dedup(scrape.dedup);

        let items = driver.list_parts(&scrape.categories, &ListOptions::from(scrape)).await?;

        let output = self.config.output_path();
        save_json(&output, &items).await?;

        let summary = ScrapeSummary {
            items: items.len(),
            categories: scrape.categories.clone(),
            output,
            elapsed: started.elapsed(),
        };
        info!(
            "✅ Scraped {} items in {:.1}s → {}",
            summary.items,
            summary.elapsed.as_secs_f64(),
            summary.output.display()
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CatalogItem;
    use crate::error::ScraperError;
    use crate::infrastructure::storage::load_json;
    use crate::test_utils::{FixtureCard, FixtureFetcher, detail_html, listing_html};

    fn config(output: PathBuf) -> AppConfig {
        let mut config = AppConfig::default();
        config.scrape.categories = vec!["keycaps".to_string()];
        config.scrape.output = Some(output);
        config.scrape.delay_min_ms = 0;
        config.scrape.delay_max_ms = 0;
        config
    }

    fn keycap_shop() -> Arc<FixtureFetcher> {
        Arc::new(
            FixtureFetcher::new()
                .with_page(
                    "https://divinikey.com/collections/new-keycaps",
                    listing_html(&[FixtureCard::new("GMK Olivia", "/products/gmk-olivia").price("$139.00")], None),
                )
                .with_page("https://divinikey.com/products/gmk-olivia", detail_html(&["Cherry profile", "ABS"])),
        )
    }

    #[tokio::test]
    async fn test_run_writes_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested").join("divinikey.json");
        let job = ScrapeJob::new(config(output.clone()));

        let summary = job.run_with(keycap_shop()).await.unwrap();
        assert_eq!(summary.items, 1);
        assert_eq!(summary.output, output);

        let saved: Vec<CatalogItem> = load_json(&output).await.unwrap();
        assert_eq!(saved[0].name, "GMK Olivia");
        assert_eq!(saved[0].price, Some(139.0));
        assert_eq!(saved[0].category, "keycaps");
        assert_eq!(saved[0].features, vec!["Cherry profile", "ABS"]);
    }

    #[tokio::test]
    async fn test_failed_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("divinikey.json");
        let mut config = config(output.clone());
        config.scrape.categories.push("switches".to_string());

        // switches collection is missing from the fixture, so its listing 404s
        let err = ScrapeJob::new(config).run_with(keycap_shop()).await.unwrap_err();

        let scraper_error = err.downcast_ref::<ScraperError>().unwrap();
        assert!(matches!(scraper_error, ScraperError::Fetch(e) if e.status() == Some(404)));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_cancelled_run_is_recognizable() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let job = ScrapeJob::new(config(dir.path().join("out.json"))).with_cancellation(cancel);
        let err = job.run_with(keycap_shop()).await.unwrap_err();

        assert!(err.downcast_ref::<ScraperError>().is_some_and(ScraperError::is_cancelled));
    }

    #[tokio::test]
    async fn test_builds_production_fetcher() {
        let job = ScrapeJob::new(AppConfig::default());
        assert!(job.build_fetcher().is_ok());
    }
}
