//! kbpp-scraper - keyboard parts catalog scraper
//!
//! Walks a Shopify store's collection pages, reads product cards and detail
//! pages, and writes the resulting catalog as a JSON array.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;

#[cfg(test)]
mod test_utils;

pub use application::{CatalogLister, ListOptions, PartsDriver, ScrapeJob, ScrapeSummary};
pub use domain::{CatalogItem, CollectionMap};
pub use error::{FetchError, ScraperError, ScraperResult};
pub use infrastructure::{AppConfig, HttpClient, PageFetcher};
