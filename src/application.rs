//! Application layer
//!
//! Orchestrates fetching, parsing and persistence into the scraping
//! pipeline: per-category listing, multi-category driving, and the
//! end-to-end scrape job used by the binary.

pub mod catalog_lister;
pub mod parts_driver;
pub mod scrape_job;

pub use catalog_lister::{CatalogLister, DetailFailurePolicy, ListOptions};
pub use parts_driver::PartsDriver;
pub use scrape_job::{ScrapeJob, ScrapeSummary};
