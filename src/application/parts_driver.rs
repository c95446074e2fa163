//! Multi-category driver

use tracing::info;

use crate::domain::{CatalogItem, dedup_by_link};
use crate::error::ScraperResult;

use super::catalog_lister::{CatalogLister, ListOptions};

/// Runs the catalog lister once per category, in order, concatenating results
pub struct PartsDriver {
    lister: CatalogLister,
    dedup: bool,
}

impl PartsDriver {
    pub fn new(lister: CatalogLister) -> Self {
        Self { lister, dedup: false }
    }

    /// Drop repeated links across categories, keeping the first occurrence
    pub fn with_dedup(mut self, dedup: bool) -> Self {
        self.dedup = dedup;
        self
    }

    pub fn lister(&self) -> &CatalogLister {
        &self.lister
    }

    /// Every category name is checked before the first request, so one bad
    /// name fails the run without touching the network.
    pub async fn list_parts(&self, categories: &[String], options: &ListOptions) -> ScraperResult<Vec<CatalogItem>> {
        for category in categories {
            self.lister.collections().resolve(category)?;
        }

        let mut all_items = Vec::new();
        for category in categories {
            let items = self.lister.list_category(category, options).await?;
            info!("{}: {} items", category, items.len());
            all_items.extend(items);
        }

        if self.dedup {
            let before = all_items.len();
            all_items = dedup_by_link(all_items);
            if all_items.len() < before {
                info!("Removed {} duplicate links", before - all_items.len());
            }
        }

        Ok(all_items)
    }
}
