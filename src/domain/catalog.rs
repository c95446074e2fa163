use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// One scraped product record, written as an element of the output JSON array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Display name taken from the product card's anchor text
    pub name: String,
    /// Absolute URL of the product detail page
    pub link: String,
    /// Parsed price, `null` when the card carries no recognizable price node
    pub price: Option<f64>,
    /// Logical category the item was listed under (e.g. "switches")
    pub category: String,
    /// Site identifier (e.g. "divinikey")
    pub source: String,
    /// Feature bullets scraped from the detail page
    pub features: Vec<String>,
}

impl CatalogItem {
    /// Item as seen on a listing page, before detail enrichment
    pub fn listed(
        name: String,
        link: String,
        price: Option<f64>,
        category: &str,
        source: &str,
    ) -> Self {
        Self {
            name,
            link,
            price,
            category: category.to_string(),
            source: source.to_string(),
            features: Vec::new(),
        }
    }

    pub fn with_features(mut self, features: Vec<String>) -> Self {
        self.features = features;
        self
    }
}

/// Keep the first occurrence of every link, preserving order
pub fn dedup_by_link(items: Vec<CatalogItem>) -> Vec<CatalogItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.link.clone()))
        .collect()
}
