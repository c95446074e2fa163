//! CSS selector configuration for listing and detail pages
//!
//! Shopify themes vary, so every field takes an ordered list of selectors.
//! Defaults match the theme used by divinikey.com.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Product card containers on a collection page
    pub product_card: Vec<String>,

    /// Anchor inside a card carrying the product name and detail link
    pub card_link: Vec<String>,

    /// Price nodes inside a card, in priority order
    pub price: Vec<String>,

    /// "Next page" pagination link on a collection page
    pub next_page: Vec<String>,

    /// Feature bullets on a product detail page
    pub features: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            product_card: vec!["product-card".to_string()],
            card_link: vec!["a.card-link".to_string()],
            price: vec![
                ".price__current".to_string(),
                ".price .money".to_string(),
                ".price-item".to_string(),
                ".price__regular .price-item--regular".to_string(),
            ],
            next_page: vec!["a.pagination__arrow--next".to_string()],
            features: vec![".product-description li".to_string()],
        }
    }
}
