//! Product detail parser
//!
//! Detail pages are only scraped for their feature bullets.

use scraper::{Html, Selector};
use tracing::debug;

use super::{ContextualParser, DetailParseContext, ParsingResult, SelectorConfig, compile_selectors};

/// Data extracted from a product detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductDetail {
    pub features: Vec<String>,
}

pub struct ProductDetailParser {
    feature_selectors: Vec<Selector>,
}

impl ProductDetailParser {
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&SelectorConfig::default())
    }

    pub fn with_config(selectors: &SelectorConfig) -> ParsingResult<Self> {
        Ok(Self {
            feature_selectors: compile_selectors("features", &selectors.features)?,
        })
    }
}

impl ContextualParser for ProductDetailParser {
    type Output = ProductDetail;
    type Context = DetailParseContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> Self::Output {
        // First selector yielding any bullet wins; blank bullets are dropped
        let features = self
            .feature_selectors
            .iter()
            .map(|selector| {
                html.select(selector)
                    .map(|li| li.text().collect::<String>().trim().to_string())
                    .filter(|text| !text.is_empty())
                    .collect::<Vec<_>>()
            })
            .find(|features| !features.is_empty())
            .unwrap_or_default();

        if features.is_empty() {
            debug!("No feature bullets on {}", context.url);
        }

        ProductDetail { features }
    }
}
