//! HTML parsing for Shopify collection and product pages
//!
//! Trait-based parsers over `scraper::Html`. Selectors are compiled once
//! from `SelectorConfig`; every field is extracted with ordered fallbacks.

pub mod config;
pub mod context;
pub mod error;
pub mod price;
pub mod product_detail_parser;
pub mod product_list_parser;

pub use self::config::SelectorConfig;
pub use context::{DetailParseContext, ParseContext};
pub use error::{ParsingError, ParsingResult};
pub use price::parse_price;
pub use product_detail_parser::{ProductDetail, ProductDetailParser};
pub use product_list_parser::{ListingCard, ListingPage, ProductListParser};

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

/// Parser that needs information about where the page came from
pub trait ContextualParser {
    type Output;
    type Context;

    /// Parse an already loaded document
    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> Self::Output;

    /// Load `body` into a document and parse it.
    ///
    /// The document never outlives this call, so callers can hold the
    /// output across `.await` points.
    fn parse_body(&self, body: &str, context: &Self::Context) -> Self::Output {
        let html = Html::parse_document(body);
        self.parse_with_context(&html, context)
    }
}

/// Compile selector strings for one field.
///
/// Invalid entries are skipped with a warning; the field fails only when
/// nothing compiles.
pub(crate) fn compile_selectors(field: &str, selector_strings: &[String]) -> ParsingResult<Vec<Selector>> {
    let mut selectors = Vec::with_capacity(selector_strings.len());
    let mut errors = Vec::new();

    for selector_str in selector_strings {
        match Selector::parse(selector_str) {
            Ok(selector) => selectors.push(selector),
            Err(e) => {
                warn!("Failed to compile {} selector '{}': {}", field, selector_str, e);
                errors.push(format!("'{selector_str}': {e}"));
            }
        }
    }

    if selectors.is_empty() {
        return Err(ParsingError::invalid_selector(
            field,
            &selector_strings.join(", "),
            &if errors.is_empty() { "no selectors configured".to_string() } else { errors.join("; ") },
        ));
    }

    Ok(selectors)
}

/// Text content of an element with runs of whitespace collapsed.
///
/// Text nodes are concatenated as-is, so inline markup such as `<sup>`
/// does not introduce spaces of its own.
pub(crate) fn collapsed_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First element matched by any of `selectors`, tried in order
pub(crate) fn first_match<'a>(scope: &ElementRef<'a>, selectors: &[Selector]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|selector| scope.select(selector).next())
}
