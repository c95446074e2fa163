//! Product list parser for Shopify collection pages
//!
//! Extracts one `ListingCard` per product card plus the "next page" link.
//! Missing nodes degrade to `None` instead of failing the page.

#![allow(clippy::uninlined_format_args)]

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use super::{
    ContextualParser, ParseContext, ParsingError, ParsingResult, SelectorConfig, collapsed_text,
    compile_selectors, first_match, parse_price,
};

/// Product summary as found on a collection page
#[derive(Debug, Clone, PartialEq)]
pub struct ListingCard {
    pub name: Option<String>,
    pub link: Option<Url>,
    pub price: Option<f64>,
}

/// Everything extracted from one collection page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingPage {
    pub cards: Vec<ListingCard>,
    pub next_page: Option<Url>,
}

/// Parser for extracting product cards from listing pages
pub struct ProductListParser {
    card_selectors: Vec<Selector>,
    link_selectors: Vec<Selector>,
    price_selectors: Vec<Selector>,
    next_page_selectors: Vec<Selector>,
}

impl ProductListParser {
    /// Parser with the default Shopify theme selectors
    pub fn new() -> ParsingResult<Self> {
        Self::with_config(&SelectorConfig::default())
    }

    /// Parser with custom selector configuration
    pub fn with_config(selectors: &SelectorConfig) -> ParsingResult<Self> {
        Ok(Self {
            card_selectors: compile_selectors("product_card", &selectors.product_card)?,
            link_selectors: compile_selectors("card_link", &selectors.card_link)?,
            price_selectors: compile_selectors("price", &selectors.price)?,
            next_page_selectors: compile_selectors("next_page", &selectors.next_page)?,
        })
    }

    fn parse_card(&self, card: &ElementRef<'_>, base_url: &Url) -> ListingCard {
        let anchor = first_match(card, &self.link_selectors);

        let name = anchor.map(|a| collapsed_text(&a)).filter(|text| !text.is_empty());
        let link = anchor
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| match resolve_url(href, base_url) {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!("Dropping card link: {}", e);
                    None
                }
            });

        ListingCard { name, link, price: self.read_price(card) }
    }

    /// Read a card's price from the first price node with any text.
    ///
    /// Selectors are tried in priority order; the chosen text is parsed once,
    /// so a non-numeric or whitespace-only label yields `None` without trying
    /// later selectors. Only nodes with no text at all are passed over.
    pub fn read_price(&self, card: &ElementRef<'_>) -> Option<f64> {
        let text = self
            .price_selectors
            .iter()
            .filter_map(|selector| card.select(selector).next())
            .map(|node| node.text().collect::<String>())
            .find(|text| !text.is_empty())?;

        parse_price(&text)
    }

    /// Absolute URL of the next collection page, if the page links one
    pub fn next_page(&self, html: &Html, base_url: &Url) -> Option<Url> {
        let root = html.root_element();
        let href = self
            .next_page_selectors
            .iter()
            .filter_map(|selector| root.select(selector).next())
            .find_map(|link| link.value().attr("href"))?;

        match resolve_url(href, base_url) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("Ignoring pagination link: {}", e);
                None
            }
        }
    }
}

impl ContextualParser for ProductListParser {
    type Output = ListingPage;
    type Context = ParseContext;

    fn parse_with_context(&self, html: &Html, context: &Self::Context) -> Self::Output {
        debug!("Parsing product list for page {} ({})", context.page, context.page_url);

        // First container selector that matches anything wins
        let card_elements: Vec<ElementRef<'_>> = self
            .card_selectors
            .iter()
            .map(|selector| html.select(selector).collect::<Vec<_>>())
            .find(|elements| !elements.is_empty())
            .unwrap_or_default();

        let cards: Vec<ListingCard> = card_elements
            .iter()
            .map(|card| self.parse_card(card, &context.base_url))
            .collect();

        if cards.is_empty() {
            warn!("No product cards found on page {} ({})", context.page, context.page_url);
        } else {
            let priced = cards.iter().filter(|c| c.price.is_some()).count();
            debug!(
                "Found {} product cards on page {} ({} with price)",
                cards.len(),
                context.page,
                priced
            );
        }

        ListingPage {
            cards,
            next_page: self.next_page(html, &context.base_url),
        }
    }
}

/// Resolve an href against the site base URL, accepting only http(s) targets
fn resolve_url(href: &str, base_url: &Url) -> ParsingResult<Url> {
    let resolved = base_url
        .join(href.trim())
        .map_err(|e| ParsingError::url_resolution_failed(href, e, Some(base_url.as_str())))?;

    match resolved.scheme() {
        "http" | "https" => Ok(resolved),
        other => Err(ParsingError::url_resolution_failed(
            href,
            format!("unsupported scheme '{other}'"),
            Some(base_url.as_str()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{listing_html, FixtureCard};

    fn context() -> ParseContext {
        let base = Url::parse("https://divinikey.com").unwrap();
        ParseContext::new(1, base.join("/collections/switches").unwrap(), base)
    }

    #[test]
    fn test_parser_creation() {
        assert!(ProductListParser::new().is_ok());
    }

    #[test]
    fn test_extracts_cards_and_prices() {
        let parser = ProductListParser::new().unwrap();
        let html = listing_html(
            &[
                FixtureCard::new("Gateron Oil King", "/products/gateron-oil-king").price("$12.50"),
                FixtureCard::new("GMK Olivia", "/products/gmk-olivia").price("1,250"),
                FixtureCard::new("Durock V2 Stabilizers", "/products/durock-v2"),
            ],
            None,
        );

        let page = parser.parse_body(&html, &context());

        assert_eq!(page.cards.len(), 3);
        assert_eq!(page.cards[0].name.as_deref(), Some("Gateron Oil King"));
        assert_eq!(
            page.cards[0].link.as_ref().map(Url::as_str),
            Some("https://divinikey.com/products/gateron-oil-king")
        );
        assert_eq!(page.cards[0].price, Some(12.5));
        assert_eq!(page.cards[1].price, Some(1250.0));
        assert_eq!(page.cards[2].price, None);
        assert!(page.next_page.is_none());
    }

    #[test]
    fn test_price_selector_priority() {
        let parser = ProductListParser::new().unwrap();
        let html = r#"<html><body>
            <product-card>
              <a class="card-link" href="/products/kit">Kit</a>
              <div class="price__regular"><span class="price-item--regular">$300.00</span></div>
              <span class="price-item">$250.00</span>
              <span class="price__current">  </span>
            </product-card>
        </body></html>"#;

        let page = parser.parse_body(html, &context());
        // whitespace-only .price__current still wins and yields no price
        assert_eq!(page.cards[0].price, None);
    }

    #[test]
    fn test_empty_price_node_falls_through() {
        let parser = ProductListParser::new().unwrap();
        let html = r#"<html><body>
            <product-card>
              <a class="card-link" href="/products/kit">Kit</a>
              <div class="price__regular"><span class="price-item--regular">$300.00</span></div>
              <span class="price-item">$250.00</span>
              <span class="price__current"></span>
            </product-card>
        </body></html>"#;

        let page = parser.parse_body(html, &context());
        // empty .price__current is skipped, .price-item outranks .price__regular
        assert_eq!(page.cards[0].price, Some(250.0));
    }

    #[test]
    fn test_name_keeps_inline_markup_glued() {
        let parser = ProductListParser::new().unwrap();
        let html = r#"<html><body>
            <product-card>
              <a class="card-link" href="/products/oil-king">Gateron<sup>®</sup> Oil King</a>
            </product-card>
        </body></html>"#;

        let page = parser.parse_body(html, &context());
        assert_eq!(page.cards[0].name.as_deref(), Some("Gateron® Oil King"));
    }

    #[test]
    fn test_resolves_next_page_link() {
        let parser = ProductListParser::new().unwrap();
        let html = listing_html(
            &[FixtureCard::new("Kailh Box Jade", "/products/box-jade")],
            Some("/collections/switches?page=2"),
        );

        let page = parser.parse_body(&html, &context());
        assert_eq!(
            page.next_page.as_ref().map(Url::as_str),
            Some("https://divinikey.com/collections/switches?page=2")
        );
    }

    #[test]
    fn test_card_without_anchor_degrades_to_none() {
        let parser = ProductListParser::new().unwrap();
        let html = r#"<product-card><span class="price-item">$5</span></product-card>"#;

        let page = parser.parse_body(html, &context());
        assert_eq!(page.cards.len(), 1);
        assert_eq!(page.cards[0].name, None);
        assert_eq!(page.cards[0].link, None);
        assert_eq!(page.cards[0].price, Some(5.0));
    }

    #[test]
    fn test_fallback_card_selector() {
        let selectors = SelectorConfig {
            product_card: vec!["product-card".into(), "div.product-item".into()],
            ..SelectorConfig::default()
        };
        let parser = ProductListParser::with_config(&selectors).unwrap();
        let html = r#"<div class="product-item"><a class="card-link" href="/products/a">A</a></div>"#;

        let page = parser.parse_body(html, &context());
        assert_eq!(page.cards.len(), 1);
        assert_eq!(page.cards[0].name.as_deref(), Some("A"));
    }

    #[test]
    fn test_url_resolution() {
        let base = Url::parse("https://divinikey.com").unwrap();

        assert_eq!(
            resolve_url("/products/123", &base).unwrap().as_str(),
            "https://divinikey.com/products/123"
        );
        assert_eq!(
            resolve_url("https://other.com/test", &base).unwrap().as_str(),
            "https://other.com/test"
        );
        assert_eq!(
            resolve_url("//cdn.shopify.com/p.png", &base).unwrap().as_str(),
            "https://cdn.shopify.com/p.png"
        );
        assert!(resolve_url("javascript:void(0)", &base).is_err());
    }
}
