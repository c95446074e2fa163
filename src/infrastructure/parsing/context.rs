//! Parsing context for listing and detail pages

use url::Url;

/// Where a listing page came from
#[derive(Debug, Clone)]
pub struct ParseContext {
    /// 1-based page number within the collection
    pub page: u32,

    /// URL the page was fetched from
    pub page_url: Url,

    /// Base URL for resolving relative links
    pub base_url: Url,
}

impl ParseContext {
    pub fn new(page: u32, page_url: Url, base_url: Url) -> Self {
        Self { page, page_url, base_url }
    }
}

/// Where a product detail page came from
#[derive(Debug, Clone)]
pub struct DetailParseContext {
    /// Product URL being parsed
    pub url: String,
}

impl DetailParseContext {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}
