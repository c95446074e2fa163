//! HTTP client for page fetching with optional rate limiting
//!
//! `PageFetcher` is the seam between the pipeline and the network; the
//! reqwest-backed `HttpClient` is the production implementation.

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use governor::{Quota, RateLimiter, clock::DefaultClock, state::{InMemoryState, direct::NotKeyed}};
use reqwest::{Client, header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT}};
use scraper::Html;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::FetchError;
use crate::infrastructure::config::defaults;

/// Something that can turn an absolute URL into an HTML body
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET `url` and return the body. Any status >= 400 is an error.
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError>;
}

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Desktop browser user agent, avoids trivial bot blocks
    pub user_agent: String,
    pub accept_language: String,
    /// Request timeout; 0 disables the timeout
    pub timeout_seconds: u64,
    /// Global request cap; 0 disables rate limiting
    pub max_requests_per_second: u32,
    /// Route every request through this proxy (e.g. a scraping proxy service)
    pub proxy: Option<String>,
    /// Honor HTTP(S)_PROXY environment variables when no proxy is set
    pub use_system_proxy: bool,
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::USER_AGENT.to_string(),
            accept_language: defaults::ACCEPT_LANGUAGE.to_string(),
            timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            max_requests_per_second: defaults::MAX_REQUESTS_PER_SECOND,
            proxy: None,
            use_system_proxy: true,
            follow_redirects: true,
        }
    }
}

/// reqwest-backed fetcher with browser-like headers
pub struct HttpClient {
    client: Client,
    rate_limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid user agent")?,
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language).context("Invalid accept-language")?,
        );

        let mut builder = Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            });

        if config.timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_seconds));
        }

        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(
                reqwest::Proxy::all(proxy).with_context(|| format!("Invalid proxy URL: {proxy}"))?,
            );
        } else if !config.use_system_proxy {
            builder = builder.no_proxy();
        }

        let client = builder.build().context("Failed to create HTTP client")?;

        let rate_limiter = NonZeroU32::new(config.max_requests_per_second)
            .map(|rps| RateLimiter::direct(Quota::per_second(rps)));

        Ok(Self { client, rate_limiter, config })
    }

    /// Fetch a page and load it into a queryable document
    pub async fn fetch_document(&self, url: &str) -> Result<Html, FetchError> {
        let body = self.fetch_html(url).await?;
        Ok(Html::parse_document(&body))
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        info!("Fetching --> {}", url);

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|source| FetchError::Network { url: url.to_string(), source })?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(FetchError::Status { status: status.as_u16(), url: url.to_string() });
        }

        let text = response
            .text()
            .await
            .map_err(|source| FetchError::Body { url: url.to_string(), source })?;

        debug!("Fetched {} ({}, {} chars)", url, status, text.len());
        Ok(text)
    }
}
