//! Configuration infrastructure
//!
//! Configuration is layered with the `config` crate:
//! 1. Built-in defaults (the `defaults` module, applied through serde)
//! 2. An optional config file (TOML/JSON/YAML, format picked by extension)
//! 3. Environment variables prefixed with `KBPP__`, e.g.
//!    `KBPP__SCRAPE__MAX_PAGES=3` or `KBPP__SCRAPE__CATEGORIES=switches,keycaps`

#![allow(clippy::uninlined_format_args)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::domain::CollectionMap;
use crate::infrastructure::http_client::HttpClientConfig;
use crate::infrastructure::parsing::{ProductDetailParser, ProductListParser, SelectorConfig};
use crate::infrastructure::retry::RetryPolicy;
use crate::infrastructure::throttle::PoliteDelay;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

impl ConfigError {
    fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Target site: base URL, collections and selectors
    pub site: SiteConfig,

    /// What to scrape and how politely
    pub scrape: ScrapeConfig,

    pub http: HttpClientConfig,

    pub retry: RetryPolicy,

    pub logging: LoggingConfig,
}

/// Everything specific to one target site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Identifier written into every item's `source` field
    pub source: String,

    /// Base URL relative links and collection paths are resolved against
    pub base_url: String,

    /// Category name → collection path
    pub collections: CollectionMap,

    pub selectors: SelectorConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            source: defaults::SOURCE.to_string(),
            base_url: defaults::BASE_URL.to_string(),
            collections: CollectionMap::divinikey(),
            selectors: SelectorConfig::default(),
        }
    }
}

impl SiteConfig {
    pub fn parsed_base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::validation(format!("site.base_url '{}': {}", self.base_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::validation(format!(
                "site.base_url must be http(s), got '{}'",
                self.base_url
            )));
        }
        Ok(url)
    }
}

/// What happens to a category when one product's detail page fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailFailurePolicy {
    /// Propagate the error and stop the run
    #[default]
    Abort,
    /// Log a warning and keep the item with no features
    Isolate,
}

/// Scrape run settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Categories to scrape, in order
    pub categories: Vec<String>,

    /// Listing pages fetched per category at most
    pub max_pages: u32,

    /// Output file; defaults to `output/<source>.json`
    pub output: Option<PathBuf>,

    /// Politeness delay bounds in milliseconds
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,

    /// Detail pages fetched concurrently (1 = strictly sequential)
    pub detail_concurrency: usize,

    pub detail_failure: DetailFailurePolicy,

    /// Drop repeated links, keeping the first occurrence
    pub dedup: bool,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            categories: defaults::CATEGORIES.iter().map(|c| (*c).to_string()).collect(),
            max_pages: defaults::MAX_PAGES,
            output: None,
            delay_min_ms: defaults::DELAY_MIN_MS,
            delay_max_ms: defaults::DELAY_MAX_MS,
            detail_concurrency: defaults::DETAIL_CONCURRENCY,
            detail_failure: DetailFailurePolicy::Abort,
            dedup: false,
        }
    }
}

impl ScrapeConfig {
    pub fn delay(&self) -> PoliteDelay {
        PoliteDelay::new(self.delay_min_ms, self.delay_max_ms)
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// JSON formatted file logs
    pub json_format: bool,

    pub console_output: bool,

    pub file_output: bool,

    /// Directory for log files; defaults to the platform data directory
    pub log_dir: Option<PathBuf>,

    /// Log file name prefix (files roll daily)
    pub file_name: String,

    /// Rolled log files kept on startup; 0 keeps everything
    pub max_files: usize,

    /// Per-target level overrides (e.g. "reqwest": "warn")
    pub module_filters: BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: false,
            console_output: true,
            file_output: false,
            log_dir: None,
            file_name: defaults::LOG_FILE_NAME.to_string(),
            max_files: defaults::LOG_MAX_FILES,
            module_filters: [
                ("reqwest", "warn"),
                ("hyper", "warn"),
                ("hyper_util", "warn"),
                ("h2", "warn"),
                ("html5ever", "error"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        }
    }
}

impl AppConfig {
    /// Load defaults, then `path` (or the per-user config file when present),
    /// then `KBPP__*` environment variables.
    ///
    /// The result is not validated here; callers apply their own overrides
    /// first and then call `validate`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        match path {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                builder = builder.add_source(config::File::from(path));
            }
            None => {
                if let Some(default_path) = Self::default_config_path() {
                    builder = builder.add_source(config::File::from(default_path).required(false));
                }
            }
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(defaults::ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("scrape.categories"),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// `<config dir>/kbpp-scraper/config.toml`
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(defaults::APP_DIR_NAME).join("config.toml"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.site.parsed_base_url()?;

        if self.site.source.trim().is_empty() {
            return Err(ConfigError::validation("site.source must not be empty"));
        }

        if self.site.collections.is_empty() {
            return Err(ConfigError::validation("site.collections must not be empty"));
        }

        ProductListParser::with_config(&self.site.selectors)
            .map_err(|e| ConfigError::validation(e.to_string()))?;
        ProductDetailParser::with_config(&self.site.selectors)
            .map_err(|e| ConfigError::validation(e.to_string()))?;

        if self.scrape.delay_min_ms > self.scrape.delay_max_ms {
            return Err(ConfigError::validation(format!(
                "scrape.delay_min_ms ({}) cannot be greater than scrape.delay_max_ms ({})",
                self.scrape.delay_min_ms, self.scrape.delay_max_ms
            )));
        }

        if self.scrape.detail_concurrency == 0 {
            return Err(ConfigError::validation("scrape.detail_concurrency must be greater than 0"));
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::validation("retry.max_attempts must be greater than 0"));
        }

        if !self.logging.console_output && !self.logging.file_output {
            return Err(ConfigError::validation("No logging output configured"));
        }

        Ok(())
    }

    /// Where the catalog is written
    pub fn output_path(&self) -> PathBuf {
        self.scrape.output.clone().unwrap_or_else(|| {
            PathBuf::from(defaults::OUTPUT_DIR).join(format!("{}.json", self.site.source))
        })
    }
}

/// Default configuration values
pub mod defaults {
    /// Environment variable prefix (`KBPP__SECTION__KEY`)
    pub const ENV_PREFIX: &str = "KBPP";

    /// Directory name under the platform config/data directories
    pub const APP_DIR_NAME: &str = "kbpp-scraper";

    pub const SOURCE: &str = "divinikey";
    pub const BASE_URL: &str = "https://divinikey.com";

    /// Categories scraped when none are given
    pub const CATEGORIES: &[&str] = &["switches", "keycaps", "cases", "pcbs", "plates", "stabilizers"];

    pub const MAX_PAGES: u32 = 10;
    pub const OUTPUT_DIR: &str = "output";

    pub const DELAY_MIN_MS: u64 = 200;
    pub const DELAY_MAX_MS: u64 = 400;
    pub const DETAIL_CONCURRENCY: usize = 3;

    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36";
    pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;
    /// 0 = no global cap, politeness comes from the per-request delay
    pub const MAX_REQUESTS_PER_SECOND: u32 = 0;

    pub const RETRY_MAX_ATTEMPTS: u32 = 3;
    pub const RETRY_BASE_DELAY_MS: u64 = 500;
    pub const RETRY_MAX_DELAY_MS: u64 = 10_000;
    pub const RETRY_BACKOFF_MULTIPLIER: f64 = 2.0;
    pub const RETRY_JITTER_MS: u64 = 250;

    pub const LOG_LEVEL: &str = "info";
    pub const LOG_FILE_NAME: &str = "kbpp-scraper.log";
    pub const LOG_MAX_FILES: usize = 7;
}
