//! Infrastructure layer: HTTP access, HTML parsing, persistence and process setup

pub mod config;  // Layered configuration and defaults
pub mod http_client;
pub mod logging;
pub mod parsing;  // Listing and detail page parsers
pub mod retry;
pub mod storage;
pub mod throttle;  // Politeness delay between requests

pub use self::config::{AppConfig, ConfigError, DetailFailurePolicy, LoggingConfig, ScrapeConfig, SiteConfig};
pub use http_client::{HttpClient, HttpClientConfig, PageFetcher};
pub use logging::{get_log_directory, init_logging, log_system_info};
pub use parsing::{
    ContextualParser, ListingCard, ListingPage, ProductDetail, ProductDetailParser, ProductListParser,
    SelectorConfig,
};
pub use retry::{RetryPolicy, RetryingFetcher};
pub use storage::{load_json, save_json};
pub use throttle::PoliteDelay;
