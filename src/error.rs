//! Error types for the scraping pipeline
//!
//! `FetchError` covers a single page request, `ScraperError` is what the
//! catalog lister, parts driver and persistence helper surface to callers.

use std::path::PathBuf;
use thiserror::Error;

use crate::infrastructure::parsing::ParsingError;

/// Failure of a single page fetch
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP {status} fetching {url}")]
    Status { status: u16, url: String },

    #[error("Request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl FetchError {
    /// HTTP status carried by the error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Network { source, .. } | Self::Body { source, .. } => {
                source.status().map(|s| s.as_u16())
            }
            Self::InvalidUrl { .. } => None,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. }
            | Self::Network { url, .. }
            | Self::Body { url, .. }
            | Self::InvalidUrl { url, .. } => url,
        }
    }

    /// Transient failures worth another attempt: 5xx, 429 and transport errors.
    /// Other 4xx answers are final.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::Network { .. } | Self::Body { .. } => true,
            Self::InvalidUrl { .. } => false,
        }
    }
}

/// Errors surfaced by the catalog lister, the parts driver and storage
#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("Unknown category: {category} (known: {})", .known.join(", "))]
    UnknownCategory { category: String, known: Vec<String> },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parsing(#[from] ParsingError),

    #[error("Failed to write {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to (de)serialize catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Scrape cancelled")]
    Cancelled,

    #[error("Detail worker failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ScraperError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

pub type ScraperResult<T> = Result<T, ScraperError>;
