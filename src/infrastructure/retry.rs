//! Retry strategy for page fetches
//!
//! Exponential backoff with jitter, applied only to transient failures
//! (`FetchError::is_retryable`). A policy with `max_attempts = 1` reproduces
//! fail-immediately behavior.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::FetchError;
use crate::infrastructure::config::defaults;
use crate::infrastructure::http_client::PageFetcher;

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before the first retry (milliseconds)
    pub base_delay_ms: u64,
    /// Upper bound for the exponential part (milliseconds)
    pub max_delay_ms: u64,
    /// Growth factor per attempt
    pub backoff_multiplier: f64,
    /// Random extra delay in `0..=jitter_range_ms`
    pub jitter_range_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: defaults::RETRY_MAX_ATTEMPTS,
            base_delay_ms: defaults::RETRY_BASE_DELAY_MS,
            max_delay_ms: defaults::RETRY_MAX_DELAY_MS,
            backoff_multiplier: defaults::RETRY_BACKOFF_MULTIPLIER,
            jitter_range_ms: defaults::RETRY_JITTER_MS,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, never retry
    pub fn none() -> Self {
        Self { max_attempts: 1, ..Self::default() }
    }

    /// Whether `error`, observed on 1-based `attempt`, deserves another try
    pub fn should_retry(&self, error: &FetchError, attempt: u32) -> bool {
        attempt < self.max_attempts.max(1) && error.is_retryable()
    }

    /// Exponential delay after a failed `attempt`, capped, without jitter
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let exponential = self.base_delay_ms as f64 * self.backoff_multiplier.max(1.0).powi(exponent);
        let capped = exponential.min(self.max_delay_ms as f64);
        Duration::from_millis(capped as u64)
    }

    /// Backoff plus random jitter
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let jitter = if self.jitter_range_ms == 0 {
            0
        } else {
            fastrand::u64(0..=self.jitter_range_ms)
        };
        self.backoff(attempt) + Duration::from_millis(jitter)
    }
}

/// Wraps a fetcher and retries transient failures according to a policy
pub struct RetryingFetcher<F> {
    inner: F,
    policy: RetryPolicy,
}

impl<F> RetryingFetcher<F> {
    pub fn new(inner: F, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }
}

#[async_trait]
impl<F: PageFetcher> PageFetcher for RetryingFetcher<F> {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt = 1;
        loop {
            match self.inner.fetch_html(url).await {
                Ok(body) => return Ok(body),
                Err(e) if self.policy.should_retry(&e, attempt) => {
                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        "🔄 Attempt {}/{} failed for {}: {} (retrying in {:?})",
                        attempt, self.policy.max_attempts, url, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
