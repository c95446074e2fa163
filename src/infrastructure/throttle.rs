//! Randomized politeness delay between requests

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Random pause in `min_ms..=max_ms`, applied after detail fetches and
/// before following a pagination link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoliteDelay {
    min_ms: u64,
    max_ms: u64,
}

impl PoliteDelay {
    /// Bounds are reordered if given backwards
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms: min_ms.min(max_ms), max_ms: min_ms.max(max_ms) }
    }

    pub fn none() -> Self {
        Self { min_ms: 0, max_ms: 0 }
    }

    pub fn is_none(&self) -> bool {
        self.max_ms == 0
    }

    pub fn sample(&self) -> Duration {
        if self.is_none() {
            return Duration::ZERO;
        }
        Duration::from_millis(fastrand::u64(self.min_ms..=self.max_ms))
    }

    pub async fn pause(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for PoliteDelay {
    fn default() -> Self {
        use crate::infrastructure::config::defaults;
        Self::new(defaults::DELAY_MIN_MS, defaults::DELAY_MAX_MS)
    }
}
