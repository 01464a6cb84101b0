//! Fetcher configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::bucket::DEFAULT_BUCKET_STEP;

/// Tunables for bucketing, caching and retrying upstream requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Bucket size in degrees.
    pub bucket_step: f64,
    /// Seconds a cached sample stays fresh.
    pub ttl_secs: u64,
    /// Upstream attempts per bucket before falling back.
    pub max_retries: u32,
    /// Delay before the second attempt; doubles on each further attempt.
    pub base_delay_ms: u64,
    /// HTTP request timeout.
    pub request_timeout_secs: u64,
    /// Buckets resolved in parallel by one batch.
    pub max_concurrent_fetches: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            bucket_step: DEFAULT_BUCKET_STEP,
            ttl_secs: 300,
            max_retries: 3,
            base_delay_ms: 250,
            request_timeout_secs: 10,
            max_concurrent_fetches: 16,
        }
    }
}

impl FetchConfig {
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.ttl_secs as i64)
    }

    /// Wait after the failed attempt `attempt` (0-based): `base * 2^attempt`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
