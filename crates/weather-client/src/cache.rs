//! In-memory cache of weather samples keyed by bucket.
//!
//! The cache is a plain key/value store: it knows about insertion time and
//! freshness, but nothing about upstream requests or retries.
//!
//! ## Lifecycle
//! - Created once per process and shared (`Clone` shares the same map).
//! - An entry is fresh while `now - inserted_at < ttl` and stale afterwards.
//! - Stale entries are kept as a fallback for failed refreshes and are only
//!   ever replaced, never evicted. Memory is bounded by the bucket key space
//!   a process actually touches.

use chrono::{DateTime, Duration, Utc};
use nowcast_common::WeatherSample;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::bucket::BucketKey;

/// Cached sample with its insertion time.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub sample: WeatherSample,
    pub inserted_at: DateTime<Utc>,
}

impl CacheEntry {
    /// True while `now - inserted_at < ttl`.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.inserted_at < ttl
    }
}

/// Statistics for the weather cache.
#[derive(Default)]
pub struct WeatherCacheStats {
    /// Lookups answered by a fresh entry.
    pub hits: AtomicU64,
    /// Lookups that needed an upstream fetch.
    pub misses: AtomicU64,
    /// Stale entries returned after upstream failure.
    pub stale_served: AtomicU64,
    /// Successful stores.
    pub stores: AtomicU64,
}

impl WeatherCacheStats {
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale(&self) {
        self.stale_served.fetch_add(1, Ordering::Relaxed);
    }

    /// Calculate cache hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}

/// Shared bucket → sample cache.
#[derive(Clone, Default)]
pub struct WeatherCache {
    entries: Arc<RwLock<HashMap<BucketKey, CacheEntry>>>,
    stats: Arc<WeatherCacheStats>,
}

impl WeatherCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the entry for a key, fresh or stale.
    pub async fn lookup(&self, key: &BucketKey) -> Option<CacheEntry> {
        self.entries.read().await.get(key).cloned()
    }

    /// Store a sample, replacing any existing entry.
    pub async fn store(&self, key: BucketKey, sample: WeatherSample, now: DateTime<Utc>) {
        let entry = CacheEntry {
            sample,
            inserted_at: now,
        };
        self.entries.write().await.insert(key, entry);
        self.stats.stores.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of cached buckets.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Get cache statistics.
    pub fn stats(&self) -> &WeatherCacheStats {
        &self.stats
    }
}
