//! Cache-first weather fetcher with retry and stale fallback.
//!
//! A bucket is resolved in this order:
//! 1. a fresh cache entry is returned without touching upstream;
//! 2. otherwise upstream is tried up to `max_retries` times, sleeping
//!    `base_delay * 2^attempt` between attempts;
//! 3. if every attempt fails, a stale entry for the bucket is served;
//! 4. with nothing cached, the bucket is reported unavailable.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use metrics::counter;
use nowcast_common::{NowcastError, WeatherSample};
use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::bucket::{BucketKey, Quantizer};
use crate::cache::WeatherCache;
use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::upstream::{ForecastSeries, WeatherSource};

/// Resolves bucket keys to weather samples.
#[derive(Clone)]
pub struct WeatherFetcher {
    source: Arc<dyn WeatherSource>,
    cache: WeatherCache,
    config: FetchConfig,
    quantizer: Quantizer,
}

impl WeatherFetcher {
    /// Create a fetcher with its own empty cache.
    pub fn new(source: Arc<dyn WeatherSource>, config: FetchConfig) -> Result<Self, NowcastError> {
        Self::with_cache(source, WeatherCache::new(), config)
    }

    /// Create a fetcher over an existing (possibly shared) cache.
    pub fn with_cache(
        source: Arc<dyn WeatherSource>,
        cache: WeatherCache,
        config: FetchConfig,
    ) -> Result<Self, NowcastError> {
        let quantizer = Quantizer::new(config.bucket_step)?;
        Ok(Self {
            source,
            cache,
            config,
            quantizer,
        })
    }

    pub fn quantizer(&self) -> Quantizer {
        self.quantizer
    }

    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Bucket key for a raw coordinate.
    pub fn bucket(&self, lat: f64, lon: f64, hour_offset: i32) -> BucketKey {
        self.quantizer.bucket(lat, lon, hour_offset)
    }

    /// Resolve the sample for a raw coordinate at the current time.
    pub async fn resolve(
        &self,
        lat: f64,
        lon: f64,
        hour_offset: i32,
    ) -> Result<WeatherSample, FetchError> {
        self.resolve_at(self.bucket(lat, lon, hour_offset), Utc::now())
            .await
    }

    /// Resolve one bucket as of `now`.
    #[instrument(skip(self, key), fields(key = %key))]
    pub async fn resolve_at(
        &self,
        key: BucketKey,
        now: DateTime<Utc>,
    ) -> Result<WeatherSample, FetchError> {
        if let Some(entry) = self.cache.lookup(&key).await {
            if entry.is_fresh(now, self.config.ttl()) {
                self.cache.stats().record_hit();
                counter!("nowcast_cache_hits_total").increment(1);
                debug!("Cache hit");
                return Ok(entry.sample);
            }
        }

        self.cache.stats().record_miss();
        counter!("nowcast_cache_misses_total").increment(1);

        let (lat, lon, hour_offset) = (key.lat(), key.lon(), key.hour_offset());
        let fetched = self
            .with_retry(&key.to_string(), move || async move {
                let series = self.source.fetch_forecast(lat, lon).await?;
                series.select(hour_offset, now).cloned().ok_or_else(|| {
                    FetchError::Malformed("forecast has no entries".to_string())
                })
            })
            .await;

        match fetched {
            Ok(sample) => {
                self.cache.store(key, sample.clone(), now).await;
                Ok(sample)
            }
            Err(last_error) => {
                counter!("nowcast_upstream_failures_total").increment(1);

                if let Some(entry) = self.cache.lookup(&key).await {
                    self.cache.stats().record_stale();
                    warn!(
                        error = %last_error,
                        inserted_at = %entry.inserted_at,
                        "Upstream failed, serving stale weather"
                    );
                    return Ok(entry.sample);
                }

                Err(FetchError::UpstreamUnavailable {
                    key: key.to_string(),
                    attempts: self.attempts(),
                    last_error: last_error.to_string(),
                })
            }
        }
    }

    /// Resolve a set of buckets concurrently, one request per unique key.
    ///
    /// At most `max_concurrent_fetches` buckets are in flight at once.
    /// Buckets that cannot be resolved are left out of the map.
    pub async fn resolve_all<I>(&self, keys: I) -> HashMap<BucketKey, WeatherSample>
    where
        I: IntoIterator<Item = BucketKey>,
    {
        let unique: BTreeSet<BucketKey> = keys.into_iter().collect();
        let now = Utc::now();

        let results: Vec<(BucketKey, Result<WeatherSample, FetchError>)> =
            stream::iter(unique)
                .map(move |key| async move { (key, self.resolve_at(key, now).await) })
                .buffer_unordered(self.config.max_concurrent_fetches.max(1))
                .collect()
                .await;

        let mut resolved = HashMap::with_capacity(results.len());
        for (key, result) in results {
            match result {
                Ok(sample) => {
                    resolved.insert(key, sample);
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "Bucket unresolved, leaving hole");
                }
            }
        }
        resolved
    }

    /// Fetch the full forecast series for a point, bypassing the cache.
    #[instrument(skip(self))]
    pub async fn forecast(&self, lat: f64, lon: f64) -> Result<ForecastSeries, FetchError> {
        let label = format!("{:.3},{:.3}", lat, lon);
        self.with_retry(&label, || self.source.fetch_forecast(lat, lon))
            .await
            .map_err(|last_error| {
                counter!("nowcast_upstream_failures_total").increment(1);
                FetchError::UpstreamUnavailable {
                    key: label.clone(),
                    attempts: self.attempts(),
                    last_error: last_error.to_string(),
                }
            })
    }

    fn attempts(&self) -> u32 {
        self.config.max_retries.max(1)
    }

    /// Run `op` until it succeeds or attempts run out, returning the last error.
    async fn with_retry<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let attempts = self.attempts();
        let mut attempt = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt + 1 >= attempts => {
                    warn!(
                        target_key = label,
                        source = self.source.name(),
                        error = %e,
                        attempts,
                        "Upstream attempts exhausted"
                    );
                    return Err(e);
                }
                Err(e) => {
                    let delay = self.config.backoff_delay(attempt);
                    warn!(
                        target_key = label,
                        source = self.source.name(),
                        error = %e,
                        retry = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "Upstream fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::upstream::SelectionMode;

    struct Fixed;

    #[async_trait]
    impl WeatherSource for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn fetch_forecast(&self, _lat: f64, _lon: f64) -> Result<ForecastSeries, FetchError> {
            let sample = WeatherSample::new(30.0, 25.0, 5.0, 270.0, Utc::now());
            Ok(ForecastSeries::new(vec![sample], SelectionMode::HourlyIndex))
        }
    }

    #[test]
    fn test_rejects_bad_bucket_step() {
        let config = FetchConfig {
            bucket_step: 0.0,
            ..FetchConfig::default()
        };
        assert!(WeatherFetcher::new(Arc::new(Fixed), config).is_err());
    }

    #[tokio::test]
    async fn test_resolve_stores_in_cache() {
        let fetcher = WeatherFetcher::new(Arc::new(Fixed), FetchConfig::default()).unwrap();
        let sample = fetcher.resolve(41.01, 28.97, 0).await.unwrap();
        assert_eq!(sample.temperature_c, 30.0);

        let key = fetcher.bucket(41.0, 29.0, 0);
        assert!(fetcher.cache().lookup(&key).await.is_some());
    }

    #[test]
    fn test_zero_retries_still_attempts_once() {
        let config = FetchConfig {
            max_retries: 0,
            ..FetchConfig::default()
        };
        let fetcher = WeatherFetcher::new(Arc::new(Fixed), config).unwrap();
        assert_eq!(fetcher.attempts(), 1);
    }
}
