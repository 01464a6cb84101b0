//! Upstream weather access for the nowcast engine.
//!
//! Grid points are collapsed onto coarse buckets so that a whole grid costs
//! one upstream request per bucket instead of one per point:
//!
//! ```text
//! grid points ──► Quantizer ──► unique BucketKeys
//!                                     │
//!                                     ▼
//!                         WeatherFetcher::resolve_all
//!                                     │
//!                    ┌────────────────┼────────────────┐
//!                    ▼                ▼                ▼
//!              fresh cache hit   upstream fetch    stale fallback
//!                                (retry+backoff)   (after retries)
//! ```

pub mod bucket;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod upstream;

pub use bucket::{quantize, BucketKey, Quantizer};
pub use cache::{CacheEntry, WeatherCache, WeatherCacheStats};
pub use config::FetchConfig;
pub use error::FetchError;
pub use fetcher::WeatherFetcher;
pub use upstream::{
    ForecastSeries, OpenMeteoSource, OpenWeatherSource, SelectionMode, WeatherSource,
};
