//! Mock weather sources.

use async_trait::async_trait;
use nowcast_common::WeatherSample;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use weather_client::error::FetchError;
use serde_json::Value;
use weather_client::upstream::{parse_open_meteo, parse_open_weather};
use weather_client::{ForecastSeries, SelectionMode, WeatherSource};

/// Returns the same hourly series for every location.
#[derive(Debug)]
pub struct StaticSource {
    entries: Vec<WeatherSample>,
    calls: AtomicU32,
}

impl StaticSource {
    /// A single-entry series; every hour offset selects `sample`.
    pub fn new(sample: WeatherSample) -> Self {
        Self::with_entries(vec![sample])
    }

    pub fn with_entries(entries: Vec<WeatherSample>) -> Self {
        Self {
            entries,
            calls: AtomicU32::new(0),
        }
    }

    pub fn shared(sample: WeatherSample) -> Arc<Self> {
        Arc::new(Self::new(sample))
    }

    /// Number of upstream requests served so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherSource for StaticSource {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn fetch_forecast(&self, _lat: f64, _lon: f64) -> Result<ForecastSeries, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ForecastSeries::new(
            self.entries.clone(),
            SelectionMode::HourlyIndex,
        ))
    }
}

/// Fails every request with a 503.
#[derive(Debug, Default)]
pub struct FailingSource {
    calls: AtomicU32,
}

impl FailingSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherSource for FailingSource {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn fetch_forecast(&self, _lat: f64, _lon: f64) -> Result<ForecastSeries, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(FetchError::Status {
            status: 503,
            body: "service unavailable".to_string(),
        })
    }
}

/// Serves `sample` for latitudes below `max_lat` and fails elsewhere.
#[derive(Debug)]
pub struct PartialSource {
    sample: WeatherSample,
    max_lat: f64,
    calls: AtomicU32,
}

impl PartialSource {
    pub fn new(sample: WeatherSample, max_lat: f64) -> Self {
        Self {
            sample,
            max_lat,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherSource for PartialSource {
    fn name(&self) -> &'static str {
        "partial"
    }

    async fn fetch_forecast(&self, lat: f64, _lon: f64) -> Result<ForecastSeries, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if lat >= self.max_lat {
            return Err(FetchError::Malformed(format!("no data north of {}", self.max_lat)));
        }
        Ok(ForecastSeries::new(
            vec![self.sample.clone()],
            SelectionMode::HourlyIndex,
        ))
    }
}

/// Replays a recorded upstream response body through the real parser.
pub struct RecordedSource {
    name: &'static str,
    body: Vec<u8>,
    parse: fn(&[u8]) -> Result<ForecastSeries, FetchError>,
    calls: AtomicU32,
}

impl RecordedSource {
    /// An Open-Meteo hourly body.
    pub fn open_meteo(body: &Value) -> Self {
        Self::new("recorded-open-meteo", body, parse_open_meteo)
    }

    /// An OpenWeatherMap 3-hourly body.
    pub fn open_weather(body: &Value) -> Self {
        Self::new("recorded-open-weather", body, parse_open_weather)
    }

    fn new(
        name: &'static str,
        body: &Value,
        parse: fn(&[u8]) -> Result<ForecastSeries, FetchError>,
    ) -> Self {
        Self {
            name,
            body: body.to_string().into_bytes(),
            parse,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherSource for RecordedSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch_forecast(&self, _lat: f64, _lon: f64) -> Result<ForecastSeries, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.parse)(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{hot_dry_sample, open_meteo_body};

    #[tokio::test]
    async fn test_static_source_counts_calls() {
        let source = StaticSource::new(hot_dry_sample());
        source.fetch_forecast(1.0, 2.0).await.unwrap();
        source.fetch_forecast(3.0, 4.0).await.unwrap();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_failing_source() {
        let source = FailingSource::new();
        assert!(source.fetch_forecast(0.0, 0.0).await.is_err());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_partial_source_splits_on_latitude() {
        let source = PartialSource::new(hot_dry_sample(), 0.5);
        assert!(source.fetch_forecast(0.25, 0.0).await.is_ok());
        assert!(source.fetch_forecast(0.75, 0.0).await.is_err());
    }

    #[tokio::test]
    async fn test_recorded_source_parses_on_every_call() {
        let source = RecordedSource::open_meteo(&open_meteo_body());
        let series = source.fetch_forecast(38.5, 27.0).await.unwrap();
        assert_eq!(series.entries.len(), 2);
        source.fetch_forecast(38.5, 27.0).await.unwrap();
        assert_eq!(source.calls(), 2);
    }
}
