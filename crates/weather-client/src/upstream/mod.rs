//! Upstream weather sources.
//!
//! Each source turns a (lat, lon) request into a [`ForecastSeries`]: a list
//! of timestamped samples plus the rule used to pick the one matching an hour
//! offset.

mod open_meteo;
mod open_weather;

pub use open_meteo::{parse_open_meteo, OpenMeteoSource, OPEN_METEO_URL};
pub use open_weather::{parse_open_weather, OpenWeatherSource, OPEN_WEATHER_URL};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use nowcast_common::WeatherSample;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::FetchError;

/// How to pick the sample for an hour offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Hourly arrays: index `clamp(hour_offset, 0, len - 1)`.
    HourlyIndex,
    /// Timestamped entries: the one closest to `now + hour_offset` hours.
    NearestTime,
}

/// Forecast entries returned by one upstream call.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSeries {
    pub entries: Vec<WeatherSample>,
    pub mode: SelectionMode,
}

impl ForecastSeries {
    pub fn new(entries: Vec<WeatherSample>, mode: SelectionMode) -> Self {
        Self { entries, mode }
    }

    /// Pick the entry for `hour_offset` hours after `now`.
    pub fn select(&self, hour_offset: i32, now: DateTime<Utc>) -> Option<&WeatherSample> {
        if self.entries.is_empty() {
            return None;
        }

        match self.mode {
            SelectionMode::HourlyIndex => {
                let idx = (hour_offset.max(0) as usize).min(self.entries.len() - 1);
                self.entries.get(idx)
            }
            SelectionMode::NearestTime => {
                let target = now + Duration::hours(i64::from(hour_offset));
                self.entries
                    .iter()
                    .min_by_key(|e| (e.valid_time - target).num_seconds().abs())
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A provider of point forecasts.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Fetch the forecast series for a location.
    async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<ForecastSeries, FetchError>;
}

/// GET a URL and decode the JSON body, mapping non-2xx to [`FetchError::Status`].
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<T, FetchError> {
    debug!(url = %url, "Fetching upstream weather");

    let resp = client.get(url).query(query).send().await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(FetchError::Status {
            status: status.as_u16(),
            body: body.chars().take(500).collect(),
        });
    }

    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
