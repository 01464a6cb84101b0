//! Open-Meteo hourly forecast source.
//!
//! API: `https://api.open-meteo.com/v1/forecast`, no key required. Hourly
//! values come back as parallel arrays indexed by hour, so the series is
//! selected by index.

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use nowcast_common::WeatherSample;
use serde::Deserialize;

use super::{get_json, ForecastSeries, SelectionMode, WeatherSource};
use crate::error::FetchError;

pub const OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

const HOURLY_FIELDS: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m,\
wind_direction_10m,precipitation,surface_pressure,cloud_cover,visibility,uv_index,dew_point_2m";

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    hourly: OpenMeteoHourly,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoHourly {
    time: Vec<String>,
    temperature_2m: Vec<Option<f64>>,
    relative_humidity_2m: Vec<Option<f64>>,
    wind_speed_10m: Vec<Option<f64>>,
    wind_direction_10m: Vec<Option<f64>>,
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
    #[serde(default)]
    surface_pressure: Vec<Option<f64>>,
    #[serde(default)]
    cloud_cover: Vec<Option<f64>>,
    /// Metres.
    #[serde(default)]
    visibility: Vec<Option<f64>>,
    #[serde(default)]
    uv_index: Vec<Option<f64>>,
    #[serde(default)]
    dew_point_2m: Vec<Option<f64>>,
}

fn at(values: &[Option<f64>], idx: usize) -> Option<f64> {
    values.get(idx).copied().flatten()
}

/// Parse an Open-Meteo forecast body into a series.
///
/// Hours missing any core field are skipped; a body with no usable hour is
/// malformed.
pub fn parse_open_meteo(body: &[u8]) -> Result<ForecastSeries, FetchError> {
    let resp: OpenMeteoResponse = serde_json::from_slice(body)?;
    into_series(resp)
}

fn into_series(resp: OpenMeteoResponse) -> Result<ForecastSeries, FetchError> {
    let hourly = resp.hourly;
    let fetched_at = Utc::now();

    let mut entries = Vec::with_capacity(hourly.time.len());
    for (idx, time) in hourly.time.iter().enumerate() {
        let valid_time = NaiveDateTime::parse_from_str(time, "%Y-%m-%dT%H:%M")
            .map_err(|e| FetchError::Malformed(format!("bad hourly time '{}': {}", time, e)))?
            .and_utc();

        let (Some(temp), Some(rh), Some(wind), Some(dir)) = (
            at(&hourly.temperature_2m, idx),
            at(&hourly.relative_humidity_2m, idx),
            at(&hourly.wind_speed_10m, idx),
            at(&hourly.wind_direction_10m, idx),
        ) else {
            continue;
        };

        let mut sample =
            WeatherSample::new(temp, rh, wind, dir, valid_time).with_fetched_at(fetched_at);
        sample.precipitation_mm = at(&hourly.precipitation, idx);
        sample.pressure_hpa = at(&hourly.surface_pressure, idx);
        sample.cloud_cover_pct = at(&hourly.cloud_cover, idx);
        sample.visibility_km = at(&hourly.visibility, idx).map(|m| m / 1000.0);
        sample.uv_index = at(&hourly.uv_index, idx);
        sample.dew_point_c = at(&hourly.dew_point_2m, idx);
        entries.push(sample);
    }

    if entries.is_empty() {
        return Err(FetchError::Malformed("no usable hourly entries".to_string()));
    }

    Ok(ForecastSeries::new(entries, SelectionMode::HourlyIndex))
}

/// Open-Meteo client.
#[derive(Debug, Clone)]
pub struct OpenMeteoSource {
    client: reqwest::Client,
    base_url: String,
}

impl OpenMeteoSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, OPEN_METEO_URL)
    }

    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoSource {
    fn name(&self) -> &'static str {
        "open-meteo"
    }

    async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<ForecastSeries, FetchError> {
        let query = [
            ("latitude", lat.to_string()),
            ("longitude", lon.to_string()),
            ("hourly", HOURLY_FIELDS.to_string()),
            ("wind_speed_unit", "ms".to_string()),
            ("forecast_days", "2".to_string()),
            ("timezone", "UTC".to_string()),
        ];
        let resp: OpenMeteoResponse = get_json(&self.client, &self.base_url, &query).await?;
        into_series(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "latitude": 41.0,
        "longitude": 29.0,
        "hourly": {
            "time": ["2024-07-01T00:00", "2024-07-01T01:00", "2024-07-01T02:00"],
            "temperature_2m": [24.1, null, 26.0],
            "relative_humidity_2m": [55, 50, 45],
            "wind_speed_10m": [3.2, 3.5, 4.0],
            "wind_direction_10m": [180, 190, 200],
            "precipitation": [0.0, 0.0, 0.2],
            "visibility": [24000, 24000, 18000]
        }
    }"#;

    #[test]
    fn test_parse_open_meteo() {
        let series = parse_open_meteo(BODY.as_bytes()).unwrap();
        assert_eq!(series.mode, SelectionMode::HourlyIndex);
        // The 01:00 hour has a null temperature and is skipped.
        assert_eq!(series.entries.len(), 2);

        let last = &series.entries[1];
        assert_eq!(last.temperature_c, 26.0);
        assert_eq!(last.relative_humidity, 45.0);
        assert_eq!(last.precipitation_mm, Some(0.2));
        assert_eq!(last.visibility_km, Some(18.0));
        assert_eq!(last.pressure_hpa, None);
        assert_eq!(last.valid_time.to_rfc3339(), "2024-07-01T02:00:00+00:00");
    }

    #[test]
    fn test_parse_open_meteo_missing_hourly() {
        let result = parse_open_meteo(br#"{"latitude": 41.0}"#);
        assert!(matches!(result, Err(FetchError::Malformed(_))));
    }

    #[test]
    fn test_parse_open_meteo_all_null() {
        let body = r#"{"hourly": {
            "time": ["2024-07-01T00:00"],
            "temperature_2m": [null],
            "relative_humidity_2m": [null],
            "wind_speed_10m": [null],
            "wind_direction_10m": [null]
        }}"#;
        assert!(matches!(
            parse_open_meteo(body.as_bytes()),
            Err(FetchError::Malformed(_))
        ));
    }
}
