//! OpenWeather 5 day / 3 hour forecast source.
//!
//! Entries are timestamped every three hours, so the series is selected by
//! nearest valid time. Rain totals are per three hours and converted to mm/h.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nowcast_common::WeatherSample;
use serde::Deserialize;

use super::{get_json, ForecastSeries, SelectionMode, WeatherSource};
use crate::error::FetchError;

pub const OPEN_WEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/forecast";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    list: Vec<ForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct ForecastEntry {
    dt: i64,
    main: MainBlock,
    #[serde(default)]
    wind: Option<WindBlock>,
    #[serde(default)]
    rain: Option<RainBlock>,
    #[serde(default)]
    clouds: Option<CloudsBlock>,
    /// Metres.
    #[serde(default)]
    visibility: Option<f64>,
    #[serde(default)]
    weather: Vec<ConditionBlock>,
}

#[derive(Debug, Deserialize)]
struct MainBlock {
    temp: f64,
    humidity: f64,
    #[serde(default)]
    pressure: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WindBlock {
    #[serde(default)]
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Deserialize)]
struct RainBlock {
    #[serde(rename = "3h", default)]
    three_hour: f64,
}

#[derive(Debug, Deserialize)]
struct CloudsBlock {
    all: f64,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    description: String,
}

/// Parse an OpenWeather `/forecast` body into a series.
pub fn parse_open_weather(body: &[u8]) -> Result<ForecastSeries, FetchError> {
    let resp: ForecastResponse = serde_json::from_slice(body)?;
    into_series(resp)
}

fn into_series(resp: ForecastResponse) -> Result<ForecastSeries, FetchError> {
    let fetched_at = Utc::now();
    let mut entries = Vec::with_capacity(resp.list.len());

    for entry in resp.list {
        let valid_time = DateTime::<Utc>::from_timestamp(entry.dt, 0)
            .ok_or_else(|| FetchError::Malformed(format!("bad timestamp {}", entry.dt)))?;
        let (speed, deg) = entry.wind.map(|w| (w.speed, w.deg)).unwrap_or((0.0, 0.0));

        let mut sample =
            WeatherSample::new(entry.main.temp, entry.main.humidity, speed, deg, valid_time)
                .with_fetched_at(fetched_at)
                .with_precipitation(entry.rain.map(|r| r.three_hour / 3.0).unwrap_or(0.0));
        sample.pressure_hpa = entry.main.pressure;
        sample.cloud_cover_pct = entry.clouds.map(|c| c.all);
        sample.visibility_km = entry.visibility.map(|m| m / 1000.0);
        sample.description = entry.weather.into_iter().next().map(|w| w.description);
        entries.push(sample);
    }

    if entries.is_empty() {
        return Err(FetchError::Malformed("empty forecast list".to_string()));
    }

    Ok(ForecastSeries::new(entries, SelectionMode::NearestTime))
}

/// OpenWeather client. Needs an API key.
#[derive(Debug, Clone)]
pub struct OpenWeatherSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenWeatherSource {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, OPEN_WEATHER_URL, api_key)
    }

    pub fn with_base_url(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherSource {
    fn name(&self) -> &'static str {
        "openweather"
    }

    async fn fetch_forecast(&self, lat: f64, lon: f64) -> Result<ForecastSeries, FetchError> {
        let query = [
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("appid", self.api_key.clone()),
            ("units", "metric".to_string()),
        ];
        let resp: ForecastResponse = get_json(&self.client, &self.base_url, &query).await?;
        into_series(resp)
    }
}
