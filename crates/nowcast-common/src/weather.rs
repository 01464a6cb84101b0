//! Weather sample record shared by the fetcher and the risk models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single weather observation/forecast instant at one location.
///
/// Core fields are always present; extended fields depend on what the
/// upstream source reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    /// Air temperature in °C.
    pub temperature_c: f64,
    /// Relative humidity in percent (0-100).
    pub relative_humidity: f64,
    /// Wind speed in m/s.
    pub wind_speed_ms: f64,
    /// Wind direction in degrees (0-360, meteorological).
    pub wind_direction_deg: f64,

    /// Surface pressure in hPa.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure_hpa: Option<f64>,
    /// Visibility in km.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility_km: Option<f64>,
    /// Cloud cover in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_cover_pct: Option<f64>,
    /// Precipitation rate in mm/h.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uv_index: Option<f64>,
    /// Dew point in °C.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dew_point_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Instant this sample is valid for.
    pub valid_time: DateTime<Utc>,
    /// When the sample was fetched from upstream.
    pub fetched_at: DateTime<Utc>,
}

impl WeatherSample {
    /// Create a sample with only the core fields set.
    pub fn new(
        temperature_c: f64,
        relative_humidity: f64,
        wind_speed_ms: f64,
        wind_direction_deg: f64,
        valid_time: DateTime<Utc>,
    ) -> Self {
        Self {
            temperature_c,
            relative_humidity,
            wind_speed_ms,
            wind_direction_deg,
            pressure_hpa: None,
            visibility_km: None,
            cloud_cover_pct: None,
            precipitation_mm: None,
            uv_index: None,
            dew_point_c: None,
            description: None,
            valid_time,
            fetched_at: valid_time,
        }
    }

    /// Set the precipitation rate in mm/h.
    pub fn with_precipitation(mut self, mm: f64) -> Self {
        self.precipitation_mm = Some(mm);
        self
    }

    /// Set the fetch timestamp.
    pub fn with_fetched_at(mut self, fetched_at: DateTime<Utc>) -> Self {
        self.fetched_at = fetched_at;
        self
    }

    /// Precipitation rate, treating a missing value as dry.
    pub fn precipitation_or_zero(&self) -> f64 {
        self.precipitation_mm.unwrap_or(0.0)
    }

    /// True when the sample reports no precipitation.
    pub fn is_dry(&self) -> bool {
        self.precipitation_or_zero() == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_precipitation_is_dry() {
        let sample = WeatherSample::new(25.0, 40.0, 3.0, 180.0, Utc::now());
        assert!(sample.is_dry());
        assert!(!sample.clone().with_precipitation(0.4).is_dry());
    }

    #[test]
    fn test_extended_fields_skipped_when_absent() {
        let sample = WeatherSample::new(25.0, 40.0, 3.0, 180.0, Utc::now());
        let json = serde_json::to_string(&sample).unwrap();
        assert!(!json.contains("pressure_hpa"));
        assert!(json.contains("\"temperature_c\":25.0"));
    }
}
