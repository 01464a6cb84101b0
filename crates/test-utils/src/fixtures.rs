//! Test fixture constants and builders.
//!
//! Values here are referenced across crates so that expected risks computed
//! by hand in one place stay in sync with the pipelines under test.

use chrono::{DateTime, TimeZone, Utc};
use nowcast_common::{BoundingBox, Geometry, WeatherSample};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

// =============================================================================
// Bounding boxes
// =============================================================================

/// Bounding boxes used by grid and summary tests.
pub mod bbox {
    /// Unit box at the origin: `[min_lon, min_lat, max_lon, max_lat]`.
    pub const UNIT: [f64; 4] = [0.0, 0.0, 1.0, 1.0];

    /// Izmir area, covered by the fixture district dataset.
    pub const IZMIR: [f64; 4] = [26.8, 38.2, 27.6, 38.8];

    /// Mainland Turkey.
    pub const TURKEY: [f64; 4] = [26.0, 36.0, 45.0, 42.0];

    /// Inverted latitudes, rejected by validation.
    pub const INVERTED: [f64; 4] = [0.0, 1.0, 1.0, 0.0];
}

/// Build a [`BoundingBox`] from one of the `bbox` constants.
pub fn bounding_box(raw: [f64; 4]) -> BoundingBox {
    BoundingBox::new(raw[0], raw[1], raw[2], raw[3])
}

// =============================================================================
// Weather samples
// =============================================================================

/// Core values of the hot/dry sample.
///
/// heuristic_risk(35, 20, 12) = 0.5·1 + 0.3·0.8 + 0.2·1 = 0.94
pub mod hot_dry {
    pub const TEMP_C: f64 = 35.0;
    pub const RH: f64 = 20.0;
    pub const WIND_MS: f64 = 12.0;
    pub const WIND_DIR: f64 = 225.0;
    pub const RISK_2DP: f64 = 0.94;
}

/// Core values of the cool/wet sample.
///
/// heuristic_risk(12, 90, 2) = 0.5·0.08 + 0.3·0.1 + 0.2·(2/12) = 0.1033 → 0.10
pub mod cool_wet {
    pub const TEMP_C: f64 = 12.0;
    pub const RH: f64 = 90.0;
    pub const WIND_MS: f64 = 2.0;
    pub const WIND_DIR: f64 = 90.0;
    pub const PRECIP_MM: f64 = 4.0;
    pub const RISK_2DP: f64 = 0.10;
}

/// Fixed reference instant for deterministic timestamps.
pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 8, 1, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// A hot, dry, windy sample with no precipitation.
pub fn hot_dry_sample() -> WeatherSample {
    WeatherSample::new(
        hot_dry::TEMP_C,
        hot_dry::RH,
        hot_dry::WIND_MS,
        hot_dry::WIND_DIR,
        reference_time(),
    )
    .with_precipitation(0.0)
}

/// A cool, humid sample with rain.
pub fn cool_wet_sample() -> WeatherSample {
    WeatherSample::new(
        cool_wet::TEMP_C,
        cool_wet::RH,
        cool_wet::WIND_MS,
        cool_wet::WIND_DIR,
        reference_time(),
    )
    .with_precipitation(cool_wet::PRECIP_MM)
}

/// `n` three-hourly copies of `sample` starting at `start`.
pub fn three_hourly(sample: &WeatherSample, start: DateTime<Utc>, n: usize) -> Vec<WeatherSample> {
    (0..n)
        .map(|i| {
            let mut s = sample.clone();
            s.valid_time = start + chrono::Duration::hours(3 * i as i64);
            s
        })
        .collect()
}

// =============================================================================
// Geometries
// =============================================================================

/// Closed square ring with its south-west corner at (x0, y0).
pub fn square_ring(x0: f64, y0: f64, size: f64) -> Value {
    json!([[x0, y0], [x0 + size, y0], [x0 + size, y0 + size], [x0, y0 + size], [x0, y0]])
}

/// GeoJSON Polygon of a square.
pub fn square_polygon(x0: f64, y0: f64, size: f64) -> Value {
    json!({ "type": "Polygon", "coordinates": [square_ring(x0, y0, size)] })
}

/// Unit square with a centred hole of side 0.5.
pub fn unit_square_with_hole() -> Value {
    json!({
        "type": "Polygon",
        "coordinates": [square_ring(0.0, 0.0, 1.0), square_ring(0.25, 0.25, 0.5)]
    })
}

/// Parse a GeoJSON geometry value, panicking on fixtures that are wrong.
pub fn geometry(value: &Value) -> Geometry {
    match Geometry::from_geojson(value) {
        Ok(g) => g,
        Err(e) => panic!("fixture geometry is invalid: {}", e),
    }
}

// =============================================================================
// District dataset
// =============================================================================

/// Two Izmir districts splitting [`bbox::IZMIR`] down the middle, plus one
/// Antalya district far away.
pub fn districts_geojson() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"city": "Izmir", "district": "Karsiyaka", "region": "Aegean"},
                "geometry": {"type": "Polygon", "coordinates": [[
                    [26.8, 38.2], [27.2, 38.2], [27.2, 38.8], [26.8, 38.8], [26.8, 38.2]
                ]]}
            },
            {
                "type": "Feature",
                "properties": {"city": "Izmir", "district": "Bornova", "region": "Aegean"},
                "geometry": {"type": "Polygon", "coordinates": [[
                    [27.2, 38.2], [27.6, 38.2], [27.6, 38.8], [27.2, 38.8], [27.2, 38.2]
                ]]}
            },
            {
                "type": "Feature",
                "properties": {"city": "Antalya", "district": "Kemer", "region": "Mediterranean"},
                "geometry": square_polygon(30.4, 36.5, 0.2)
            }
        ]
    })
}

/// Write [`districts_geojson`] into `dir` and return the file path.
pub fn write_districts(dir: &Path) -> PathBuf {
    let path = dir.join("districts.geojson");
    if let Err(e) = std::fs::write(&path, districts_geojson().to_string()) {
        panic!("failed to write district fixture: {}", e);
    }
    path
}

// =============================================================================
// Upstream response bodies
// =============================================================================

/// Open-Meteo hourly response with three hours, the second missing humidity.
pub fn open_meteo_body() -> Value {
    json!({
        "latitude": 38.5,
        "longitude": 27.0,
        "hourly": {
            "time": ["2024-08-01T12:00", "2024-08-01T13:00", "2024-08-01T14:00"],
            "temperature_2m": [31.0, 32.0, 33.0],
            "relative_humidity_2m": [25.0, null, 20.0],
            "wind_speed_10m": [5.0, 6.0, 7.0],
            "wind_direction_10m": [180.0, 190.0, 200.0],
            "precipitation": [0.0, 0.0, 0.2],
            "visibility": [24000.0, 23000.0, 22000.0]
        }
    })
}

/// Open-Meteo hourly response of `hours` identical hours from `start`, each
/// with `precipitation` mm. Values match [`hot_dry`].
pub fn open_meteo_hourly_body(start: DateTime<Utc>, hours: usize, precipitation: f64) -> Value {
    let times: Vec<String> = (0..hours)
        .map(|h| (start + chrono::Duration::hours(h as i64)).format("%Y-%m-%dT%H:%M").to_string())
        .collect();
    let repeat = |v: f64| vec![v; hours];
    json!({
        "hourly": {
            "time": times,
            "temperature_2m": repeat(hot_dry::TEMP_C),
            "relative_humidity_2m": repeat(hot_dry::RH),
            "wind_speed_10m": repeat(hot_dry::WIND_MS),
            "wind_direction_10m": repeat(hot_dry::WIND_DIR),
            "precipitation": repeat(precipitation)
        }
    })
}

/// OpenWeatherMap 5-day/3-hour response with two entries.
pub fn open_weather_body() -> Value {
    json!({
        "cod": "200",
        "list": [
            {
                "dt": 1_722_513_600,
                "main": {"temp": 30.0, "humidity": 30, "pressure": 1012},
                "wind": {"speed": 4.0, "deg": 270},
                "clouds": {"all": 10},
                "visibility": 10000,
                "weather": [{"description": "clear sky"}]
            },
            {
                "dt": 1_722_524_400,
                "main": {"temp": 28.0, "humidity": 35, "pressure": 1011},
                "wind": {"speed": 3.5, "deg": 260},
                "rain": {"3h": 1.5},
                "clouds": {"all": 40},
                "visibility": 9000,
                "weather": [{"description": "light rain"}]
            }
        ]
    })
}
