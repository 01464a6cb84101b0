//! Inverse distance weighting over scattered samples.
//!
//! Distances are planar in (lon, lat) degrees, which is adequate for regions a
//! few degrees across.

use nowcast_common::WeatherSample;

/// Default IDW power.
pub const DEFAULT_POWER: f64 = 2.0;

/// A scattered sample: position and value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub lon: f64,
    pub lat: f64,
    pub value: f64,
}

impl Sample {
    pub fn new(lon: f64, lat: f64, value: f64) -> Self {
        Self { lon, lat, value }
    }
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// IDW weights for `target`, or the index of a sample sitting exactly on it.
fn weights(target: (f64, f64), positions: &[(f64, f64)], power: f64) -> Result<Vec<f64>, usize> {
    let mut w = Vec::with_capacity(positions.len());
    for (idx, &pos) in positions.iter().enumerate() {
        let d = distance(target, pos);
        if d == 0.0 {
            return Err(idx);
        }
        w.push(1.0 / d.powf(power));
    }
    Ok(w)
}

/// Inverse distance weighted value at `target` (lon, lat).
///
/// A sample at distance zero is returned as-is; no samples yields 0.
pub fn idw(target: (f64, f64), samples: &[Sample], power: f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let positions: Vec<(f64, f64)> = samples.iter().map(|s| (s.lon, s.lat)).collect();
    match weights(target, &positions, power) {
        Err(exact) => samples[exact].value,
        Ok(w) => {
            let total: f64 = w.iter().sum();
            let weighted: f64 = w.iter().zip(samples).map(|(wi, s)| wi * s.value).sum();
            weighted / total
        }
    }
}

/// A weather sample taken at a known position.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub lon: f64,
    pub lat: f64,
    pub sample: WeatherSample,
}

/// Weather fields interpolated onto one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolatedWeather {
    pub temperature_c: f64,
    pub relative_humidity: f64,
    pub wind_speed_ms: f64,
    pub wind_direction_deg: f64,
    pub precipitation_mm: f64,
}

/// Interpolate the weather fields used by the risk models onto `target`.
///
/// Wind direction is averaged as a weighted unit vector so that 350° and 10°
/// blend to 0° rather than 180°. Returns `None` with no stations.
pub fn interpolate_weather(
    target: (f64, f64),
    stations: &[Station],
    power: f64,
) -> Option<InterpolatedWeather> {
    if stations.is_empty() {
        return None;
    }

    let positions: Vec<(f64, f64)> = stations.iter().map(|s| (s.lon, s.lat)).collect();
    let w = match weights(target, &positions, power) {
        Err(exact) => {
            let s = &stations[exact].sample;
            return Some(InterpolatedWeather {
                temperature_c: s.temperature_c,
                relative_humidity: s.relative_humidity,
                wind_speed_ms: s.wind_speed_ms,
                wind_direction_deg: s.wind_direction_deg,
                precipitation_mm: s.precipitation_or_zero(),
            });
        }
        Ok(w) => w,
    };

    let total: f64 = w.iter().sum();
    let blend = |field: fn(&WeatherSample) -> f64| -> f64 {
        w.iter()
            .zip(stations)
            .map(|(wi, s)| wi * field(&s.sample))
            .sum::<f64>()
            / total
    };

    let u = blend(|s| s.wind_direction_deg.to_radians().sin());
    let v = blend(|s| s.wind_direction_deg.to_radians().cos());
    let wind_direction_deg = u.atan2(v).to_degrees().rem_euclid(360.0);

    Some(InterpolatedWeather {
        temperature_c: blend(|s| s.temperature_c),
        relative_humidity: blend(|s| s.relative_humidity),
        wind_speed_ms: blend(|s| s.wind_speed_ms),
        wind_direction_deg,
        precipitation_mm: blend(WeatherSample::precipitation_or_zero),
    })
}
