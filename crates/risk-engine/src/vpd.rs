//! Vapour-pressure-deficit risk model.
//!
//! ```text
//! base  = 0.50·vpd_risk + 0.25·fuel_risk + 0.15·wind_risk
//!       + 0.05·vegetation + 0.05·human_activity
//! total = clamp(base · slope_factor · drought_factor)
//! ```

use serde::Serialize;

use crate::features::{fuel_moisture, HumanActivity, VegetationType};
use crate::heuristic::clamp01;

/// Saturation vapour pressure in hPa (Magnus formula).
pub fn saturation_vapor_pressure(temp_c: f64) -> f64 {
    6.112 * (17.67 * temp_c / (temp_c + 243.5)).exp()
}

/// Vapour pressure deficit in hPa.
pub fn vapor_pressure_deficit(temp_c: f64, rh: f64) -> f64 {
    let svp = saturation_vapor_pressure(temp_c);
    svp - svp * (rh / 100.0)
}

/// Everything the VPD model needs for one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VpdInputs {
    pub lat: f64,
    pub lon: f64,
    pub temp_c: f64,
    pub rh: f64,
    pub wind_ms: f64,
    /// mm/h
    pub precipitation_mm: f64,
    pub slope_factor: f64,
    pub drought_factor: f64,
}

/// Model output with the intermediate components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VpdAssessment {
    pub risk: f64,
    pub base_risk: f64,
    pub vpd: f64,
    pub vpd_risk: f64,
    pub fuel_moisture: f64,
    pub wind_risk: f64,
    pub vegetation: VegetationType,
    pub human_activity: HumanActivity,
}

/// Score one point.
pub fn assess(inputs: &VpdInputs) -> VpdAssessment {
    let vpd = vapor_pressure_deficit(inputs.temp_c, inputs.rh);
    let vpd_risk = clamp01((vpd - 15.0) / 25.0);

    let fuel_moisture = fuel_moisture(inputs.temp_c, inputs.rh, inputs.precipitation_mm);
    let fuel_risk = 1.0 - fuel_moisture;
    let wind_risk = clamp01(inputs.wind_ms / 15.0);

    let vegetation = VegetationType::from_location(inputs.lat, inputs.lon);
    let human_activity = HumanActivity::from_location(inputs.lat, inputs.lon);

    let base_risk = 0.50 * vpd_risk
        + 0.25 * fuel_risk
        + 0.15 * wind_risk
        + 0.05 * vegetation.risk_factor()
        + 0.05 * human_activity.risk_factor();

    VpdAssessment {
        risk: clamp01(base_risk * inputs.slope_factor * inputs.drought_factor),
        base_risk,
        vpd,
        vpd_risk,
        fuel_moisture,
        wind_risk,
        vegetation,
        human_activity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(temp_c: f64, rh: f64, wind_ms: f64) -> VpdInputs {
        VpdInputs {
            lat: 38.0,
            lon: 35.0,
            temp_c,
            rh,
            wind_ms,
            precipitation_mm: 0.0,
            slope_factor: 1.0,
            drought_factor: 1.0,
        }
    }

    #[test]
    fn test_magnus_at_20c() {
        assert!((saturation_vapor_pressure(20.0) - 23.37).abs() < 0.05);
        assert!((vapor_pressure_deficit(20.0, 100.0)).abs() < 1e-12);
    }

    #[test]
    fn test_hot_dry_windy_is_high() {
        let a = assess(&inputs(40.0, 10.0, 15.0));
        assert_eq!(a.vpd_risk, 1.0);
        assert_eq!(a.wind_risk, 1.0);
        // lat 38 lon 35: outside all vegetation boxes, low activity.
        assert_eq!(a.vegetation, VegetationType::MixedForest);
        assert_eq!(a.human_activity, HumanActivity::Low);
        let expected = 0.5 + 0.25 * (1.0 - a.fuel_moisture) + 0.15 + 0.05 * 0.7 + 0.05 * 0.1;
        assert!((a.base_risk - expected).abs() < 1e-12);
    }

    #[test]
    fn test_cool_humid_is_low() {
        let a = assess(&inputs(10.0, 95.0, 1.0));
        assert_eq!(a.vpd_risk, 0.0);
        assert!(a.risk < 0.3);
    }

    #[test]
    fn test_modifiers_scale_and_clamp() {
        let mut i = inputs(35.0, 20.0, 8.0);
        let plain = assess(&i).risk;
        i.slope_factor = 1.2;
        let sloped = assess(&i).risk;
        assert!((sloped - (plain * 1.2).min(1.0)).abs() < 1e-12);

        let worst = assess(&inputs(45.0, 5.0, 20.0));
        let boosted = assess(&VpdInputs {
            slope_factor: 1.5,
            drought_factor: 1.4,
            ..inputs(45.0, 5.0, 20.0)
        });
        assert!(boosted.risk <= 1.0);
        assert!(boosted.risk >= worst.risk);
    }

    #[test]
    fn test_bounded_over_input_sweep() {
        for t in (-20..=50).step_by(10) {
            for rh in (0..=100).step_by(20) {
                for rain in [0.0, 0.5, 20.0] {
                    let a = assess(&VpdInputs {
                        precipitation_mm: rain,
                        slope_factor: 1.5,
                        drought_factor: 1.4,
                        ..inputs(t as f64, rh as f64, 12.0)
                    });
                    assert!((0.0..=1.0).contains(&a.risk));
                }
            }
        }
    }
}
