//! Derived risk inputs: vegetation class, human activity, fuel moisture.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Vegetation class inferred from coarse geographic regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VegetationType {
    PineForest,
    MediterraneanForest,
    MixedForest,
    DeciduousForest,
    Steppe,
    Unknown,
}

/// (min_lat, max_lat, min_lon, max_lon, class), checked in order, bounds inclusive.
const VEGETATION_REGIONS: [(f64, f64, f64, f64, VegetationType); 5] = [
    // Marmara
    (40.0, 42.0, 27.0, 30.0, VegetationType::MixedForest),
    // Aegean
    (38.0, 40.0, 26.0, 30.0, VegetationType::MediterraneanForest),
    // Mediterranean coast
    (36.0, 38.0, 26.0, 30.0, VegetationType::PineForest),
    // Central Anatolia
    (39.0, 42.0, 30.0, 35.0, VegetationType::Steppe),
    // Black Sea
    (40.0, 42.0, 35.0, 42.0, VegetationType::DeciduousForest),
];

impl VegetationType {
    /// Class for a location; anything outside the known regions is mixed forest.
    pub fn from_location(lat: f64, lon: f64) -> Self {
        VEGETATION_REGIONS
            .iter()
            .find(|(lat0, lat1, lon0, lon1, _)| {
                (*lat0..=*lat1).contains(&lat) && (*lon0..=*lon1).contains(&lon)
            })
            .map(|region| region.4)
            .unwrap_or(VegetationType::MixedForest)
    }

    pub fn risk_factor(&self) -> f64 {
        match self {
            VegetationType::PineForest => 0.9,
            VegetationType::MediterraneanForest => 0.8,
            VegetationType::MixedForest => 0.7,
            VegetationType::DeciduousForest => 0.6,
            VegetationType::Steppe => 0.4,
            VegetationType::Unknown => 0.5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VegetationType::PineForest => "pine_forest",
            VegetationType::MediterraneanForest => "mediterranean_forest",
            VegetationType::MixedForest => "mixed_forest",
            VegetationType::DeciduousForest => "deciduous_forest",
            VegetationType::Steppe => "steppe",
            VegetationType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for VegetationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human activity level from proximity to a population centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HumanActivity {
    High,
    Medium,
    Low,
}

/// Degrees within which a point counts as near a population centre.
const CITY_RADIUS_DEG: f64 = 0.5;

/// (lat, lon, level) of the population centres.
const POPULATION_CENTRES: [(f64, f64, HumanActivity); 5] = [
    (41.0082, 28.9784, HumanActivity::High),   // Istanbul
    (38.4192, 27.1287, HumanActivity::High),   // Izmir
    (39.9334, 32.8597, HumanActivity::High),   // Ankara
    (36.8969, 30.7133, HumanActivity::Medium), // Antalya
    (37.0662, 37.3833, HumanActivity::Medium), // Gaziantep
];

impl HumanActivity {
    pub fn from_location(lat: f64, lon: f64) -> Self {
        POPULATION_CENTRES
            .iter()
            .find(|(clat, clon, _)| {
                ((lat - clat).powi(2) + (lon - clon).powi(2)).sqrt() < CITY_RADIUS_DEG
            })
            .map(|c| c.2)
            .unwrap_or(HumanActivity::Low)
    }

    pub fn risk_factor(&self) -> f64 {
        match self {
            HumanActivity::High => 0.3,
            HumanActivity::Medium => 0.2,
            HumanActivity::Low => 0.1,
        }
    }
}

/// Fuel moisture fraction from temperature (°C), humidity (%) and rain (mm/h).
///
/// Without rain the estimate stays in 0-0.4; with rain it stays in 0.4-1.0.
pub fn fuel_moisture(temp_c: f64, rh: f64, rain_mm: f64) -> f64 {
    if rain_mm <= 0.0 {
        let temp_factor = ((35.0 - temp_c) / 35.0).max(0.0);
        let m = 0.1 + temp_factor * 0.2 + rh / 100.0 * 0.3;
        m.max(0.0).min(0.4)
    } else {
        let rain_factor = (rain_mm / 10.0).min(1.0);
        let m = 0.5 + rain_factor * 0.4 + rh / 100.0 * 0.1;
        m.max(0.4).min(1.0)
    }
}

/// Inputs handed to a risk provider for one grid point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskFeatures {
    pub lat: f64,
    pub lon: f64,
    pub hour_offset: i32,
    /// °C
    pub temp: f64,
    /// %
    pub rh: f64,
    /// m/s
    pub wind: f64,
    /// degrees
    pub wind_dir: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vegetation_regions() {
        assert_eq!(VegetationType::from_location(41.0, 29.0), VegetationType::MixedForest);
        assert_eq!(
            VegetationType::from_location(38.5, 27.2),
            VegetationType::MediterraneanForest
        );
        assert_eq!(VegetationType::from_location(36.9, 29.5), VegetationType::PineForest);
        assert_eq!(VegetationType::from_location(39.9, 32.8), VegetationType::Steppe);
        assert_eq!(
            VegetationType::from_location(41.0, 39.7),
            VegetationType::DeciduousForest
        );
        // Outside every region
        assert_eq!(VegetationType::from_location(37.0, 37.4), VegetationType::MixedForest);
    }

    #[test]
    fn test_vegetation_first_region_wins_on_shared_edge() {
        // lat 40, lon 28 is on both the Marmara and Aegean boxes.
        assert_eq!(VegetationType::from_location(40.0, 28.0), VegetationType::MixedForest);
    }

    #[test]
    fn test_vegetation_factors() {
        assert_eq!(VegetationType::PineForest.risk_factor(), 0.9);
        assert_eq!(VegetationType::Steppe.risk_factor(), 0.4);
        assert_eq!(VegetationType::Unknown.risk_factor(), 0.5);
        assert_eq!(VegetationType::MediterraneanForest.to_string(), "mediterranean_forest");
    }

    #[test]
    fn test_human_activity() {
        assert_eq!(HumanActivity::from_location(41.0, 29.0), HumanActivity::High);
        assert_eq!(HumanActivity::from_location(36.9, 30.6), HumanActivity::Medium);
        assert_eq!(HumanActivity::from_location(38.0, 35.0), HumanActivity::Low);
        assert_eq!(HumanActivity::Medium.risk_factor(), 0.2);
    }

    #[test]
    fn test_fuel_moisture_dry_branch() {
        // 0.1 + (5/35)*0.2 + 0.2*0.3 = 0.18857
        let m = fuel_moisture(30.0, 20.0, 0.0);
        assert!((m - 0.188_571).abs() < 1e-5);
        // Cold and humid caps at 0.4.
        assert_eq!(fuel_moisture(0.0, 100.0, 0.0), 0.4);
    }

    #[test]
    fn test_fuel_moisture_wet_branch() {
        // 0.5 + 0.2*0.4 + 0.5*0.1 = 0.63
        let m = fuel_moisture(20.0, 50.0, 2.0);
        assert!((m - 0.63).abs() < 1e-9);
        assert_eq!(fuel_moisture(20.0, 100.0, 50.0), 1.0);
    }
}
