//! GeoJSON output types for scored grids.
//!
//! A nowcast is returned as a `FeatureCollection` of `Point` features, one
//! per scored grid cell, with the risk and the weather snapshot that produced
//! it in `properties`.

use serde::{Deserialize, Serialize};

/// A GeoJSON FeatureCollection of risk points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskFeatureCollection {
    /// Type identifier (always "FeatureCollection").
    #[serde(rename = "type")]
    pub type_: String,

    pub features: Vec<RiskPoint>,
}

impl RiskFeatureCollection {
    /// Create a new empty FeatureCollection.
    pub fn new() -> Self {
        Self {
            type_: "FeatureCollection".to_string(),
            features: Vec::new(),
        }
    }

    /// Add multiple features to the collection.
    pub fn with_features(mut self, features: Vec<RiskPoint>) -> Self {
        self.features.extend(features);
        self
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl Default for RiskFeatureCollection {
    fn default() -> Self {
        Self::new()
    }
}

/// One scored grid cell, serialized as a GeoJSON Feature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RiskPoint {
    /// Type identifier (always "Feature").
    #[serde(rename = "type")]
    pub type_: String,

    pub geometry: PointGeometry,

    pub properties: RiskProperties,
}

impl RiskPoint {
    /// Create a feature at (lon, lat) with the given properties.
    pub fn new(lon: f64, lat: f64, properties: RiskProperties) -> Self {
        Self {
            type_: "Feature".to_string(),
            geometry: PointGeometry::new(lon, lat),
            properties,
        }
    }

    pub fn lon(&self) -> f64 {
        self.geometry.coordinates[0]
    }

    pub fn lat(&self) -> f64 {
        self.geometry.coordinates[1]
    }

    pub fn risk(&self) -> f64 {
        self.properties.risk
    }
}

/// GeoJSON Point geometry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub type_: String,

    /// Coordinates as [longitude, latitude].
    pub coordinates: [f64; 2],
}

impl PointGeometry {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            type_: "Point".to_string(),
            coordinates: [lon, lat],
        }
    }
}

/// Properties attached to each risk point.
///
/// The weather snapshot is always present. The factor fields are only filled
/// by the polygon (VPD) pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RiskProperties {
    /// Fire risk in [0, 1].
    pub risk: f64,
    /// Temperature in °C.
    pub temp: f64,
    /// Relative humidity in percent.
    pub rh: f64,
    /// Wind speed in m/s.
    pub wind: f64,
    /// Wind direction in degrees.
    pub wind_dir: f64,

    /// Label of the provider that produced `risk`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_source: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_moisture: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vegetation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slope_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drought_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_days: Option<u32>,
    /// Model name and version, e.g. "hyper_model_vpd:v7".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// "City / District" containing the point, when districts are loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
}
