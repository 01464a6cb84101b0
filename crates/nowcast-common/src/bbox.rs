//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

use crate::error::NowcastError;

/// A geographic bounding box in EPSG:4326 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Check that all corners are finite and the box is not inverted.
    ///
    /// Degenerate boxes (zero width or height) are accepted; the grid
    /// generator collapses them to a single row or column.
    pub fn validate(&self) -> Result<(), NowcastError> {
        let corners = [self.min_lon, self.min_lat, self.max_lon, self.max_lat];
        if corners.iter().any(|v| !v.is_finite()) {
            return Err(NowcastError::InvalidBbox(format!(
                "non-finite coordinate in {:?}",
                corners
            )));
        }
        if self.min_lon > self.max_lon || self.min_lat > self.max_lat {
            return Err(NowcastError::InvalidBbox(format!(
                "min exceeds max: {},{},{},{}",
                self.min_lon, self.min_lat, self.max_lon, self.max_lat
            )));
        }
        if self.min_lat < -90.0 || self.max_lat > 90.0 {
            return Err(NowcastError::InvalidBbox(format!(
                "latitude out of range: {}..{}",
                self.min_lat, self.max_lat
            )));
        }
        Ok(())
    }

    /// Centre of the box as (lon, lat).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    /// The four corners as (lon, lat): SW, SE, NW, NE.
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.min_lon, self.min_lat),
            (self.max_lon, self.min_lat),
            (self.min_lon, self.max_lat),
            (self.max_lon, self.max_lat),
        ]
    }

    /// Check if a point is contained within this bbox (edges inclusive).
    pub fn contains_point(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }

    /// Grow this box so it also covers `other`.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_lon: self.min_lon.min(other.min_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lon: self.max_lon.max(other.max_lon),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }
}
