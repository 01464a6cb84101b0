//! Common types and utilities shared across the wildfire nowcast crates.

pub mod bbox;
pub mod error;
pub mod features;
pub mod geometry;
pub mod weather;

pub use bbox::BoundingBox;
pub use error::{NowcastError, NowcastResult};
pub use features::{PointGeometry, RiskFeatureCollection, RiskPoint, RiskProperties};
pub use geometry::{point_in_polygon, Geometry, Polygon};
pub use weather::WeatherSample;

/// Round a value to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
