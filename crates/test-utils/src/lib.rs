//! Shared test utilities for the wildfire nowcast workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Fixed bounding boxes, weather samples and upstream response bodies
//! - District datasets written to temporary files
//! - Mock [`weather_client::WeatherSource`] implementations that count calls,
//!   including one that replays recorded upstream bodies through the parsers
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../../crates/test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, StaticSource};
//! ```

pub mod fixtures;
pub mod sources;

pub use fixtures::*;
pub use sources::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(0.8067_f64, 0.8067_f64, 1e-9); // passes
/// assert_approx_eq!(0.81_f64, 0.80_f64, 0.001);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro for approximate equality of (lon, lat) pairs.
#[macro_export]
macro_rules! assert_coords_approx_eq {
    (($x1:expr, $y1:expr), ($x2:expr, $y2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($x1, $x2, $epsilon);
        $crate::assert_approx_eq!($y1, $y2, $epsilon);
    }};
}

/// Assert that a risk value lies in [0, 1].
#[macro_export]
macro_rules! assert_unit_interval {
    ($value:expr) => {{
        let v: f64 = $value;
        assert!((0.0..=1.0).contains(&v), "value {} outside [0, 1]", v);
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(0.0, 0.0, 0.0001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_assert_coords_approx_eq_passes() {
        assert_coords_approx_eq!((29.0001, 41.0001), (29.0, 41.0), 0.001);
    }

    #[test]
    #[should_panic(expected = "outside [0, 1]")]
    fn test_assert_unit_interval_fails() {
        assert_unit_interval!(1.2);
    }
}
