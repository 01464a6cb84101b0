//! Coordinate quantization into cache buckets.
//!
//! Keys hold the integer bucket index `round(v / step)` rather than the
//! rounded float, so hashing and equality never depend on float
//! representation. The decimal bucket centre is derived on demand.

use std::fmt;

use nowcast_common::NowcastError;

/// Default bucket size in degrees (roughly 25-30 km).
pub const DEFAULT_BUCKET_STEP: f64 = 0.25;

/// Decimal places kept on a quantized coordinate.
const BUCKET_DECIMALS: f64 = 1000.0;

fn round3(v: f64) -> f64 {
    (v * BUCKET_DECIMALS).round() / BUCKET_DECIMALS
}

/// Round `v` to the nearest multiple of `step`, kept to 3 decimals.
///
/// Idempotent for any `step` coarser than the 3-decimal rounding:
/// `quantize(quantize(v, s), s) == quantize(v, s)`.
pub fn quantize(v: f64, step: f64) -> f64 {
    round3((v / step).round() * step)
}

/// Cache/lookup key for one (lat, lon, hour offset) bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketKey {
    lat_index: i64,
    lon_index: i64,
    hour_offset: i32,
    /// Step in micro-degrees, so keys from different quantizers never collide.
    step_micro: u32,
}

impl BucketKey {
    /// Quantized latitude of the bucket centre.
    pub fn lat(&self) -> f64 {
        round3(self.lat_index as f64 * self.step())
    }

    /// Quantized longitude of the bucket centre.
    pub fn lon(&self) -> f64 {
        round3(self.lon_index as f64 * self.step())
    }

    pub fn hour_offset(&self) -> i32 {
        self.hour_offset
    }

    pub fn step(&self) -> f64 {
        f64::from(self.step_micro) / 1_000_000.0
    }

    pub fn indices(&self) -> (i64, i64) {
        (self.lat_index, self.lon_index)
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3},{:.3}@+{}h", self.lat(), self.lon(), self.hour_offset)
    }
}

/// Maps raw coordinates onto bucket keys for a fixed step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantizer {
    step: f64,
}

impl Quantizer {
    /// Create a quantizer; `step` must be finite and at least 0.001°.
    pub fn new(step: f64) -> Result<Self, NowcastError> {
        if !step.is_finite() || step < 0.001 {
            return Err(NowcastError::invalid_parameter(
                "bucket_step",
                format!("must be a finite value >= 0.001, got {}", step),
            ));
        }
        Ok(Self { step })
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    fn index(&self, v: f64) -> i64 {
        (v / self.step).round() as i64
    }

    /// Key for a raw coordinate and hour offset.
    pub fn bucket(&self, lat: f64, lon: f64, hour_offset: i32) -> BucketKey {
        BucketKey {
            lat_index: self.index(lat),
            lon_index: self.index(lon),
            hour_offset,
            step_micro: (self.step * 1_000_000.0).round() as u32,
        }
    }

    /// Quantized decimal value for a single coordinate.
    pub fn quantize(&self, v: f64) -> f64 {
        quantize(v, self.step)
    }
}

impl Default for Quantizer {
    fn default() -> Self {
        Self {
            step: DEFAULT_BUCKET_STEP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_idempotent() {
        for step in [0.25, 0.1, 0.5, 0.05, 1.0] {
            let mut x = -180.0;
            while x <= 180.0 {
                let q = quantize(x, step);
                assert_eq!(quantize(q, step), q, "x={} step={}", x, step);
                x += 0.0137;
            }
        }
    }

    #[test]
    fn test_quantize_values() {
        assert_eq!(quantize(41.01, 0.25), 41.0);
        assert_eq!(quantize(41.13, 0.25), 41.25);
        assert_eq!(quantize(-28.9784, 0.25), -29.0);
    }

    #[test]
    fn test_nearby_points_share_bucket() {
        let q = Quantizer::default();
        let a = q.bucket(41.01, 28.97, 0);
        let b = q.bucket(40.99, 29.05, 0);
        assert_eq!(a, b);
        assert_eq!(a.lat(), 41.0);
        assert_eq!(a.lon(), 29.0);
    }

    #[test]
    fn test_hour_offset_separates_buckets() {
        let q = Quantizer::default();
        assert_ne!(q.bucket(41.0, 29.0, 0), q.bucket(41.0, 29.0, 3));
    }

    #[test]
    fn test_key_matches_quantize() {
        let q = Quantizer::new(0.1).unwrap();
        let key = q.bucket(36.8969, 30.7133, 0);
        assert_eq!(key.lat(), quantize(36.8969, 0.1));
        assert_eq!(key.lon(), quantize(30.7133, 0.1));
        assert_eq!(key.to_string(), "36.900,30.700@+0h");
    }

    #[test]
    fn test_requantizing_key_is_stable() {
        let q = Quantizer::default();
        let key = q.bucket(38.4192, 27.1287, 6);
        assert_eq!(q.bucket(key.lat(), key.lon(), 6), key);
    }

    #[test]
    fn test_invalid_step() {
        assert!(Quantizer::new(0.0).is_err());
        assert!(Quantizer::new(f64::NAN).is_err());
    }
}
