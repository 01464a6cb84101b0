//! Terrain slope factor from corner elevations.

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nowcast_common::{BoundingBox, NowcastError};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const OPEN_METEO_ELEVATION_URL: &str = "https://api.open-meteo.com/v1/elevation";

/// Elevation spread (σ, metres) at which the slope factor saturates.
const SIGMA_SATURATION_M: f64 = 300.0;

/// Provider of terrain elevations.
#[async_trait]
pub trait ElevationSource: Send + Sync {
    /// Elevations in metres for `(lon, lat)` points, in input order.
    async fn elevations(&self, points: &[(f64, f64)]) -> Result<Vec<f64>, NowcastError>;
}

#[derive(Debug, Deserialize)]
struct ElevationResponse {
    elevation: Vec<f64>,
}

/// Open-Meteo elevation API behind a shared rate limiter.
#[derive(Debug, Clone)]
pub struct OpenMeteoElevation {
    client: reqwest::Client,
    base_url: String,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl OpenMeteoElevation {
    /// Client allowing `requests_per_second` calls (at least one).
    pub fn new(client: reqwest::Client, requests_per_second: u32) -> Self {
        Self::with_base_url(client, OPEN_METEO_ELEVATION_URL, requests_per_second)
    }

    pub fn with_base_url(
        client: reqwest::Client,
        base_url: impl Into<String>,
        requests_per_second: u32,
    ) -> Self {
        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        Self {
            client,
            base_url: base_url.into(),
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(rate))),
        }
    }
}

#[async_trait]
impl ElevationSource for OpenMeteoElevation {
    async fn elevations(&self, points: &[(f64, f64)]) -> Result<Vec<f64>, NowcastError> {
        let join = |f: fn(&(f64, f64)) -> f64| {
            points
                .iter()
                .map(|p| format!("{:.4}", f(p)))
                .collect::<Vec<_>>()
                .join(",")
        };
        let latitude = join(|p| p.1);
        let longitude = join(|p| p.0);

        self.limiter.until_ready().await;

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("latitude", latitude), ("longitude", longitude)])
            .timeout(Duration::from_secs(10))
            .send()
            .await
            .map_err(|e| NowcastError::UpstreamUnavailable(format!("elevation request: {}", e)))?;

        if !resp.status().is_success() {
            return Err(NowcastError::UpstreamUnavailable(format!(
                "elevation API returned {}",
                resp.status()
            )));
        }

        let body: ElevationResponse = resp
            .json()
            .await
            .map_err(|e| NowcastError::UpstreamUnavailable(format!("elevation body: {}", e)))?;

        if body.elevation.len() != points.len() {
            return Err(NowcastError::UpstreamUnavailable(format!(
                "expected {} elevations, got {}",
                points.len(),
                body.elevation.len()
            )));
        }
        Ok(body.elevation)
    }
}

/// Slope factor from a set of elevations: `1 + min(1, σ/300)·0.5`.
///
/// σ is the population standard deviation; fewer than two values give 1.0.
pub fn slope_factor_from_elevations(elevations: &[f64]) -> f64 {
    if elevations.len() < 2 || elevations.iter().any(|e| !e.is_finite()) {
        return 1.0;
    }
    let n = elevations.len() as f64;
    let mean = elevations.iter().sum::<f64>() / n;
    let variance = elevations.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / n;
    1.0 + (variance.sqrt() / SIGMA_SATURATION_M).min(1.0) * 0.5
}

/// Computes the slope modifier for a region.
#[derive(Clone)]
pub struct TerrainService {
    source: Arc<dyn ElevationSource>,
}

impl TerrainService {
    pub fn new(source: Arc<dyn ElevationSource>) -> Self {
        Self { source }
    }

    /// Slope factor over the four corners of `bbox`; 1.0 if elevations are unavailable.
    pub async fn slope_factor(&self, bbox: &BoundingBox) -> f64 {
        match self.source.elevations(&bbox.corners()).await {
            Ok(elevations) => {
                let factor = slope_factor_from_elevations(&elevations);
                debug!(?elevations, factor, "Computed slope factor");
                factor
            }
            Err(e) => {
                warn!(error = %e, "Elevation lookup failed, using flat terrain");
                1.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<f64>);

    #[async_trait]
    impl ElevationSource for Fixed {
        async fn elevations(&self, _points: &[(f64, f64)]) -> Result<Vec<f64>, NowcastError> {
            Ok(self.0.clone())
        }
    }

    struct Down;

    #[async_trait]
    impl ElevationSource for Down {
        async fn elevations(&self, _points: &[(f64, f64)]) -> Result<Vec<f64>, NowcastError> {
            Err(NowcastError::UpstreamUnavailable("down".to_string()))
        }
    }

    #[test]
    fn test_flat_terrain() {
        assert_eq!(slope_factor_from_elevations(&[120.0; 4]), 1.0);
        assert_eq!(slope_factor_from_elevations(&[]), 1.0);
    }

    #[test]
    fn test_sigma_scaling() {
        // σ = 150 → 1 + 0.5·0.5
        let f = slope_factor_from_elevations(&[0.0, 300.0, 0.0, 300.0]);
        assert!((f - 1.25).abs() < 1e-12);
        // Saturates at 1.5
        assert_eq!(slope_factor_from_elevations(&[0.0, 2000.0, 0.0, 2000.0]), 1.5);
    }

    #[tokio::test]
    async fn test_service_uses_source() {
        let bbox = BoundingBox::new(30.0, 36.5, 31.0, 37.5);
        let service = TerrainService::new(Arc::new(Fixed(vec![0.0, 300.0, 0.0, 300.0])));
        assert!((service.slope_factor(&bbox).await - 1.25).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_service_failure_is_flat() {
        let bbox = BoundingBox::new(30.0, 36.5, 31.0, 37.5);
        let service = TerrainService::new(Arc::new(Down));
        assert_eq!(service.slope_factor(&bbox).await, 1.0);
    }
}
