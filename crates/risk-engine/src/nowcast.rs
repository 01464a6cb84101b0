//! Nowcast pipelines: bbox grid, polygon (VPD) grid and zone summary.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use nowcast_common::{
    round_to, BoundingBox, Geometry, NowcastError, RiskFeatureCollection, RiskPoint,
    RiskProperties, WeatherSample,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use weather_client::{BucketKey, WeatherFetcher};

use crate::districts::{
    aggregate_districts, District, DistrictIndex, DistrictSummary, DEFAULT_DISTRICT_LIMIT,
};
use crate::drought::{count_dry_days, drought_factor};
use crate::features::RiskFeatures;
use crate::grid::{GridSpec, DEFAULT_MAX_AXIS_POINTS};
use crate::interpolation::{interpolate_weather, Station, DEFAULT_POWER};
use crate::provider::{ProviderKind, RemoteDelegate, RiskProvider};
use crate::terrain::TerrainService;
use crate::vpd::{self, VpdInputs};
use crate::zones::{aggregate_zones, ZoneSummary};

/// Pipeline tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NowcastConfig {
    /// Maximum `nx` / `ny` accepted on bbox requests.
    pub max_axis_points: usize,
    /// Points per axis over a polygon's bounds.
    pub polygon_grid_size: usize,
    pub idw_power: f64,
    /// Points scored concurrently by a remote provider.
    pub provider_concurrency: usize,
    /// Polygon risk at or above which a hotspot is logged.
    pub high_risk_threshold: f64,
}

impl Default for NowcastConfig {
    fn default() -> Self {
        Self {
            max_axis_points: DEFAULT_MAX_AXIS_POINTS,
            polygon_grid_size: 20,
            idw_power: DEFAULT_POWER,
            provider_concurrency: 16,
            high_risk_threshold: 0.70,
        }
    }
}

/// Heuristic (or remote) risk over a regular bbox grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BboxRequest {
    pub bbox: BoundingBox,
    pub nx: usize,
    pub ny: usize,
    pub hour_offset: i32,
    pub provider: ProviderKind,
}

/// VPD risk over the grid points inside a polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonRequest {
    pub geometry: Geometry,
    /// Display name of the area, used in logs.
    pub name: Option<String>,
    pub hour_offset: i32,
    /// Model name reported in the `provider` property.
    pub model: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRequest {
    pub grid: BboxRequest,
    pub city: Option<String>,
}

/// Zone and district summary of a bbox nowcast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NowcastSummary {
    pub zones: Vec<ZoneSummary>,
    pub districts: Vec<DistrictSummary>,
    pub count: usize,
    pub provider: String,
}

/// Ties the fetcher, scoring providers and terrain/district data together.
#[derive(Clone)]
pub struct NowcastEngine {
    fetcher: WeatherFetcher,
    remote: RemoteDelegate,
    terrain: Option<TerrainService>,
    districts: Arc<DistrictIndex>,
    config: NowcastConfig,
}

impl NowcastEngine {
    /// Engine with no remote scorer, flat terrain and no districts.
    pub fn new(fetcher: WeatherFetcher, config: NowcastConfig) -> Self {
        Self {
            fetcher,
            remote: RemoteDelegate::unconfigured(),
            terrain: None,
            districts: Arc::new(DistrictIndex::empty()),
            config,
        }
    }

    pub fn with_remote(mut self, remote: RemoteDelegate) -> Self {
        self.remote = remote;
        self
    }

    pub fn with_terrain(mut self, terrain: TerrainService) -> Self {
        self.terrain = Some(terrain);
        self
    }

    pub fn with_districts(mut self, districts: Arc<DistrictIndex>) -> Self {
        self.districts = districts;
        self
    }

    pub fn fetcher(&self) -> &WeatherFetcher {
        &self.fetcher
    }

    pub fn districts(&self) -> &DistrictIndex {
        &self.districts
    }

    pub fn config(&self) -> &NowcastConfig {
        &self.config
    }

    /// Whether a remote scoring endpoint is set.
    pub fn remote_configured(&self) -> bool {
        self.remote.is_configured()
    }

    /// Provider for a requested kind.
    pub fn provider(&self, kind: ProviderKind) -> RiskProvider {
        match kind {
            ProviderKind::Heuristic => RiskProvider::Heuristic,
            ProviderKind::Ai => RiskProvider::Remote(self.remote.clone()),
        }
    }

    /// Score every grid point of a bbox whose weather bucket resolves.
    #[instrument(skip(self, req), fields(nx = req.nx, ny = req.ny, hour_offset = req.hour_offset))]
    pub async fn bbox_nowcast(
        &self,
        req: &BboxRequest,
    ) -> Result<RiskFeatureCollection, NowcastError> {
        let grid = GridSpec::new(req.bbox, req.nx, req.ny, self.config.max_axis_points)?;

        let keyed: Vec<((f64, f64), BucketKey)> = grid
            .points()
            .into_iter()
            .map(|(lon, lat)| ((lon, lat), self.fetcher.bucket(lat, lon, req.hour_offset)))
            .collect();
        let keys: Vec<BucketKey> = keyed.iter().map(|(_, key)| *key).collect();
        let weather = self.fetcher.resolve_all(keys).await;

        let provider = self.provider(req.provider);
        let hour_offset = req.hour_offset;

        // Scoring futures own their inputs so the stream holds no borrows.
        let jobs: Vec<((f64, f64), WeatherSample)> = keyed
            .iter()
            .filter_map(|(point, key)| weather.get(key).map(|sample| (*point, sample.clone())))
            .collect();

        let scorer = provider.clone();
        let features: Vec<RiskPoint> = stream::iter(jobs)
            .map(move |((lon, lat), sample)| {
                let provider = scorer.clone();
                async move {
                    let inputs = RiskFeatures {
                        lat,
                        lon,
                        hour_offset,
                        temp: sample.temperature_c,
                        rh: sample.relative_humidity,
                        wind: sample.wind_speed_ms,
                        wind_dir: sample.wind_direction_deg,
                    };
                    let scored = provider.score_with_source(&inputs).await;

                    RiskPoint::new(
                        lon,
                        lat,
                        RiskProperties {
                            risk: round_to(scored.risk, 2),
                            temp: round_to(sample.temperature_c, 1),
                            rh: round_to(sample.relative_humidity, 1),
                            wind: round_to(sample.wind_speed_ms, 1),
                            wind_dir: round_to(sample.wind_direction_deg, 1),
                            risk_source: Some(scored.source.to_string()),
                            ..Default::default()
                        },
                    )
                }
            })
            .buffered(self.config.provider_concurrency.max(1))
            .collect()
            .await;

        info!(
            points = grid.len(),
            buckets = weather.len(),
            emitted = features.len(),
            provider = provider.label(),
            "Bbox nowcast complete"
        );

        Ok(RiskFeatureCollection::new().with_features(features))
    }

    /// VPD risk over the polygon's interior, interpolated from five sampled points.
    #[instrument(
        skip(self, req),
        fields(name = req.name.as_deref().unwrap_or("unnamed"), hour_offset = req.hour_offset)
    )]
    pub async fn polygon_nowcast(
        &self,
        req: &PolygonRequest,
    ) -> Result<RiskFeatureCollection, NowcastError> {
        let bounds = req.geometry.bounds()?;
        let (center_lon, center_lat) = req.geometry.centroid()?;
        let now = Utc::now();

        let slope = async {
            match &self.terrain {
                Some(terrain) => terrain.slope_factor(&bounds).await,
                None => 1.0,
            }
        };
        let (slope_factor, center_forecast) =
            tokio::join!(slope, self.fetcher.forecast(center_lat, center_lon));

        let dry_days = match center_forecast {
            Ok(series) => count_dry_days(&series.entries, now),
            Err(e) => {
                warn!(error = %e, "Centre forecast unavailable, assuming no drought");
                0
            }
        };
        let drought = drought_factor(dry_days);

        let mut sample_points = bounds.corners().to_vec();
        sample_points.push((center_lon, center_lat));
        let keys: Vec<BucketKey> = sample_points
            .iter()
            .map(|&(lon, lat)| self.fetcher.bucket(lat, lon, req.hour_offset))
            .collect();
        let weather = self.fetcher.resolve_all(keys.iter().copied()).await;

        let stations: Vec<Station> = sample_points
            .iter()
            .zip(&keys)
            .filter_map(|(&(lon, lat), key)| {
                weather.get(key).map(|sample| Station {
                    lon,
                    lat,
                    sample: sample.clone(),
                })
            })
            .collect();

        if stations.is_empty() {
            warn!("No weather for any sample point, returning empty nowcast");
            return Ok(RiskFeatureCollection::new());
        }

        let n = self.config.polygon_grid_size;
        let grid = GridSpec::new(bounds, n, n, n.max(self.config.max_axis_points))?;
        let provider_label = format!("{}:v{}", req.model, req.version);

        let mut features = Vec::new();
        for (lon, lat) in grid.points_within(&req.geometry) {
            let Some(w) = interpolate_weather((lon, lat), &stations, self.config.idw_power) else {
                continue;
            };

            let assessment = vpd::assess(&VpdInputs {
                lat,
                lon,
                temp_c: w.temperature_c,
                rh: w.relative_humidity,
                wind_ms: w.wind_speed_ms,
                precipitation_mm: w.precipitation_mm,
                slope_factor,
                drought_factor: drought,
            });

            features.push(RiskPoint::new(
                lon,
                lat,
                RiskProperties {
                    risk: round_to(assessment.risk, 2),
                    temp: round_to(w.temperature_c, 1),
                    rh: w.relative_humidity.trunc(),
                    wind: round_to(w.wind_speed_ms, 1),
                    wind_dir: w.wind_direction_deg.trunc(),
                    risk_source: None,
                    fuel_moisture: Some(round_to(assessment.fuel_moisture, 2)),
                    vegetation: Some(assessment.vegetation.to_string()),
                    slope_factor: Some(round_to(slope_factor, 2)),
                    drought_factor: Some(round_to(drought, 2)),
                    dry_days: Some(dry_days),
                    provider: Some(provider_label.clone()),
                    district: self.districts.lookup(lon, lat).map(District::label),
                },
            ));
        }

        if let Some(peak) = features
            .iter()
            .filter(|p| p.risk() >= self.config.high_risk_threshold)
            .max_by(|a, b| a.risk().total_cmp(&b.risk()))
        {
            warn!(
                risk = peak.risk(),
                lon = peak.lon(),
                lat = peak.lat(),
                "High fire risk inside polygon"
            );
        }

        info!(
            stations = stations.len(),
            emitted = features.len(),
            slope_factor,
            dry_days,
            "Polygon nowcast complete"
        );

        Ok(RiskFeatureCollection::new().with_features(features))
    }

    /// Bbox nowcast reduced to quadrant means and, given a city, district means.
    pub async fn summary(&self, req: &SummaryRequest) -> Result<NowcastSummary, NowcastError> {
        let collection = self.bbox_nowcast(&req.grid).await?;

        let zones = aggregate_zones(&collection.features, &req.grid.bbox);
        let districts = match req.city.as_deref().map(str::trim) {
            Some(city) if !city.is_empty() => aggregate_districts(
                &collection.features,
                &self.districts,
                city,
                DEFAULT_DISTRICT_LIMIT,
            ),
            _ => Vec::new(),
        };

        Ok(NowcastSummary {
            zones,
            districts,
            count: collection.len(),
            provider: req.grid.provider.as_str().to_string(),
        })
    }
}
