//! Wildfire risk engine.
//!
//! Turns a bounding box or polygon into a scored grid of risk points:
//!
//! - [`grid`]: evenly spaced lon/lat grids and polygon membership
//! - [`interpolation`]: inverse distance weighting of sampled weather
//! - [`heuristic`], [`vpd`]: the two risk models, with [`features`],
//!   [`drought`] and [`terrain`] supplying their derived inputs
//! - [`provider`]: local or remote scoring with heuristic fallback
//! - [`zones`], [`districts`]: quadrant and district summaries
//! - [`nowcast`]: the end-to-end pipelines over a [`weather_client::WeatherFetcher`]

pub mod districts;
pub mod drought;
pub mod features;
pub mod grid;
pub mod heuristic;
pub mod interpolation;
pub mod nowcast;
pub mod provider;
pub mod terrain;
pub mod vpd;
pub mod zones;

pub use districts::{aggregate_districts, District, DistrictIndex, DistrictSummary};
pub use drought::{count_dry_days, drought_factor};
pub use features::{fuel_moisture, HumanActivity, RiskFeatures, VegetationType};
pub use grid::{linspace, GridSpec};
pub use heuristic::heuristic_risk;
pub use interpolation::{idw, interpolate_weather, Sample, Station};
pub use nowcast::{
    BboxRequest, NowcastConfig, NowcastEngine, NowcastSummary, PolygonRequest, SummaryRequest,
};
pub use provider::{ProviderKind, RemoteDelegate, RiskProvider, ScoredRisk};
pub use terrain::{ElevationSource, OpenMeteoElevation, TerrainService};
pub use zones::{aggregate_zones, Zone, ZoneSummary};
