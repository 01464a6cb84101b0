//! Application state for the nowcast API.

use anyhow::{bail, Context, Result};
use metrics_exporter_prometheus::PrometheusHandle;
use risk_engine::{DistrictIndex, NowcastEngine, OpenMeteoElevation, RemoteDelegate, TerrainService};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use weather_client::{
    OpenMeteoSource, OpenWeatherSource, WeatherCache, WeatherFetcher, WeatherSource,
};

use crate::config::ServiceConfig;

/// Upstream weather provider selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeatherSourceKind {
    #[default]
    OpenMeteo,
    OpenWeather,
}

impl FromStr for WeatherSourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "openmeteo" => Ok(Self::OpenMeteo),
            "openweather" | "openweathermap" | "owm" => Ok(Self::OpenWeather),
            other => bail!("unknown weather source '{}'", other),
        }
    }
}

/// Everything needed to assemble the application state.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub weather_source: WeatherSourceKind,
    pub openweather_api_key: Option<String>,
    pub ai_risk_url: Option<String>,
    pub districts_path: Option<PathBuf>,
    pub config: ServiceConfig,
}

/// Shared application state.
pub struct AppState {
    pub engine: NowcastEngine,

    /// Same cache the engine's fetcher writes to.
    pub cache: WeatherCache,

    /// Prometheus exporter, absent in tests.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(engine: NowcastEngine) -> Self {
        let cache = engine.fetcher().cache().clone();
        Self {
            engine,
            cache,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Build the engine and its collaborators from startup settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let config = &settings.config;

        let client = reqwest::Client::builder()
            .timeout(config.fetch.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;

        let source: Arc<dyn WeatherSource> = match settings.weather_source {
            WeatherSourceKind::OpenMeteo => Arc::new(OpenMeteoSource::new(client.clone())),
            WeatherSourceKind::OpenWeather => {
                let Some(key) = settings
                    .openweather_api_key
                    .as_deref()
                    .filter(|k| !k.trim().is_empty())
                else {
                    bail!("OPENWEATHER_API_KEY is required for the openweather source");
                };
                Arc::new(OpenWeatherSource::new(client.clone(), key))
            }
        };

        let fetcher = WeatherFetcher::with_cache(source, WeatherCache::new(), config.fetch.clone())
            .context("Invalid fetch configuration")?;

        let remote = RemoteDelegate::new(
            client.clone(),
            settings.ai_risk_url.clone(),
            Duration::from_secs(config.remote_timeout_secs),
        );

        let districts = match &settings.districts_path {
            Some(path) => DistrictIndex::load(path)
                .with_context(|| format!("Failed to load districts: {:?}", path))?,
            None => DistrictIndex::empty(),
        };

        info!(
            weather_source = fetcher.source_name(),
            remote_scoring = remote.is_configured(),
            districts = districts.len(),
            terrain = config.terrain_enabled,
            "Nowcast engine configured"
        );

        let mut engine = NowcastEngine::new(fetcher, config.nowcast.clone())
            .with_remote(remote)
            .with_districts(Arc::new(districts));

        if config.terrain_enabled {
            let elevation = OpenMeteoElevation::new(client, config.elevation_requests_per_second);
            engine = engine.with_terrain(TerrainService::new(Arc::new(elevation)));
        }

        Ok(Self::new(engine))
    }
}
