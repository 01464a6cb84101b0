//! Service configuration loading and types.

use anyhow::{Context, Result};
use risk_engine::NowcastConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use weather_client::FetchConfig;

/// Tunables loaded from an optional YAML file; absent keys keep their defaults.
///
/// ```yaml
/// fetch:
///   bucket_step: 0.25
///   ttl_secs: 300
/// nowcast:
///   max_axis_points: 200
/// remote_timeout_secs: 5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub fetch: FetchConfig,
    pub nowcast: NowcastConfig,

    /// Timeout for one remote scoring call.
    pub remote_timeout_secs: u64,

    /// Query elevations for the polygon slope factor.
    pub terrain_enabled: bool,

    /// Elevation API request budget.
    pub elevation_requests_per_second: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            nowcast: NowcastConfig::default(),
            remote_timeout_secs: 5,
            terrain_enabled: true,
            elevation_requests_per_second: 5,
        }
    }
}

impl ServiceConfig {
    /// Load from a YAML file. A missing file falls back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Nowcast config file does not exist, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {:?}", path))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse: {:?}", path))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}
