//! Pluggable risk scoring.
//!
//! A [`RiskProvider`] turns point features into a risk in [0, 1]. The remote
//! variant delegates to an external scoring service and silently falls back
//! to the heuristic on any failure.

use metrics::counter;
use nowcast_common::NowcastError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use crate::features::RiskFeatures;
use crate::heuristic::{clamp01, heuristic_risk};

pub const HEURISTIC_LABEL: &str = "heuristic";
pub const REMOTE_LABEL: &str = "ai";

/// Provider selected by name on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Heuristic,
    Ai,
}

impl FromStr for ProviderKind {
    type Err = NowcastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heuristic" => Ok(ProviderKind::Heuristic),
            "ai" => Ok(ProviderKind::Ai),
            other => Err(NowcastError::invalid_parameter(
                "provider",
                format!("unknown provider '{}', expected 'heuristic' or 'ai'", other),
            )),
        }
    }
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Heuristic => HEURISTIC_LABEL,
            ProviderKind::Ai => REMOTE_LABEL,
        }
    }
}

/// A risk value and the label of whoever actually produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredRisk {
    pub risk: f64,
    pub source: &'static str,
}

#[derive(Debug, Serialize)]
struct ScoreRequest {
    lat: f64,
    lon: f64,
    hour_offset: i32,
    features: ScoreFeatures,
}

#[derive(Debug, Serialize)]
struct ScoreFeatures {
    temp: f64,
    rh: f64,
    wind: f64,
    wind_dir: f64,
}

#[derive(Debug, Deserialize)]
struct ScoreResponse {
    risk: f64,
}

/// Client for an external `POST /score` endpoint.
#[derive(Debug, Clone)]
pub struct RemoteDelegate {
    client: reqwest::Client,
    endpoint: Option<String>,
    timeout: Duration,
}

impl RemoteDelegate {
    /// `endpoint` is the service base URL; `None` or blank means unconfigured.
    pub fn new(client: reqwest::Client, endpoint: Option<String>, timeout: Duration) -> Self {
        let endpoint = endpoint
            .map(|e| e.trim().trim_end_matches('/').to_string())
            .filter(|e| !e.is_empty());
        Self {
            client,
            endpoint,
            timeout,
        }
    }

    /// A delegate that always falls back.
    pub fn unconfigured() -> Self {
        Self::new(reqwest::Client::new(), None, Duration::from_secs(5))
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    async fn request(&self, features: &RiskFeatures) -> Result<f64, NowcastError> {
        let base = self
            .endpoint
            .as_deref()
            .ok_or_else(|| NowcastError::Provider("no scoring endpoint configured".to_string()))?;

        let payload = ScoreRequest {
            lat: features.lat,
            lon: features.lon,
            hour_offset: features.hour_offset,
            features: ScoreFeatures {
                temp: features.temp,
                rh: features.rh,
                wind: features.wind,
                wind_dir: features.wind_dir,
            },
        };

        let resp = self
            .client
            .post(format!("{}/score", base))
            .json(&payload)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| NowcastError::Provider(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(NowcastError::Provider(format!(
                "scoring endpoint returned {}",
                resp.status()
            )));
        }

        let body: ScoreResponse = resp
            .json()
            .await
            .map_err(|e| NowcastError::Provider(format!("bad scoring response: {}", e)))?;

        if !body.risk.is_finite() {
            return Err(NowcastError::Provider(format!(
                "non-finite risk {}",
                body.risk
            )));
        }
        Ok(clamp01(body.risk))
    }
}

/// Scoring strategy for bbox nowcasts.
#[derive(Debug, Clone)]
pub enum RiskProvider {
    Heuristic,
    Remote(RemoteDelegate),
}

impl RiskProvider {
    pub fn label(&self) -> &'static str {
        match self {
            RiskProvider::Heuristic => HEURISTIC_LABEL,
            RiskProvider::Remote(_) => REMOTE_LABEL,
        }
    }

    /// Risk in [0, 1].
    pub async fn score(&self, features: &RiskFeatures) -> f64 {
        self.score_with_source(features).await.risk
    }

    /// Risk plus the label of the provider that produced it after any fallback.
    pub async fn score_with_source(&self, features: &RiskFeatures) -> ScoredRisk {
        let heuristic = || ScoredRisk {
            risk: heuristic_risk(features.temp, features.rh, features.wind),
            source: HEURISTIC_LABEL,
        };

        match self {
            RiskProvider::Heuristic => heuristic(),
            RiskProvider::Remote(delegate) => match delegate.request(features).await {
                Ok(risk) => ScoredRisk {
                    risk,
                    source: REMOTE_LABEL,
                },
                Err(e) => {
                    counter!("nowcast_provider_fallbacks_total").increment(1);
                    debug!(error = %e, "Remote scoring failed, using heuristic");
                    heuristic()
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> RiskFeatures {
        RiskFeatures {
            lat: 38.4,
            lon: 27.1,
            hour_offset: 0,
            temp: 30.0,
            rh: 20.0,
            wind: 10.0,
            wind_dir: 0.0,
        }
    }

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("heuristic".parse::<ProviderKind>().unwrap(), ProviderKind::Heuristic);
        assert_eq!(" AI ".parse::<ProviderKind>().unwrap(), ProviderKind::Ai);
        let err = "neural".parse::<ProviderKind>().unwrap_err();
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_blank_endpoint_is_unconfigured() {
        let d = RemoteDelegate::new(reqwest::Client::new(), Some("  ".into()), Duration::from_secs(1));
        assert!(!d.is_configured());
        let d = RemoteDelegate::new(
            reqwest::Client::new(),
            Some("http://scorer:8001/".into()),
            Duration::from_secs(1),
        );
        assert_eq!(d.endpoint(), Some("http://scorer:8001"));
    }

    #[tokio::test]
    async fn test_heuristic_label_and_score() {
        let scored = RiskProvider::Heuristic.score_with_source(&features()).await;
        assert_eq!(scored.source, "heuristic");
        assert!((scored.risk - heuristic_risk(30.0, 20.0, 10.0)).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_unconfigured_remote_falls_back() {
        let provider = RiskProvider::Remote(RemoteDelegate::unconfigured());
        assert_eq!(provider.label(), "ai");

        let scored = provider.score_with_source(&features()).await;
        assert_eq!(scored.source, "heuristic");
        assert_eq!(scored.risk, heuristic_risk(30.0, 20.0, 10.0));
    }
}
