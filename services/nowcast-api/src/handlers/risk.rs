//! Nowcast, polygon nowcast and summary handlers.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Query,
    },
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;
use nowcast_common::{BoundingBox, Geometry, NowcastError};
use risk_engine::{BboxRequest, PolygonRequest, ProviderKind, SummaryRequest};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::common::{bad_request, nowcast_error_response};
use crate::state::AppState;

/// Default grid resolution for `/risk/nowcast`.
pub const NOWCAST_DEFAULT_AXIS: usize = 36;
/// Default grid resolution for `/risk/summary`.
pub const SUMMARY_DEFAULT_AXIS: usize = 24;

pub const DEFAULT_POLYGON_MODEL: &str = "hyper_model_vpd";
pub const DEFAULT_POLYGON_VERSION: &str = "7";

/// Query parameters shared by the grid endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridQueryParams {
    pub min_lon: Option<f64>,
    pub min_lat: Option<f64>,
    pub max_lon: Option<f64>,
    pub max_lat: Option<f64>,
    pub nx: Option<usize>,
    pub ny: Option<usize>,
    pub hour_offset: Option<i32>,
    /// "heuristic" or "ai".
    pub provider: Option<String>,
    /// Summary only: city whose districts are ranked.
    pub city: Option<String>,
}

impl GridQueryParams {
    pub fn bbox(&self) -> Result<BoundingBox, NowcastError> {
        match (self.min_lon, self.min_lat, self.max_lon, self.max_lat) {
            (Some(min_lon), Some(min_lat), Some(max_lon), Some(max_lat)) => {
                Ok(BoundingBox::new(min_lon, min_lat, max_lon, max_lat))
            }
            _ => Err(NowcastError::InvalidBbox(
                "minLon, minLat, maxLon and maxLat are required".to_string(),
            )),
        }
    }

    pub fn to_request(&self, default_axis: usize) -> Result<BboxRequest, NowcastError> {
        let provider = match self.provider.as_deref() {
            Some(p) if !p.trim().is_empty() => p.parse::<ProviderKind>()?,
            _ => ProviderKind::default(),
        };
        Ok(BboxRequest {
            bbox: self.bbox()?,
            nx: self.nx.unwrap_or(default_axis),
            ny: self.ny.unwrap_or(default_axis),
            hour_offset: self.hour_offset.unwrap_or(0),
            provider,
        })
    }
}

/// Query parameters for the polygon endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonQueryParams {
    pub hour_offset: Option<i32>,
    /// Model name reported in each point's `provider` property.
    pub provider: Option<String>,
    pub version: Option<String>,
}

/// Accept a GeoJSON Feature (name taken from `properties.name`) or a bare geometry.
pub fn parse_polygon_body(body: &Value) -> Result<(Geometry, Option<String>), NowcastError> {
    let (geometry, name) = match body.get("type").and_then(Value::as_str) {
        Some("Feature") => {
            let geometry = body
                .get("geometry")
                .filter(|g| !g.is_null())
                .ok_or_else(|| NowcastError::InvalidGeometry("feature has no geometry".into()))?;
            let name = body
                .pointer("/properties/name")
                .and_then(Value::as_str)
                .map(str::to_string);
            (geometry, name)
        }
        _ => (body, None),
    };
    Ok((Geometry::from_geojson(geometry)?, name))
}

/// GET /risk/nowcast
pub async fn nowcast_handler(
    Extension(state): Extension<Arc<AppState>>,
    params: Result<Query<GridQueryParams>, QueryRejection>,
) -> Response {
    counter!("nowcast_requests_total", "endpoint" => "nowcast").increment(1);

    let Query(params) = match params {
        Ok(p) => p,
        Err(e) => return bad_request(e.body_text()),
    };
    let req = match params.to_request(NOWCAST_DEFAULT_AXIS) {
        Ok(r) => r,
        Err(e) => return nowcast_error_response(&e),
    };

    match state.engine.bbox_nowcast(&req).await {
        Ok(fc) => Json(fc).into_response(),
        Err(e) => nowcast_error_response(&e),
    }
}

/// POST /risk/nowcast_by_polygon
pub async fn polygon_handler(
    Extension(state): Extension<Arc<AppState>>,
    params: Result<Query<PolygonQueryParams>, QueryRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    counter!("nowcast_requests_total", "endpoint" => "nowcast_by_polygon").increment(1);

    let Query(params) = match params {
        Ok(p) => p,
        Err(e) => return bad_request(e.body_text()),
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return bad_request(e.body_text()),
    };
    let (geometry, name) = match parse_polygon_body(&body) {
        Ok(parsed) => parsed,
        Err(e) => return nowcast_error_response(&e),
    };

    let req = PolygonRequest {
        geometry,
        name,
        hour_offset: params.hour_offset.unwrap_or(0),
        model: params
            .provider
            .unwrap_or_else(|| DEFAULT_POLYGON_MODEL.to_string()),
        version: params
            .version
            .unwrap_or_else(|| DEFAULT_POLYGON_VERSION.to_string()),
    };

    match state.engine.polygon_nowcast(&req).await {
        Ok(fc) => Json(fc).into_response(),
        Err(e) => nowcast_error_response(&e),
    }
}

/// GET /risk/summary
pub async fn summary_handler(
    Extension(state): Extension<Arc<AppState>>,
    params: Result<Query<GridQueryParams>, QueryRejection>,
) -> Response {
    counter!("nowcast_requests_total", "endpoint" => "summary").increment(1);

    let Query(params) = match params {
        Ok(p) => p,
        Err(e) => return bad_request(e.body_text()),
    };
    let grid = match params.to_request(SUMMARY_DEFAULT_AXIS) {
        Ok(r) => r,
        Err(e) => return nowcast_error_response(&e),
    };
    let req = SummaryRequest {
        grid,
        city: params.city,
    };

    match state.engine.summary(&req).await {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => nowcast_error_response(&e),
    }
}
