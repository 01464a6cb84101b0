//! Remote scoring against a local HTTP server, including fallback paths.

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use risk_engine::{
    BboxRequest, NowcastConfig, NowcastEngine, ProviderKind, RemoteDelegate, RiskFeatures,
    RiskProvider,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::Duration;
use test_utils::fixtures::{self, bbox, hot_dry};
use test_utils::StaticSource;
use weather_client::{FetchConfig, WeatherFetcher};

async fn spawn_scorer(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn delegate(endpoint: String) -> RemoteDelegate {
    RemoteDelegate::new(reqwest::Client::new(), Some(endpoint), Duration::from_secs(2))
}

fn features() -> RiskFeatures {
    RiskFeatures {
        lat: 38.4,
        lon: 27.1,
        hour_offset: 2,
        temp: 35.0,
        rh: 20.0,
        wind: 12.0,
        wind_dir: 225.0,
    }
}

fn ai_engine(remote: RemoteDelegate) -> NowcastEngine {
    let source = StaticSource::shared(fixtures::hot_dry_sample());
    let fetcher = WeatherFetcher::new(source, FetchConfig::default()).unwrap();
    NowcastEngine::new(fetcher, NowcastConfig::default()).with_remote(remote)
}

fn ai_request() -> BboxRequest {
    BboxRequest {
        bbox: fixtures::bounding_box(bbox::UNIT),
        nx: 2,
        ny: 2,
        hour_offset: 0,
        provider: ProviderKind::Ai,
    }
}

// ============================================================================
// Successful delegation
// ============================================================================

#[tokio::test]
async fn test_remote_score_is_used() {
    let app = Router::new().route("/score", post(|| async { Json(json!({"risk": 0.42})) }));
    let addr = spawn_scorer(app).await;

    let provider = RiskProvider::Remote(delegate(format!("http://{}", addr)));
    let scored = provider.score_with_source(&features()).await;

    assert_eq!(scored.risk, 0.42);
    assert_eq!(scored.source, "ai");
}

#[tokio::test]
async fn test_remote_receives_features_payload() {
    // Echo temp/100 so the assertion proves the payload shape.
    let app = Router::new().route(
        "/score",
        post(|Json(body): Json<Value>| async move {
            let temp = body["features"]["temp"].as_f64().unwrap_or(0.0);
            let hour = body["hour_offset"].as_i64().unwrap_or(-1);
            Json(json!({"risk": temp / 100.0 + hour as f64 / 100.0}))
        }),
    );
    let addr = spawn_scorer(app).await;

    let provider = RiskProvider::Remote(delegate(format!("http://{}/", addr)));
    let risk = provider.score(&features()).await;

    assert!((risk - 0.37).abs() < 1e-9);
}

#[tokio::test]
async fn test_remote_risk_is_clamped() {
    let app = Router::new().route("/score", post(|| async { Json(json!({"risk": 1.7})) }));
    let addr = spawn_scorer(app).await;

    let provider = RiskProvider::Remote(delegate(format!("http://{}", addr)));
    let scored = provider.score_with_source(&features()).await;

    assert_eq!(scored.risk, 1.0);
    assert_eq!(scored.source, "ai");
}

#[tokio::test]
async fn test_bbox_nowcast_with_remote_provider() {
    let app = Router::new().route("/score", post(|| async { Json(json!({"risk": 0.42})) }));
    let addr = spawn_scorer(app).await;

    let engine = ai_engine(delegate(format!("http://{}", addr)));
    let fc = engine.bbox_nowcast(&ai_request()).await.unwrap();

    assert_eq!(fc.len(), 4);
    for p in &fc.features {
        assert_eq!(p.risk(), 0.42);
        assert_eq!(p.properties.risk_source.as_deref(), Some("ai"));
    }
}

// ============================================================================
// Fallback
// ============================================================================

#[tokio::test]
async fn test_server_error_falls_back_to_heuristic() {
    let app = Router::new().route(
        "/score",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let addr = spawn_scorer(app).await;

    let provider = RiskProvider::Remote(delegate(format!("http://{}", addr)));
    let scored = provider.score_with_source(&features()).await;

    assert_eq!(scored.source, "heuristic");
    assert!((scored.risk - 0.94).abs() < 1e-9);
}

#[tokio::test]
async fn test_malformed_body_falls_back_to_heuristic() {
    let app = Router::new().route("/score", post(|| async { Json(json!({"score": 0.5})) }));
    let addr = spawn_scorer(app).await;

    let provider = RiskProvider::Remote(delegate(format!("http://{}", addr)));
    assert_eq!(provider.score_with_source(&features()).await.source, "heuristic");
}

#[tokio::test]
async fn test_unreachable_endpoint_falls_back() {
    let engine = ai_engine(delegate("http://127.0.0.1:1".to_string()));
    let fc = engine.bbox_nowcast(&ai_request()).await.unwrap();

    assert_eq!(fc.len(), 4);
    for p in &fc.features {
        assert_eq!(p.risk(), hot_dry::RISK_2DP);
        assert_eq!(p.properties.risk_source.as_deref(), Some("heuristic"));
    }
}

#[tokio::test]
async fn test_unconfigured_remote_reports_heuristic_source() {
    let engine = ai_engine(RemoteDelegate::unconfigured());
    let fc = engine.bbox_nowcast(&ai_request()).await.unwrap();

    assert!(fc
        .features
        .iter()
        .all(|p| p.properties.risk_source.as_deref() == Some("heuristic")));
}
