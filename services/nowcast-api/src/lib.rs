//! Wildfire Nowcast API Service Library
//!
//! HTTP front end for the risk engine: bbox and polygon nowcasts, zone and
//! district summaries, health and Prometheus metrics.

pub mod config;
pub mod handlers;
pub mod state;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the service router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Risk
        .route("/risk/nowcast", get(handlers::risk::nowcast_handler))
        .route(
            "/risk/nowcast_by_polygon",
            post(handlers::risk::polygon_handler),
        )
        .route("/risk/summary", get(handlers::risk::summary_handler))
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/ready", get(handlers::health::ready_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
