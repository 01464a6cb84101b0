//! Nowcast API Server
//!
//! Wildfire risk nowcasts over bounding boxes and polygons.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use nowcast_api::config::ServiceConfig;
use nowcast_api::state::{AppState, Settings, WeatherSourceKind};

/// Nowcast API Server
#[derive(Parser, Debug)]
#[command(name = "nowcast-api")]
#[command(about = "Wildfire risk nowcast server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8000", env = "NOWCAST_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "NOWCAST_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// Upstream weather provider: open-meteo or openweather
    #[arg(long, default_value = "open-meteo", env = "WEATHER_SOURCE")]
    weather_source: String,

    /// API key for the openweather source
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    openweather_api_key: Option<String>,

    /// Base URL of the remote risk scoring service
    #[arg(long, env = "AI_RISK_URL")]
    ai_risk_url: Option<String>,

    /// District GeoJSON dataset
    #[arg(long, env = "DISTRICTS_PATH")]
    districts_path: Option<PathBuf>,

    /// YAML file with fetch and nowcast tunables
    #[arg(long, default_value = "config/nowcast.yaml", env = "NOWCAST_CONFIG")]
    config: PathBuf,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(run_server(args))
}

async fn run_server(args: Args) -> Result<()> {
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    // Initialize Prometheus metrics exporter
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    info!("Starting nowcast API server");

    let settings = Settings {
        weather_source: args.weather_source.parse::<WeatherSourceKind>()?,
        openweather_api_key: args.openweather_api_key,
        ai_risk_url: args.ai_risk_url,
        districts_path: args.districts_path,
        config: ServiceConfig::load(&args.config)?,
    };

    let state = Arc::new(AppState::from_settings(&settings)?.with_metrics(prometheus_handle));
    let app = nowcast_api::router(state);

    let addr: SocketAddr = args.listen.parse().context("Invalid listen address")?;
    info!("Nowcast API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}
