// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};

use plant_monitor::application::dashboard_service::DashboardService;
use plant_monitor::application::sensor_fetcher::SensorSeriesFetcher;
use plant_monitor::infrastructure::config::{load_dashboard_config, load_influx_config};
use plant_monitor::infrastructure::influx_repository::InfluxRepository;
use plant_monitor::presentation::app_state::AppState;
use plant_monitor::presentation::routes::build_router;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let influx_config = load_influx_config()?;
    let dashboard_config = load_dashboard_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(InfluxRepository::from_settings(&influx_config.influx)?);

    // Create services (application layer)
    let fetcher = SensorSeriesFetcher::new(repository, influx_config.influx.bucket.clone())
        .with_timeout(influx_config.influx.timeout());
    let dashboard_service = DashboardService::new(fetcher, dashboard_config.clone());

    // Create application state
    let state = Arc::new(AppState { dashboard_service });

    // Build router (presentation layer)
    let router = build_router(state);

    // Start server
    let addr: SocketAddr = dashboard_config.server.bind_addr.parse()?;
    tracing::info!(
        "Starting plant-monitor on {} (bucket {}, org {})",
        addr,
        influx_config.influx.bucket,
        influx_config.influx.org
    );

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
