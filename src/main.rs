// Main entry point - Dependency injection and server setup
use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};

use race_telemetry::application::car_service::CarService;
use race_telemetry::application::report_service::ReportService;
use race_telemetry::application::streaming_service::StreamingDashboardService;
use race_telemetry::application::telemetry_repository::TelemetryRepository;
use race_telemetry::application::telemetry_service::TelemetryService;
use race_telemetry::infrastructure::config::{AppConfig, StoreBackend, load_app_config};
use race_telemetry::infrastructure::influx_repository::InfluxRepository;
use race_telemetry::infrastructure::logging::init_logging;
use race_telemetry::infrastructure::memory_repository::InMemoryRepository;
use race_telemetry::presentation::app_state::AppState;
use race_telemetry::presentation::{cors_layer, router};

async fn build_repository(config: &AppConfig) -> anyhow::Result<Arc<dyn TelemetryRepository>> {
    match config.store.backend {
        StoreBackend::Influx => {
            let settings = config
                .influx
                .clone()
                .context("store.backend is influx but no [influx] section is configured")?;
            tracing::info!("Using InfluxDB store at {}", settings.host);
            Ok(Arc::new(InfluxRepository::new(settings)))
        }
        StoreBackend::Memory => {
            let repository = match &config.store.seed_file {
                Some(path) => InMemoryRepository::from_json_file(path).await?,
                None => InMemoryRepository::default(),
            };
            tracing::info!("Using in-memory store");
            Ok(Arc::new(repository))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = load_app_config().context("Failed to load configuration")?;

    // Create repository (infrastructure layer)
    let repository = build_repository(&config).await?;

    // Create services (application layer)
    let car_service = CarService::new(repository.clone(), config.cars.clone());
    let telemetry_service = TelemetryService::new(
        repository.clone(),
        config.scoring.clone(),
        config.insights.clone(),
    );
    let report_service = ReportService::new(repository.clone());
    let streaming_service = StreamingDashboardService::new(
        repository,
        config.dashboard.charts.clone(),
        config.scoring.clone(),
        config.insights.clone(),
    );

    let state = Arc::new(AppState {
        car_service,
        telemetry_service,
        report_service,
        streaming_service,
    });

    // Build router (presentation layer)
    // Compression is handled in the response builders, so no CompressionLayer
    let router = router(state, cors_layer(&config.server.allowed_origins)?);

    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", config.server.bind))?;
    tracing::info!("Starting race-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
