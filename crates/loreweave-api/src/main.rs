//! Loreweave API server entry point.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use loreweave_api::config::AppConfig;
use loreweave_api::state::{AppState, Repositories};
use loreweave_api::{app, services, telemetry};
use loreweave_core::clock::{Clock, SystemClock};
use loreweave_core::rng::{DeterministicRng, SystemRng};
use loreweave_store::schema::run_migrations;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let otlp_endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .ok()
        .filter(|v| !v.trim().is_empty());
    let telemetry = telemetry::init(otlp_endpoint.as_deref())?;

    tracing::info!("Starting Loreweave API server");

    let config = AppConfig::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    run_migrations(&pool).await?;

    let repositories = Repositories::postgres(&pool);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(SystemRng::new()));
    let pipeline = services::build_pipeline(&config, Arc::clone(&repositories.locks), Arc::clone(&clock))?;
    let app_state = AppState::new(repositories, Arc::new(pipeline), clock, rng);

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let router = app(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| format!("invalid HOST:PORT combination: {e}"))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    telemetry.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown signal received");
}
