//! # sensorhubd — sensorhub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (`sensorhub.toml` + env overrides) and set up logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct the identity, attribute and telemetry stores (adapters)
//! - Construct the coordinator and facade around one shared spatial index
//! - Rebuild the spatial index, optionally repair orphans
//! - Build the axum router, bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;

use sensorhub_adapter_http_axum::state::AppState;
use sensorhub_adapter_memory::MemoryTelemetryCache;
use sensorhub_adapter_storage_sqlite_sqlx::{
    Config as DatabaseConfig, SqliteAttributeStore, SqliteIdentityStore, SqliteTelemetryCache,
};
use sensorhub_app::ports::TelemetryCache;
use sensorhub_app::services::coordinator::SensorCoordinator;
use sensorhub_app::services::query_facade::QueryFacade;
use sensorhub_app::spatial_index::SpatialIndex;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, TelemetryBackend};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = DatabaseConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Stores
    let identity = SqliteIdentityStore::new(pool.clone());
    let attributes = SqliteAttributeStore::new(pool.clone());

    match config.telemetry.backend {
        TelemetryBackend::Memory => {
            serve(&config, identity, attributes, MemoryTelemetryCache::new()).await
        }
        TelemetryBackend::Sqlite => {
            serve(&config, identity, attributes, SqliteTelemetryCache::new(pool)).await
        }
    }
}

async fn serve<T>(
    config: &Config,
    identity: SqliteIdentityStore,
    attributes: SqliteAttributeStore,
    telemetry: T,
) -> Result<(), Box<dyn std::error::Error>>
where
    T: TelemetryCache + Send + Sync + 'static,
{
    let identity = Arc::new(identity);
    let attributes = Arc::new(attributes);
    let telemetry = Arc::new(telemetry);
    let index = Arc::new(SpatialIndex::new());

    // Services
    let coordinator = SensorCoordinator::new(
        Arc::clone(&identity),
        Arc::clone(&attributes),
        Arc::clone(&telemetry),
        Arc::clone(&index),
    );
    let queries = QueryFacade::new(identity, attributes, telemetry, index);

    if config.consistency.repair_on_start {
        let removed = coordinator.repair_orphans().await?;
        tracing::info!(removed = removed.len(), "startup orphan repair finished");
    }
    coordinator.rebuild_spatial_index().await?;

    // HTTP
    let app = sensorhub_adapter_http_axum::router::build(AppState::new(coordinator, queries));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(
        address = %bind_addr,
        telemetry = ?config.telemetry.backend,
        "sensorhubd listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("sensorhubd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
