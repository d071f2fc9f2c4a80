//! boost-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints, the
//! periodic queue sweeper, and (when enabled) the persistence worker.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use boost_gateway::api;
use boost_gateway::app_state::AppState;
use boost_gateway::clock::{Clock, SystemClock};
use boost_gateway::config::GatewayConfig;
use boost_gateway::domain::{BoostRegistry, EventBus};
use boost_gateway::persistence::postgres::PostgresPersistence;
use boost_gateway::persistence::worker::{PersistenceWorker, restore_registry};
use boost_gateway::service::{BoostService, Sweeper};
use boost_gateway::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting boost-gateway");

    // Build domain layer
    let registry = Arc::new(BoostRegistry::new());
    let event_bus = EventBus::new(config.event_bus_capacity);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Optional persistence: restore records, then spawn the worker
    let event_store = if config.persistence_enabled {
        let store = PostgresPersistence::connect(&config)
            .await
            .context("connecting to postgres")?;
        let restored = restore_registry(&store, &registry).await?;
        tracing::info!(restored, "restored boost records from snapshots");

        let _ = PersistenceWorker::new(
            store.clone(),
            event_bus.clone(),
            Arc::clone(&registry),
            Arc::clone(&clock),
            std::time::Duration::from_secs(config.snapshot_interval_secs),
            config.cleanup_after_days,
        )
        .spawn();
        Some(store)
    } else {
        None
    };

    // Build service layer
    let boost_service = Arc::new(BoostService::new(
        Arc::clone(&registry),
        event_bus.clone(),
        config.boost_duration(),
    ));

    // Spawn the periodic queue sweeper
    let _ = Sweeper::new(
        Arc::clone(&boost_service),
        Arc::clone(&clock),
        std::time::Duration::from_secs(config.sweep_interval_secs),
    )
    .spawn();

    // Build application state
    let app_state = AppState {
        boost_service,
        event_bus,
        clock,
        event_store,
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
