//! parkchat-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use parkchat_gateway::api;
use parkchat_gateway::app_state::AppState;
use parkchat_gateway::config::ChatConfig;
use parkchat_gateway::domain::{InMemoryBus, MessageBus, RoomRegistry};
use parkchat_gateway::persistence::{InMemoryStore, MessageStore, PostgresStore, RoomDirectory};
use parkchat_gateway::service::ChatService;
use parkchat_gateway::ws::handler::chat_ws_handler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = ChatConfig::from_env().map_err(|e| anyhow::anyhow!(e.to_string()))?;
    tracing::info!(addr = %config.listen_addr, "starting parkchat-gateway");

    // Build persistence layer
    let (store, directory): (Arc<dyn MessageStore>, Arc<dyn RoomDirectory>) =
        if config.persistence_enabled {
            let postgres = Arc::new(PostgresStore::connect(&config).await?);
            tracing::info!("connected to PostgreSQL, migrations applied");
            let store: Arc<dyn MessageStore> = Arc::<PostgresStore>::clone(&postgres);
            let directory: Arc<dyn RoomDirectory> = postgres;
            (store, directory)
        } else {
            let memory = Arc::new(InMemoryStore::new());
            tracing::warn!("persistence disabled; rooms and messages are process-local");
            let store: Arc<dyn MessageStore> = Arc::<InMemoryStore>::clone(&memory);
            let directory: Arc<dyn RoomDirectory> = memory;
            (store, directory)
        };

    // Build domain layer: one registry per process, bus on top of it
    let registry = Arc::new(RoomRegistry::new(config.event_bus_capacity));
    let bus: Arc<dyn MessageBus> = Arc::new(InMemoryBus::new(registry));

    // Build service layer
    let chat_service = Arc::new(ChatService::new(store, directory, bus));

    // Build application state
    let app_state = AppState { chat_service };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws/chat/{room_name}", get(chat_ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
