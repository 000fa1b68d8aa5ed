use std::sync::Arc;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: boardstorm_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (facilitator live subscriptions).
    pub ws_manager: Arc<WsManager>,
    /// Centralized event bus: mutating handlers publish, the WebSocket
    /// layer forwards to subscribed facilitators.
    pub event_bus: Arc<boardstorm_events::EventBus>,
    /// Clustering model client.
    pub cluster: Arc<boardstorm_cluster::ClusterClient>,
}
