use std::sync::Arc;

use crate::catalog::ChampionCatalog;
use crate::config::ServerConfig;
use crate::moderation::Moderation;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: riftdraft_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (session-scoped fan-out).
    pub ws_manager: Arc<WsManager>,
    /// Centralized event bus for publishing draft events.
    pub event_bus: Arc<riftdraft_events::EventBus>,
    /// Content moderation collaborator.
    pub moderation: Arc<dyn Moderation>,
    /// Champion metadata collaborator.
    pub catalog: Arc<dyn ChampionCatalog>,
}
