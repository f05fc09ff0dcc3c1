use std::sync::Arc;

use itinera_core::refresh::RefreshHandle;

use crate::background::share_board::ShareBoard;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: itinera_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Centralized event bus for publishing platform events.
    pub event_bus: Arc<itinera_events::EventBus>,
    /// Background-refreshed share board snapshot.
    pub share_board: RefreshHandle<ShareBoard>,
}
