use std::sync::Arc;

use grail_core::catalog::ItemCatalog;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: grail_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Read-only item catalog, loaded once at startup.
    pub catalog: Arc<ItemCatalog>,
}
