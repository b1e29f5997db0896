use std::sync::Arc;

use tera::Tera;

use crate::board::BoardLink;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool. Handlers reach the database through the
    /// request-scoped transaction, not the pool directly.
    pub pool: faser_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Compiled page templates.
    pub templates: Arc<Tera>,
    /// Serial link to the pad boards.
    pub board: Arc<dyn BoardLink>,
}
