pub mod health;
pub mod pad;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Routes that run inside a request transaction.
///
/// ```text
/// /                                   home page (HTML)
/// /api/v1/pads/...                    pad resource, see `pad::router`
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::home::index))
        .nest("/api/v1", api_routes())
}

/// Build the transactional `/api/v1` route tree.
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/pads", pad::router())
}

/// Routes that talk to pad boards and use pooled connections instead of a
/// request transaction.
pub fn board_routes() -> Router<AppState> {
    Router::new().nest("/api/v1/pads", pad::sensors_router())
}
