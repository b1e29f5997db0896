//! Route definitions for the `/pads` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{pad, sensors};
use crate::state::AppState;

/// Routes mounted at `/pads`.
///
/// ```text
/// GET    /                                  -> list
/// POST   /                                  -> create
/// GET    /{id}                              -> get_by_id
/// PUT    /{id}                              -> update
/// DELETE /{id}                              -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(pad::list).post(pad::create))
        .route(
            "/{id}",
            get(pad::get_by_id).put(pad::update).delete(pad::delete),
        )
}

/// Board administration routes mounted at `/pads`, all behind basic auth.
///
/// ```text
/// GET    /{id}/sensors/sensitivities        -> read_sensitivities
/// POST   /{id}/sensors/{index}/sensitivity  -> update_sensitivity
/// POST   /{id}/sensors/debounce             -> update_debounce
/// ```
pub fn sensors_router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}/sensors/sensitivities",
            get(sensors::read_sensitivities),
        )
        .route(
            "/{id}/sensors/{index}/sensitivity",
            post(sensors::update_sensitivity),
        )
        .route("/{id}/sensors/debounce", post(sensors::update_debounce))
}
