//! Board administration for a pad: read and tune sensor sensitivities and
//! the debounce time over the pad's serial port.
//!
//! These routes are mounted outside the request transaction. They only
//! read the pad, and a board round trip can last the whole read timeout.

use axum::extract::{Path, State};
use axum::Json;
use faser_core::board::{BoardCommand, BoardReply};
use faser_core::error::CoreError;
use faser_core::types::DbId;
use faser_db::repositories::PadRepo;
use faser_db::DbPool;
use serde::{Deserialize, Serialize};

use crate::board::exchange;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AdminUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for the sensitivity and debounce updates.
#[derive(Debug, Deserialize)]
pub struct SensorValue {
    pub value: u32,
}

/// What was sent to a board and what it answered.
#[derive(Debug, Serialize)]
pub struct BoardExchange {
    pub pad_id: DbId,
    pub port: String,
    pub command: String,
    pub replies: Vec<BoardReply>,
}

/// Serial port of the pad. The pooled connection goes back to the pool
/// on return, before the board is contacted.
async fn pad_port(pool: &DbPool, id: DbId) -> AppResult<String> {
    let mut conn = pool.acquire().await?;
    let pad = PadRepo::find(&mut *conn, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Pad", id }))?;
    Ok(pad.port)
}

async fn run(
    state: &AppState,
    pad_id: DbId,
    command: BoardCommand,
) -> AppResult<Json<DataResponse<BoardExchange>>> {
    let port = pad_port(&state.pool, pad_id).await?;
    let replies = exchange(state.board.as_ref(), &port, &command).await?;
    Ok(Json(DataResponse {
        data: BoardExchange {
            pad_id,
            port,
            command: command.to_string(),
            replies,
        },
    }))
}

/// GET /api/v1/pads/{id}/sensors/sensitivities
pub async fn read_sensitivities(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<BoardExchange>>> {
    tracing::info!(user = %admin.username, pad_id = %id, "Reading sensor sensitivities");
    run(&state, id, BoardCommand::ReadSensitivities).await
}

/// POST /api/v1/pads/{id}/sensors/{index}/sensitivity
pub async fn update_sensitivity(
    admin: AdminUser,
    State(state): State<AppState>,
    Path((id, index)): Path<(DbId, u32)>,
    Json(body): Json<SensorValue>,
) -> AppResult<Json<DataResponse<BoardExchange>>> {
    let command = BoardCommand::set_sensitivity(index, body.value)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    tracing::info!(
        user = %admin.username,
        pad_id = %id,
        sensor = index,
        value = body.value,
        "Updating sensor sensitivity"
    );
    run(&state, id, command).await
}

/// POST /api/v1/pads/{id}/sensors/debounce
pub async fn update_debounce(
    admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<SensorValue>,
) -> AppResult<Json<DataResponse<BoardExchange>>> {
    let command = BoardCommand::set_debounce(body.value)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    tracing::info!(
        user = %admin.username,
        pad_id = %id,
        micros = body.value,
        "Updating debounce time"
    );
    run(&state, id, command).await
}
