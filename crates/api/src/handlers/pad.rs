//! Handlers for the `/pads` resource.

use axum::extract::Path;
use axum::http::StatusCode;
use axum::Json;
use faser_core::error::CoreError;
use faser_core::types::DbId;
use faser_db::models::pad::{CreatePad, Pad, Pads, UpdatePad};
use faser_db::repositories::PadRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::transaction::Tx;
use crate::response::DataResponse;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Pad", id })
}

/// GET /api/v1/pads
pub async fn list(tx: Tx) -> AppResult<Json<DataResponse<Pads>>> {
    let mut guard = tx.lock().await;
    let pads = PadRepo::all(guard.conn()?).await?;
    Ok(Json(DataResponse { data: pads.into() }))
}

/// POST /api/v1/pads
///
/// Responds 422 with the field errors when `name` or `port` is blank.
pub async fn create(
    tx: Tx,
    Json(input): Json<CreatePad>,
) -> AppResult<(StatusCode, Json<DataResponse<Pad>>)> {
    let mut pad = Pad::from(input);
    let mut guard = tx.lock().await;

    let errors = PadRepo::validate_and_create(guard.conn()?, &mut pad).await?;
    if errors.has_any() {
        return Err(AppError::Invalid(errors));
    }

    tracing::info!(pad_id = %pad.id, name = %pad.name, "Pad created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: pad })))
}

/// GET /api/v1/pads/{id}
pub async fn get_by_id(tx: Tx, Path(id): Path<DbId>) -> AppResult<Json<DataResponse<Pad>>> {
    let mut guard = tx.lock().await;
    let pad = PadRepo::find(guard.conn()?, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: pad }))
}

/// PUT /api/v1/pads/{id}
pub async fn update(
    tx: Tx,
    Path(id): Path<DbId>,
    Json(input): Json<UpdatePad>,
) -> AppResult<Json<DataResponse<Pad>>> {
    let mut guard = tx.lock().await;
    let conn = guard.conn()?;

    let mut pad = PadRepo::find(&mut *conn, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    input.apply_to(&mut pad);

    let errors = PadRepo::validate_and_update(conn, &mut pad).await?;
    if errors.has_any() {
        return Err(AppError::Invalid(errors));
    }

    tracing::info!(pad_id = %pad.id, "Pad updated");
    Ok(Json(DataResponse { data: pad }))
}

/// DELETE /api/v1/pads/{id}
pub async fn delete(tx: Tx, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let mut guard = tx.lock().await;
    if PadRepo::destroy(guard.conn()?, id).await? {
        tracing::info!(pad_id = %id, "Pad deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
