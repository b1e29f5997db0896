use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use faser_core::error::CoreError;
use faser_core::validation::FieldErrors;
use serde_json::json;

use crate::board::BoardError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `faser_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A page template failed to render.
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    /// Field-level validation failures, returned to the client as-is.
    #[error("Validation failed: {0}")]
    Invalid(FieldErrors),

    /// The request reached a handler without a request-scoped transaction.
    /// This means the transaction middleware is not mounted on the route.
    #[error("no transaction found")]
    MissingTransaction,

    /// Talking to a pad board failed.
    #[error(transparent)]
    Board(#[from] BoardError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            AppError::Template(err) => {
                tracing::error!(error = ?err, "Template rendering failed");
                internal()
            }

            AppError::Invalid(errors) => {
                let body = json!({
                    "error": "Validation failed",
                    "code": "VALIDATION_ERROR",
                    "errors": errors,
                });
                return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(body)).into_response();
            }

            AppError::MissingTransaction => {
                tracing::error!("Handler reached without a request transaction");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MISSING_TRANSACTION",
                    "no transaction found".to_string(),
                )
            }

            AppError::Board(err) => match err {
                BoardError::Io { device, source } => {
                    tracing::warn!(%device, error = %source, "Board unavailable");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "BOARD_UNAVAILABLE",
                        "Unavailable serial port".to_string(),
                    )
                }
                BoardError::Protocol(source) => {
                    tracing::warn!(error = %source, "Board sent an unreadable reply");
                    (StatusCode::BAD_GATEWAY, "BOARD_PROTOCOL", source.to_string())
                }
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        let mut response = (status, axum::Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"faser\""),
            );
        }
        response
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
