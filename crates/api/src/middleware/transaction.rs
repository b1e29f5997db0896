//! Request-scoped database transaction.
//!
//! [`transaction`] opens one transaction per request and stores it in the
//! request extensions. Handlers take the [`Tx`] extractor to run queries
//! on it. Once the handler has produced a response the transaction is
//! committed if the status is below 400 and rolled back otherwise.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use sqlx::{PgConnection, Postgres, Transaction};
use tokio::sync::{Mutex, MutexGuard};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub type PgTransaction = Transaction<'static, Postgres>;

/// Shared handle to the transaction of the current request.
///
/// The slot is emptied when the middleware finishes the transaction.
#[derive(Clone)]
pub struct RequestTx(Arc<Mutex<Option<PgTransaction>>>);

impl RequestTx {
    pub fn new(tx: PgTransaction) -> Self {
        Self(Arc::new(Mutex::new(Some(tx))))
    }

    pub async fn lock(&self) -> TxGuard<'_> {
        TxGuard(self.0.lock().await)
    }

    async fn take(&self) -> Option<PgTransaction> {
        self.0.lock().await.take()
    }
}

/// Exclusive access to the request transaction while held.
pub struct TxGuard<'a>(MutexGuard<'a, Option<PgTransaction>>);

impl TxGuard<'_> {
    /// Connection to run queries on. Fails if the transaction has already
    /// been finished.
    pub fn conn(&mut self) -> AppResult<&mut PgConnection> {
        self.0.as_deref_mut().ok_or(AppError::MissingTransaction)
    }
}

/// Extractor for the request transaction.
///
/// Rejects with [`AppError::MissingTransaction`] when the route is not
/// wrapped by the [`transaction`] middleware.
pub struct Tx(RequestTx);

impl Tx {
    pub async fn lock(&self) -> TxGuard<'_> {
        self.0.lock().await
    }
}

impl<S> FromRequestParts<S> for Tx
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestTx>()
            .cloned()
            .map(Tx)
            .ok_or(AppError::MissingTransaction)
    }
}

/// Middleware wrapping each request in a database transaction.
pub async fn transaction(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let handle = RequestTx::new(state.pool.begin().await?);
    request.extensions_mut().insert(handle.clone());

    let response = next.run(request).await;
    let status = response.status();

    if let Some(tx) = handle.take().await {
        if status.as_u16() < 400 {
            tx.commit().await?;
        } else {
            tracing::debug!(%status, "Rolling back request transaction");
            tx.rollback().await?;
        }
    }

    Ok(response)
}
