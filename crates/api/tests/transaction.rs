//! Integration tests for the request-scoped transaction middleware.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::routing::post;
use axum::Router;
use faser_api::error::{AppError, AppResult};
use faser_api::middleware::transaction::{transaction, Tx};
use faser_db::models::pad::Pad;
use faser_db::repositories::PadRepo;
use sqlx::PgPool;

async fn insert_then_succeed(tx: Tx) -> AppResult<StatusCode> {
    let mut guard = tx.lock().await;
    let mut pad = Pad::new("Committed", "COM1", None);
    PadRepo::create(guard.conn()?, &mut pad).await?;
    Ok(StatusCode::CREATED)
}

async fn insert_then_fail(tx: Tx) -> AppResult<StatusCode> {
    let mut guard = tx.lock().await;
    let mut pad = Pad::new("Rolled back", "COM2", None);
    PadRepo::create(guard.conn()?, &mut pad).await?;
    Err(AppError::BadRequest("refused after insert".into()))
}

fn app(pool: PgPool) -> Router {
    let state = common::test_state(pool, common::FakeBoard::replying(""));
    Router::new()
        .route("/ok", post(insert_then_succeed))
        .route("/fail", post(insert_then_fail))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            transaction,
        ))
        .with_state(state)
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn stored_names(pool: &PgPool) -> Vec<String> {
    let mut conn = pool.acquire().await.unwrap();
    PadRepo::all(&mut *conn)
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn successful_response_commits(pool: PgPool) {
    let response = common::send(app(pool.clone()), post_empty("/ok")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(stored_names(&pool).await, vec!["Committed".to_string()]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn error_response_rolls_back(pool: PgPool) {
    let response = common::send(app(pool.clone()), post_empty("/fail")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(stored_names(&pool).await.is_empty());
}
