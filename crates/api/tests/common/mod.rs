#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use faser_api::board::{BoardError, BoardLink};
use faser_api::config::ServerConfig;
use faser_api::router::build_app_router;
use faser_api::state::AppState;
use faser_api::templates::load_templates;
use faser_core::board::BoardCommand;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

pub const ADMIN_USER: &str = "admin";
pub const ADMIN_PASSWORD: &str = "test-password";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        templates_dir: concat!(env!("CARGO_MANIFEST_DIR"), "/templates").to_string(),
        admin_username: ADMIN_USER.to_string(),
        admin_password: ADMIN_PASSWORD.to_string(),
        board_timeout_ms: 100,
    }
}

/// What the fake board does when it receives a command.
pub enum Script {
    Reply(String),
    Unavailable,
}

/// In-memory [`BoardLink`] recording every `(device, command)` it receives.
///
/// With a watched pool it also records, for each command, how many sessions
/// of the test database sat idle inside a transaction while the board was
/// being talked to.
pub struct FakeBoard {
    script: Script,
    watched: Option<PgPool>,
    pub sent: Mutex<Vec<(String, String)>>,
    pub open_transactions: Mutex<Vec<i64>>,
}

impl FakeBoard {
    fn scripted(script: Script, watched: Option<PgPool>) -> Arc<Self> {
        Arc::new(Self {
            script,
            watched,
            sent: Mutex::new(Vec::new()),
            open_transactions: Mutex::new(Vec::new()),
        })
    }

    pub fn replying(output: &str) -> Arc<Self> {
        Self::scripted(Script::Reply(output.to_string()), None)
    }

    pub fn unavailable() -> Arc<Self> {
        Self::scripted(Script::Unavailable, None)
    }

    pub fn replying_watching(output: &str, pool: PgPool) -> Arc<Self> {
        Self::scripted(Script::Reply(output.to_string()), Some(pool))
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn open_transactions(&self) -> Vec<i64> {
        self.open_transactions.lock().unwrap().clone()
    }
}

#[async_trait]
impl BoardLink for FakeBoard {
    async fn send(&self, device: &str, command: &BoardCommand) -> Result<String, BoardError> {
        self.sent
            .lock()
            .unwrap()
            .push((device.to_string(), command.encode()));
        if let Some(pool) = &self.watched {
            let (open,): (i64,) = sqlx::query_as(
                "SELECT COUNT(*) FROM pg_stat_activity
                 WHERE datname = current_database() AND state = 'idle in transaction'",
            )
            .fetch_one(pool)
            .await
            .unwrap();
            self.open_transactions.lock().unwrap().push(open);
        }
        match &self.script {
            Script::Reply(output) => Ok(output.clone()),
            Script::Unavailable => Err(BoardError::Io {
                device: device.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such device"),
            }),
        }
    }
}

/// Application state around `pool` and `board`, with the real templates.
pub fn test_state(pool: PgPool, board: Arc<FakeBoard>) -> AppState {
    let config = test_config();
    let templates = load_templates(&config.templates_dir).unwrap();
    AppState {
        pool,
        config: Arc::new(config),
        templates: Arc::new(templates),
        board,
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool and a board that answers with nothing.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with_board(pool, FakeBoard::replying(""))
}

pub fn build_test_app_with_board(pool: PgPool, board: Arc<FakeBoard>) -> Router {
    build_app_router(test_state(pool, board), &test_config())
}

pub fn basic_auth(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}

pub fn admin_auth() -> String {
    basic_auth(ADMIN_USER, ADMIN_PASSWORD)
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_with_auth(app: Router, uri: &str, auth: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, auth)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request(Method::POST, uri, body)).await
}

pub async fn post_json_with_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    auth: &str,
) -> Response {
    let mut request = json_request(Method::POST, uri, body);
    request
        .headers_mut()
        .insert(AUTHORIZATION, auth.parse().unwrap());
    send(app, request).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, json_request(Method::PUT, uri, body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

/// Create a pad through the API and return its id.
pub async fn create_pad(pool: &PgPool, name: &str, port: &str) -> String {
    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/pads",
        serde_json::json!({"name": name, "port": port}),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["id"].as_str().unwrap().to_string()
}
