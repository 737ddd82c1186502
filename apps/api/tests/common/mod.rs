#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use campus_api::auth::jwt::{generate_access_token, JwtConfig};
use campus_api::config::Config;
use campus_api::llm_client::LlmClient;
use campus_api::routes::build_router;
use campus_api::state::AppState;
use campus_api::storage::LocalFileStore;

pub const TEST_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

pub fn test_config(upload_dir: &str) -> Config {
    Config {
        database_url: "postgres://localhost/campus_test".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        jwt_expiry_mins: 30,
        // Nothing listens here; AI calls fail fast.
        ollama_url: "http://127.0.0.1:9".to_string(),
        ollama_model: "llama3.2:3b".to_string(),
        upload_dir: upload_dir.to_string(),
        max_upload_bytes: 1024 * 1024,
        host: "127.0.0.1".to_string(),
        port: 0,
        rust_log: "debug".to_string(),
    }
}

/// Full router over `pool` with a throwaway upload directory.
/// Keep the returned `TempDir` alive for the duration of the test.
pub async fn build_test_app(pool: PgPool) -> (Router, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let config = test_config(&dir.path().to_string_lossy());
    let files = Arc::new(
        LocalFileStore::new(dir.path())
            .await
            .expect("file store should initialise"),
    );
    let llm = LlmClient::new(config.ollama_url.clone(), config.ollama_model.clone())
        .expect("llm client should build");

    let state = AppState {
        db: pool,
        llm,
        files,
        jwt: JwtConfig::new(TEST_SECRET, 30),
        config,
    };
    (build_router(state), dir)
}

/// Router whose pool never connects; for routes that must not reach the database.
pub async fn build_offline_app() -> (Router, TempDir) {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/campus_test")
        .expect("lazy pool should build");
    build_test_app(pool).await
}

pub fn bearer(user_id: i64, username: &str) -> String {
    let token = generate_access_token(user_id, username, &JwtConfig::new(TEST_SECRET, 30))
        .expect("token generation should succeed");
    format!("Bearer {token}")
}

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    auth: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(AUTHORIZATION, auth);
    }
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");
    app.oneshot(request).await.expect("router should respond")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}
