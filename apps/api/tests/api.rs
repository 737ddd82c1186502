//! Router-level tests that never reach the database.

mod common;

use axum::http::{Method, StatusCode};
use common::{bearer, body_json, build_offline_app, get, post_json, send};
use serde_json::json;

#[tokio::test]
async fn test_health() {
    let (app, _dir) = build_offline_app().await;
    let response = get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "campus-api");
}

#[tokio::test]
async fn test_root_welcome() {
    let (app, _dir) = build_offline_app().await;
    let response = get(app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["message"].is_string());
}

#[tokio::test]
async fn test_ai_requires_token() {
    let (app, _dir) = build_offline_app().await;
    let response = post_json(app, "/api/v1/ai/chat", json!({ "message": "hi" })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_malformed_token_rejected() {
    let (app, _dir) = build_offline_app().await;
    let response = send(
        app,
        Method::GET,
        "/api/v1/auth/me",
        None,
        Some("Bearer not-a-jwt"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_chat_rejects_empty_message() {
    let (app, _dir) = build_offline_app().await;
    let auth = bearer(1, "ada");
    let response = send(
        app,
        Method::POST,
        "/api/v1/ai/chat",
        Some(json!({ "message": "   " })),
        Some(&auth),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unreachable_model_is_bad_gateway() {
    let (app, _dir) = build_offline_app().await;
    let auth = bearer(1, "ada");
    let response = send(
        app,
        Method::POST,
        "/api/v1/ai/suggest-category",
        Some(json!({ "lesson_title": "SQL Joins" })),
        Some(&auth),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_negative_lesson_score_rejected() {
    let (app, _dir) = build_offline_app().await;
    let response = post_json(
        app,
        "/api/v1/lessons",
        json!({ "title": "Intro", "category": "Data", "lesson_score": -5 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_register_rejects_malformed_email() {
    let (app, _dir) = build_offline_app().await;
    let response = post_json(
        app,
        "/api/v1/auth/register",
        json!({ "email": "nope", "username": "ada", "password": "long-enough" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_file_list_and_missing_download() {
    let (app, dir) = build_offline_app().await;
    std::fs::write(dir.path().join("notes.md"), "# Notes").unwrap();

    let response = get(app.clone(), "/api/v1/files").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body[0]["filename"], "notes.md");
    assert_eq!(body[0]["size"], 7);

    let response = get(app.clone(), "/api/v1/files/notes.md/text").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["text"], "# Notes");

    let response = get(app, "/api/v1/files/missing.pdf").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
