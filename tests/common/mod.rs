//! Shared helpers for the API tests: an app over a fresh in-memory SQLite
//! database plus small request/registration wrappers.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use sea_orm::{ConnectOptions, Database};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use tasknexus::config::ServerConfig;
use tasknexus::db;
use tasknexus::web;

/// Builds a router over a fresh in-memory database. One pooled connection
/// only; sqlite gives every new connection its own memory database.
pub async fn test_app() -> Router {
    let mut opt = ConnectOptions::new("sqlite::memory:".to_owned());
    opt.max_connections(1);
    let db_pool = Database::connect(opt).await.expect("sqlite connect");
    db::init_schema(&db_pool).await.expect("schema init");

    let config = Arc::new(ServerConfig {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test-secret".to_string(),
        listen_addr: "127.0.0.1:0".to_string(),
    });

    web::create_axum_router(db_pool, config)
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Registers a user and returns their bearer token.
pub async fn register(app: &Router, name: &str, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "name": name, "email": email, "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    body["token"].as_str().unwrap().to_string()
}

/// Creates a task and returns its wire form.
pub async fn create_task(app: &Router, token: &str, payload: Value) -> Value {
    let (status, body) = send(app, "POST", "/api/tasks", Some(token), Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED, "create task failed: {body}");
    body["task"].clone()
}
