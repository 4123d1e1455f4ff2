#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use cype_api::config::{LogFormat, ServerConfig};
use cype_api::router::build_app_router;
use cype_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        log_format: LogFormat::Pretty,
        db_max_connections: 5,
    }
}

/// Build the full application router, with the production middleware
/// stack, on top of the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create an element type over HTTP and return its id.
pub async fn create_element_type(pool: &PgPool, code: &str) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/v1/element-types",
        serde_json::json!({
            "code": code,
            "name": format!("Element {code}"),
            "category": "ESTRUCTURA METALICA",
            "price": 125.5,
        }),
    )
    .await;
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Define a variable over HTTP and return its id.
pub async fn define_variable(
    pool: &PgPool,
    element_type_id: i64,
    name: &str,
    kind: &str,
    is_required: bool,
) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/element-types/{element_type_id}/variables"),
        serde_json::json!({
            "name": name,
            "kind": kind,
            "is_required": is_required,
        }),
    )
    .await;
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Submit a draft over HTTP and return its id.
pub async fn submit_draft(pool: &PgPool, element_type_id: i64, template_text: &str) -> i64 {
    let response = post_json(
        build_test_app(pool.clone()),
        &format!("/api/v1/element-types/{element_type_id}/templates"),
        serde_json::json!({"template_text": template_text, "created_by": "redactor"}),
    )
    .await;
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Approve a version three times so it becomes the active one.
pub async fn approve_to_active(pool: &PgPool, version_id: i64) {
    for approver in ["tecnico", "jefe_obra", "direccion"] {
        let response = post_json(
            build_test_app(pool.clone()),
            &format!("/api/v1/templates/{version_id}/approve"),
            serde_json::json!({"approver": approver}),
        )
        .await;
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }
}
