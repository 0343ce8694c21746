#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use revingest_api::config::ServerConfig;
use revingest_api::router::build_app_router;
use revingest_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        ..ServerConfig::default()
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    build_app_router(AppState { pool }, &test_config())
}

/// A valid revision payload exactly as the bulk loader sends it: every value
/// is the raw TSV string.
pub fn tsv_record(revision_id: i64) -> serde_json::Value {
    serde_json::json!({
        "user_id": "389",
        "article_id": "1194",
        "revision_id": revision_id.to_string(),
        "namespace": "0",
        "timestamp": "2009-03-27 21:06:22",
        "md5": "3e4bc2ab8f26c0dbe2ef2d7d5ae5e6de",
        "reverted": "0",
        "reverted_user_id": "-1",
        "reverted_revision_id": "-1",
        "delta": "-29",
        "cur_size": "18411"
    })
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    post_raw(app, uri, "application/json", body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, content_type: &str, body: String) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
