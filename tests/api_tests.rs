//! HTTP API tests
//!
//! Drive the full router with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use shortener::{
    config::AppConfig,
    db,
    registry::{AliasPolicy, AliasRegistry},
    router, AppState,
};
use tempfile::TempDir;
use tower::ServiceExt;

// =============================================================================
// Test Setup
// =============================================================================

fn test_config(database_url: String) -> AppConfig {
    AppConfig {
        database_url,
        host: "127.0.0.1".into(),
        port: 8080,
        base_url: "http://localhost:8080".into(),
        cors_allowed_origins: vec!["http://localhost:5173".into()],
        alias_length: 7,
        max_alias_attempts: 5,
    }
}

async fn create_test_app() -> (Router, TempDir) {
    create_test_app_with_origins(vec!["http://localhost:5173".into()]).await
}

async fn create_test_app_with_origins(origins: Vec<String>) -> (Router, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_url = format!("sqlite://{}", temp_dir.path().join("api.db").display());
    let mut config = test_config(db_url);
    config.cors_allowed_origins = origins;

    let pool = db::connect(&config.database_url)
        .await
        .expect("Failed to open database");
    let registry = AliasRegistry::init(pool, &config)
        .await
        .expect("Failed to init registry");

    let app = router(Arc::new(AppState { config, registry }));
    (app, temp_dir)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>, axum::http::HeaderMap) {
    let resp = app.clone().oneshot(req).await.expect("request failed");
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec(), headers)
}

fn shorten_request(body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/shorten")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).expect("body should be JSON")
}

// =============================================================================
// POST /shorten
// =============================================================================

#[tokio::test]
async fn test_shorten_with_custom_alias() {
    let (app, _dir) = create_test_app().await;

    let (status, body, _) = send(
        &app,
        shorten_request(json!({"fullUrl": "https://google.com", "customAlias": "goog123"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json_body(&body),
        json!({
            "shortUrl": "http://localhost:8080/goog123",
            "alias": "goog123",
            "fullUrl": "https://google.com",
        })
    );
}

#[tokio::test]
async fn test_shorten_generates_alias_when_null() {
    let (app, _dir) = create_test_app().await;

    let (status, body, _) = send(
        &app,
        shorten_request(json!({"fullUrl": "https://example.com", "customAlias": null})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body = json_body(&body);
    let alias = body["alias"].as_str().unwrap();
    assert_eq!(alias.len(), 7);
    assert_eq!(
        body["shortUrl"].as_str().unwrap(),
        format!("http://localhost:8080/{alias}")
    );
}

#[tokio::test]
async fn test_shorten_conflict_is_409() {
    let (app, _dir) = create_test_app().await;

    let payload = json!({"fullUrl": "https://example.com", "customAlias": "taken"});
    let (first, _, _) = send(&app, shorten_request(payload.clone())).await;
    assert_eq!(first, StatusCode::OK);

    let (status, body, _) = send(&app, shorten_request(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        json_body(&body),
        json!({"detail": "Alias already exists: taken"})
    );
}

#[tokio::test]
async fn test_shorten_invalid_url_is_400() {
    let (app, _dir) = create_test_app().await;

    let (status, body, _) = send(
        &app,
        shorten_request(json!({"fullUrl": "ftp://example.com"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(&body)["detail"],
        "URL must start with http:// or https://"
    );
}

#[tokio::test]
async fn test_shorten_invalid_alias_is_400() {
    let (app, _dir) = create_test_app().await;

    let (status, body, _) = send(
        &app,
        shorten_request(json!({"fullUrl": "https://example.com", "customAlias": "a/b"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json_body(&body)["detail"].is_string());
}

#[tokio::test]
async fn test_shorten_malformed_json_is_400() {
    let (app, _dir) = create_test_app().await;

    let req = Request::builder()
        .method(Method::POST)
        .uri("/shorten")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json_body(&body)["detail"].is_string());

    let (status, _, _) = send(&app, shorten_request(json!({"customAlias": "x"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// GET /:alias
// =============================================================================

#[tokio::test]
async fn test_redirect_found() {
    let (app, _dir) = create_test_app().await;

    send(
        &app,
        shorten_request(json!({"fullUrl": "https://docs.rs/axum", "customAlias": "axumdocs"})),
    )
    .await;

    let (status, _, headers) = send(&app, request(Method::GET, "/axumdocs")).await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(headers[header::LOCATION], "https://docs.rs/axum");
}

#[tokio::test]
async fn test_redirect_unknown_is_404() {
    let (app, _dir) = create_test_app().await;

    let (status, body, _) = send(&app, request(Method::GET, "/nothing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        json_body(&body),
        json!({"detail": "URL not found for alias: nothing"})
    );
}

// =============================================================================
// DELETE /:alias
// =============================================================================

#[tokio::test]
async fn test_delete_then_redirect_404() {
    let (app, _dir) = create_test_app().await;

    send(
        &app,
        shorten_request(json!({"fullUrl": "https://example.com", "customAlias": "bye"})),
    )
    .await;

    let (status, body, _) = send(&app, request(Method::DELETE, "/bye")).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());

    let (status, _, _) = send(&app, request(Method::GET, "/bye")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send(&app, request(Method::DELETE, "/bye")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// GET /urls, GET /health, CORS
// =============================================================================

#[tokio::test]
async fn test_list_urls() {
    let (app, _dir) = create_test_app().await;

    send(
        &app,
        shorten_request(json!({"fullUrl": "https://example.com", "customAlias": "one"})),
    )
    .await;

    let (status, body, _) = send(&app, request(Method::GET, "/urls")).await;
    assert_eq!(status, StatusCode::OK);

    let body = json_body(&body);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["alias"], "one");
    assert_eq!(items[0]["fullUrl"], "https://example.com");
    assert_eq!(items[0]["shortUrl"], "http://localhost:8080/one");
    assert!(items[0]["createdAt"].is_string());
}

#[tokio::test]
async fn test_health() {
    let (app, _dir) = create_test_app().await;

    let (status, body, _) = send(&app, request(Method::GET, "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["status"], "ok");
}

#[tokio::test]
async fn test_cors_preflight_allows_configured_origin() {
    let (app, _dir) = create_test_app().await;

    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/shorten")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let (status, _, headers) = send(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );
}

#[tokio::test]
async fn test_cors_rejects_unknown_origin() {
    let (app, _dir) = create_test_app().await;

    let req = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let (_, _, headers) = send(&app, req).await;

    assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn test_wildcard_cors_origin_allows_any() {
    let (app, _dir) =
        create_test_app_with_origins(vec!["http://localhost:5173".into(), "*".into()]).await;

    let req = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .header(header::ORIGIN, "http://anywhere.example")
        .body(Body::empty())
        .unwrap();
    let (status, _, headers) = send(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

// =============================================================================
// Fallbacks
// =============================================================================

#[tokio::test]
async fn test_unknown_path_is_json_404() {
    let (app, _dir) = create_test_app().await;

    let (status, body, _) = send(&app, request(Method::GET, "/a/b")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json_body(&body), json!({"detail": "No route for /a/b"}));
}

#[tokio::test]
async fn test_wrong_method_is_json_405() {
    let (app, _dir) = create_test_app().await;

    let (status, body, _) = send(&app, request(Method::DELETE, "/shorten")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        json_body(&body),
        json!({"detail": "Method DELETE not allowed on /shorten"})
    );

    let (status, body, _) = send(&app, request(Method::DELETE, "/health")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(json_body(&body)["detail"].is_string());

    let (status, body, _) = send(&app, request(Method::PUT, "/someone")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(json_body(&body)["detail"].is_string());
}

#[test]
fn test_default_policy_matches_config_defaults() {
    let policy = AliasPolicy::default();
    assert_eq!(policy.length, 7);
    assert_eq!(policy.max_attempts, 5);
}
