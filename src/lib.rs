use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod alias;
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod registry;

use registry::AliasRegistry;

// ── Shared application state ───────────────────────────────────────────────

pub struct AppState {
    pub config: config::AppConfig,
    pub registry: AliasRegistry,
}

// ── Router ─────────────────────────────────────────────────────────────────

/// Build the full HTTP surface over an already-initialised state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);

    Router::new()
        .route(
            "/health",
            get(handlers::api::health).fallback(handlers::api::method_not_allowed),
        )
        .route(
            "/shorten",
            post(handlers::api::shorten).fallback(handlers::api::method_not_allowed),
        )
        .route(
            "/urls",
            get(handlers::api::list_urls).fallback(handlers::api::method_not_allowed),
        )
        // Alias routes: static paths above take priority
        .route(
            "/:alias",
            get(handlers::redirect::redirect)
                .delete(handlers::api::delete_alias)
                .fallback(handlers::api::method_not_allowed),
        )
        .fallback(handlers::api::no_route)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// `*` anywhere in the list opens CORS to every origin; tower-http refuses a
/// wildcard inside an explicit list.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(header_values(origins))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
}

fn header_values(origins: &[String]) -> Vec<HeaderValue> {
    origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect()
}
