use crate::{
    db,
    error::AppError,
    models::{ShortLink, ShortenRequest, ShortenResponse},
    AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

/// POST /shorten
///
/// Body `{fullUrl, customAlias}`. Malformed JSON is reported as a 400 with the
/// same `{detail}` body as every other error.
pub async fn shorten(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Json<ShortenResponse>, AppError> {
    let Json(req) = payload.map_err(|rejection| AppError::Validation(rejection.body_text()))?;

    let link = state
        .registry
        .create(&req.full_url, req.custom_alias.as_deref())
        .await?;

    Ok(Json(ShortenResponse {
        short_url: link.short_url,
        alias: link.alias,
        full_url: link.full_url,
    }))
}

/// DELETE /:alias
pub async fn delete_alias(
    State(state): State<Arc<AppState>>,
    Path(alias): Path<String>,
) -> Result<StatusCode, AppError> {
    state.registry.delete(&alias).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /urls
pub async fn list_urls(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ShortLink>>, AppError> {
    Ok(Json(state.registry.list().await?))
}

/// GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    match db::ping(state.registry.pool()).await {
        Ok(()) => Json(json!({
            "status": "ok",
            "cached": state.registry.cached(),
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {:?}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
                .into_response()
        }
    }
}

/// Any path no route matches.
pub async fn no_route(uri: Uri) -> AppError {
    AppError::NoRoute(uri.path().to_owned())
}

/// A known path hit with a method it does not serve.
pub async fn method_not_allowed(method: Method, uri: Uri) -> AppError {
    AppError::MethodNotAllowed(method.to_string(), uri.path().to_owned())
}
