use crate::{error::AppError, AppState};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// GET /:alias
///
/// Resolve through the registry (cache first, database on a miss) and answer
/// with a 302 Found pointing at the full URL.
pub async fn redirect(
    State(state): State<Arc<AppState>>,
    Path(alias): Path<String>,
) -> Result<Response, AppError> {
    let full_url = state.registry.resolve(&alias).await?;
    tracing::debug!("Redirecting '{}' -> {}", alias, full_url);

    Ok((StatusCode::FOUND, [(header::LOCATION, full_url)]).into_response())
}
