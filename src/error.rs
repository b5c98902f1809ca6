use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Every failure the registry and its HTTP surface can report.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("URL not found for alias: {0}")]
    NotFound(String),

    #[error("Alias already exists: {0}")]
    Conflict(String),

    #[error("Failed to generate a unique alias after {0} attempts")]
    Exhausted(u32),

    #[error("No route for {0}")]
    NoRoute(String),

    #[error("Method {0} not allowed on {1}")]
    MethodNotAllowed(String, String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

/// Wire shape of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Exhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NoRoute(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed(..) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "An unexpected error occurred".to_owned()
            }
            other => other.to_string(),
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(
            AppError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Exhausted(5).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(AppError::NoRoute("/a/b".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::MethodNotAllowed("DELETE".into(), "/shorten".into()).status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_name_the_alias() {
        assert_eq!(
            AppError::Conflict("docs".into()).to_string(),
            "Alias already exists: docs"
        );
        assert_eq!(
            AppError::NotFound("gone".into()).to_string(),
            "URL not found for alias: gone"
        );
    }
}
