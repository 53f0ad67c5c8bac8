use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub type DomainResult<T> = Result<T, DomainError>;

/// Business-rule failures are values, not panics: every fallible layer
/// returns `DomainResult` and callers branch explicitly.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("storage error: {0}")]
    Database(anyhow::Error),
}

impl DomainError {
    pub fn not_found(entity: &str) -> Self {
        DomainError::NotFound(entity.to_string())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        DomainError::Conflict(msg.into())
    }
}

impl From<rusqlite::Error> for DomainError {
    fn from(e: rusqlite::Error) -> Self {
        DomainError::Database(e.into())
    }
}

impl From<anyhow::Error> for DomainError {
    fn from(e: anyhow::Error) -> Self {
        DomainError::Database(e)
    }
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = match &self {
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DomainError::Unauthorized => StatusCode::UNAUTHORIZED,
            // Storage faults surface as a retryable conflict to the caller.
            DomainError::Database(_) => StatusCode::CONFLICT,
        };

        // The underlying infra fault is logged, never sent to the caller.
        let message = match &self {
            DomainError::Database(inner) => {
                tracing::error!("storage error: {inner:#}");
                "internal error".to_string()
            }
            other => other.to_string(),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}
