use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::BookingStatus;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("storage failure, please retry: {0}")]
    Store(#[from] anyhow::Error),

    #[error("{0}")]
    Validation(String),

    #[error("a partner request with this contact number already exists")]
    DuplicateRequest,

    #[error("price could not be calculated for this booking")]
    UnresolvedPrice,

    #[error("booking cannot move from {from} to {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DuplicateRequest => StatusCode::CONFLICT,
            AppError::UnresolvedPrice => StatusCode::CONFLICT,
            AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
        };

        // Store failures are transient from the caller's point of view;
        // keep the wire message generic and log the cause.
        let message = match &self {
            AppError::Store(e) => {
                tracing::error!(error = %e, "store operation failed");
                "storage failure, please retry".to_string()
            }
            other => other.to_string(),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}
