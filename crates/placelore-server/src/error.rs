use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use placelore_core::error::CoreError;
use placelore_generate::error::GenerateError;
use placelore_storage::error::StorageError;

/// Failure of a lookup or generate request, before it becomes HTTP.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] CoreError),

    #[error(transparent)]
    Generation(#[from] GenerateError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Unified API error type for all route handlers.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal { message: String, error: String },
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, error) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Internal { message, error } => {
                tracing::error!(error = %error, "{message}");
                (StatusCode::INTERNAL_SERVER_ERROR, message, Some(error))
            }
        };

        let body = ErrorBody {
            success: false,
            message,
            error,
        };
        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(CoreError::EmptyPlace) => {
                ApiError::BadRequest("Place is required".to_string())
            }
            ServiceError::Generation(e @ GenerateError::Configuration { .. }) => ApiError::Internal {
                message: "Content generation is not configured".to_string(),
                error: e.to_string(),
            },
            ServiceError::Generation(e) => ApiError::Internal {
                message: "Error while generating content".to_string(),
                error: e.to_string(),
            },
            ServiceError::Storage(e) => ApiError::Internal {
                message: "Error while accessing stored content".to_string(),
                error: e.to_string(),
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}
