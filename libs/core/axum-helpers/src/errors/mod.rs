pub mod codes;
pub mod handlers;

pub use codes::ErrorCode;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Standard JSON error body.
///
/// ```json
/// {
///   "code": 1004,
///   "error": "NOT_FOUND",
///   "message": "Product 65f0c2... not found",
///   "details": null
/// }
/// ```
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
    /// Optional structured details (e.g. the failing field)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application error type that renders as an [`ErrorResponse`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl AppError {
    /// Status code and error code this error maps to.
    pub fn classify(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::Validation { .. } => (StatusCode::BAD_REQUEST, ErrorCode::ValidationError),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, ErrorCode::InvalidId),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            AppError::Database(_) => (StatusCode::SERVICE_UNAVAILABLE, ErrorCode::DatabaseError),
            AppError::Template(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::TemplateError),
            AppError::InternalServerError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.classify();

        if status.is_server_error() {
            tracing::error!(error_code = code.code(), error = %self, "Request failed");
        } else {
            tracing::info!(error_code = code.code(), error = %self, "Request rejected");
        }

        let (message, details) = match self {
            // Internals are logged above, never echoed to the client.
            AppError::Template(_) => (code.default_message().to_string(), None),
            AppError::Validation { message, details } => (message, details),
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Database(msg)
            | AppError::InternalServerError(msg) => (msg, None),
        };

        error_response(status, code, message, details)
    }
}

/// Build a JSON error response from parts.
pub fn error_response(
    status: StatusCode,
    code: ErrorCode,
    message: String,
    details: Option<serde_json::Value>,
) -> Response {
    let body = Json(ErrorResponse {
        code: code.code(),
        error: code.as_str().to_string(),
        message,
        details,
    });

    (status, body).into_response()
}
