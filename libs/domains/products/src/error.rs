use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Invalid product id: '{0}'")]
    InvalidId(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ProductResult<T> = Result<T, ProductError>;

impl ProductError {
    /// Errors caused by the request rather than by the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ProductError::NotFound(_) | ProductError::InvalidId(_) | ProductError::Validation(_)
        )
    }
}

/// Convert ProductError to AppError for standardized error responses
impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => AppError::NotFound(format!("Product {} not found", id)),
            ProductError::InvalidId(id) => {
                AppError::BadRequest(format!("'{}' is not a valid product id", id))
            }
            ProductError::Validation(e) => AppError::Validation {
                message: e.to_string(),
                details: Some(serde_json::json!({
                    "field": e.field(),
                    "kind": e.kind().to_string(),
                })),
            },
            ProductError::Database(msg) => AppError::Database(msg),
            ProductError::Template(msg) => AppError::Template(msg),
            ProductError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for ProductError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

impl From<mongodb::error::Error> for ProductError {
    fn from(err: mongodb::error::Error) -> Self {
        ProductError::Database(err.to_string())
    }
}

impl From<mongodb::bson::de::Error> for ProductError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        ProductError::Database(format!("malformed document: {}", err))
    }
}

impl From<mongodb::bson::ser::Error> for ProductError {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        ProductError::Internal(err.to_string())
    }
}

impl From<handlebars::RenderError> for ProductError {
    fn from(err: handlebars::RenderError) -> Self {
        ProductError::Template(err.to_string())
    }
}
