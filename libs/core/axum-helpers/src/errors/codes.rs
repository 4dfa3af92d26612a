//! Type-safe error codes for API responses.
//!
//! Each code has a SCREAMING_SNAKE_CASE identifier for clients, an integer
//! for logs and dashboards, and a default message.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request validation failed
    ValidationError,

    /// Identifier in the path is not well-formed
    InvalidId,

    /// Requested resource was not found
    NotFound,

    /// An unexpected internal server error occurred
    InternalError,

    // Storage errors (2000-2999)
    /// The document store rejected or failed an operation
    DatabaseError,

    // Rendering errors (3000-3999)
    /// A server-side template failed to render
    TemplateError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidId => "INVALID_ID",
            Self::NotFound => "NOT_FOUND",
            Self::InternalError => "INTERNAL_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::TemplateError => "TEMPLATE_ERROR",
        }
    }

    /// Integer code used in structured logs.
    ///
    /// Ranges: 1000s client, 2000s storage, 3000s rendering.
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidId => 1002,
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::DatabaseError => 2003,
            Self::TemplateError => 3001,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::InvalidId => "Invalid identifier format",
            Self::NotFound => "Resource not found",
            Self::InternalError => "An internal server error occurred",
            Self::DatabaseError => "A database error occurred",
            Self::TemplateError => "Failed to render page",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_fall_in_their_ranges() {
        assert!((1000..2000).contains(&ErrorCode::InvalidId.code()));
        assert!((2000..3000).contains(&ErrorCode::DatabaseError.code()));
        assert!((3000..4000).contains(&ErrorCode::TemplateError.code()));
    }

    #[test]
    fn test_serde_matches_as_str() {
        let json = serde_json::to_string(&ErrorCode::DatabaseError).unwrap();
        assert_eq!(json, format!("\"{}\"", ErrorCode::DatabaseError));
    }
}
