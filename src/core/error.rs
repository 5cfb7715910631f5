//! Typed errors raised by the crud pipeline itself
//!
//! Everything else travelling through a handler (authorization denials,
//! custom not-found values, failures of user implementations) is carried as
//! an `anyhow::Error` and left untouched, so callers can recover the original
//! value with [`anyhow::Error::downcast_ref`].
//!
//! # Example
//!
//! ```rust,ignore
//! match handler.call(id, ctx).await {
//!     Ok(entity) => println!("Found: {}", entity),
//!     Err(e) => match e.downcast_ref::<CrudError>() {
//!         Some(CrudError::NotFound) => println!("missing"),
//!         Some(CrudError::NotImplemented { operation }) => println!("{} unsupported", operation),
//!         _ => eprintln!("Other error: {}", e),
//!     },
//! }
//! ```

use crate::core::Operation;
use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Errors produced by the crate's own defaults and plumbing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CrudError {
    /// No implementation (and no repository) was supplied for an operation
    #[error("\"{}\" not implemented", .operation.name())]
    NotImplemented { operation: Operation },

    /// Default error raised when a lookup comes back empty
    #[error("Requested resource not found")]
    NotFound,

    /// An entity or result could not be converted to/from JSON
    #[error("Serialization failed: {message}")]
    Serialization { message: String },
}

impl CrudError {
    pub fn not_implemented(operation: Operation) -> Self {
        CrudError::NotImplemented { operation }
    }

    pub fn serialization(err: impl std::fmt::Display) -> Self {
        CrudError::Serialization {
            message: err.to_string(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            CrudError::NotImplemented { .. } => StatusCode::NOT_IMPLEMENTED,
            CrudError::NotFound => StatusCode::NOT_FOUND,
            CrudError::Serialization { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            CrudError::NotImplemented { .. } => "NOT_IMPLEMENTED",
            CrudError::NotFound => "NOT_FOUND",
            CrudError::Serialization { .. } => "SERIALIZATION_ERROR",
        }
    }

    /// Convert to an error response body
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_implemented_names_operation() {
        let err = CrudError::not_implemented(Operation::Detail);
        assert_eq!(err.to_string(), "\"detail\" not implemented");

        let err = CrudError::not_implemented(Operation::List);
        assert_eq!(err.to_string(), "\"list\" not implemented");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(CrudError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            CrudError::not_implemented(Operation::Create).status_code(),
            StatusCode::NOT_IMPLEMENTED
        );
        assert_eq!(
            CrudError::serialization("bad").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_survives_anyhow_round_trip() {
        let err: anyhow::Error = CrudError::NotFound.into();
        assert_eq!(err.downcast_ref::<CrudError>(), Some(&CrudError::NotFound));
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_to_response() {
        let body = CrudError::NotFound.to_response();
        assert_eq!(body.code, "NOT_FOUND");
        assert_eq!(body.message, "Requested resource not found");
    }
}
