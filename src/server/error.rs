//! HTTP mapping of handler errors

use crate::core::{CrudError, ErrorResponse};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Any error returned by a handler, rendered as `{code, message}`
///
/// Errors raised by the crate itself keep their status code; anything else
/// (a denied authorization, a failing user implementation) is reported as an
/// internal error. Map your own error types before they reach the router if
/// you need other status codes.
#[derive(Debug)]
pub struct ApiError(pub anyhow::Error);

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0.downcast_ref::<CrudError>() {
            Some(err) => (err.status_code(), err.to_response()),
            None => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse {
                    code: "INTERNAL_ERROR".to_string(),
                    message: self.0.to_string(),
                },
            ),
        };

        tracing::debug!(status = %status, code = %body.code, "request failed");
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Operation;

    #[test]
    fn test_crud_errors_keep_status() {
        let response = ApiError(CrudError::NotFound.into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ApiError(CrudError::not_implemented(Operation::List).into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[test]
    fn test_foreign_errors_are_internal() {
        let response = ApiError(anyhow::anyhow!("denied")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
