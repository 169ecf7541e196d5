//! HTTP error types and implementations

use crate::context::RequestContext;
use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced by the edge layer
#[derive(Error, Debug, Clone)]
pub enum HttpError {
    /// Credential missing or wrong
    #[error("Authentication required: {0}")]
    AuthenticationRequired(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// A required capability is not configured
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal server error
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl HttpError {
    /// Status code conveyed by this error
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::AuthenticationRequired(_) => StatusCode::UNAUTHORIZED,
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            HttpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            status: status.as_u16(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Log `error` and write its structured JSON body into the response
pub fn send_error(ctx: &mut RequestContext, error: HttpError) {
    let status = error.status();
    warn!(
        status = status.as_u16(),
        method = %ctx.method,
        path = %ctx.path,
        "{error}"
    );
    let body = ErrorResponse {
        status: status.as_u16(),
        message: error.to_string(),
    };
    ctx.respond_json(status, &body);
}

/// Result type alias using HttpError
pub type Result<T> = std::result::Result<T, HttpError>;
