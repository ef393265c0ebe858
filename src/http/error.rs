//! Request-level error taxonomy.
//!
//! Every failure is terminal for the current request and is reported
//! synchronously; nothing here is retried. A lookup miss is not an error and
//! never reaches this type.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Errors surfaced to HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or missing input.
    #[error("{0}")]
    Validation(String),

    /// The client's token bucket is empty.
    #[error("rate limit exceeded")]
    RateLimited,

    /// The peer address was not available on the request.
    #[error("cannot determine IP")]
    ClientAddressUnavailable,

    /// Missing or wrong admin credentials.
    #[error("unauthorized")]
    Unauthorized,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::ClientAddressUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::ClientAddressUnavailable = self {
            tracing::error!("Connection info missing from request, cannot resolve client IP");
        }
        (self.status(), self.to_string()).into_response()
    }
}
