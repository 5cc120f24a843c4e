//! Mapping from core errors to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::service::{FetchError, SubmitError};

/// Error returned by handlers; rendered as a plain-text body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Submit(#[from] SubmitError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Submit(SubmitError::Malformed) => StatusCode::BAD_REQUEST,
            Self::Submit(SubmitError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Submit(SubmitError::ShuttingDown) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Submit(SubmitError::NoRuntime) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Fetch(FetchError::NotFound) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
