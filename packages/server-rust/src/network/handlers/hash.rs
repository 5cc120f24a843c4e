//! Job submission and result lookup endpoints.

use axum::extract::{Path, State};
use bytes::Bytes;
use hashvault_core::Handle;

use super::{ApiError, AppState};
use crate::service::FetchError;

/// Handles `POST /hash`: accepts a `password=<secret>` body and returns the
/// job handle as plain text. The digest is computed in the background.
///
/// # Errors
///
/// 400 for a malformed body, 413 for an oversized one, 503 while draining.
pub async fn create_hash_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<String, ApiError> {
    let handle = state.service.submit_work(&body)?;
    Ok(handle.to_string())
}

/// Handles `GET /hash/{id}`: returns the base64 digest as plain text.
///
/// An id that does not parse as a handle is treated like any other unknown
/// handle.
///
/// # Errors
///
/// 404 when the handle is unknown or its job has not finished.
pub async fn read_hash_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<String, ApiError> {
    let handle: Handle = id.parse().map_err(|_| FetchError::NotFound)?;
    Ok(state.service.fetch_result(handle)?)
}
