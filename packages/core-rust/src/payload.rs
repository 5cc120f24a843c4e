//! Structural validation of submitted payloads.
//!
//! A payload is a single form field, `password=<secret>`. Validation runs
//! on the accept path before any handle is issued, so a rejected payload
//! never consumes a handle and never mutates server state.

/// Name of the only field the accept path recognises.
pub const PAYLOAD_FIELD: &str = "password";

/// Default upper bound on the payload size in bytes (64 KiB).
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 64 * 1024;

/// Reasons a payload is rejected before a handle is issued.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    /// No `=` separator, or the field name is not `password`.
    #[error("post not in expected format")]
    Malformed,
    /// The payload exceeds the configured size limit.
    #[error("payload of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },
}

/// Extracts the secret from a `password=<secret>` payload.
///
/// The split happens at the first `=`; everything after it is the secret,
/// taken verbatim (no URL decoding) and possibly empty.
///
/// # Errors
///
/// Returns [`PayloadError::TooLarge`] when `body` is longer than `limit`,
/// and [`PayloadError::Malformed`] when it has no `=` or names a field other
/// than [`PAYLOAD_FIELD`].
pub fn parse_payload(body: &[u8], limit: usize) -> Result<&[u8], PayloadError> {
    if body.len() > limit {
        return Err(PayloadError::TooLarge {
            size: body.len(),
            limit,
        });
    }

    let split = body
        .iter()
        .position(|&b| b == b'=')
        .ok_or(PayloadError::Malformed)?;
    let (field, rest) = body.split_at(split);
    if field != PAYLOAD_FIELD.as_bytes() {
        return Err(PayloadError::Malformed);
    }
    Ok(&rest[1..])
}
