//! Record type held by the [`ResultStore`](super::ResultStore).

use std::time::{SystemTime, UNIX_EPOCH};

use hashvault_core::Handle;

/// A finished computation: the encoded digest for one handle.
///
/// Created by the work processor when the digest is ready and owned by the
/// result store from then on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultEntry {
    /// Handle the digest belongs to.
    pub handle: Handle,
    /// Base64-encoded digest of the submitted secret.
    pub value: String,
    /// Wall-clock time (millis since epoch) when the entry was created.
    /// Kept for future expiry; nothing reads it for eviction yet.
    pub creation_time: i64,
}

impl ResultEntry {
    /// Creates an entry stamped with `now`.
    #[must_use]
    pub fn new(handle: Handle, value: String, now: i64) -> Self {
        Self {
            handle,
            value,
            creation_time: now,
        }
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
///
/// Returns 0 if the system clock is set before the epoch.
#[must_use]
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}
