//! Monotonic handle issuance.

use std::sync::atomic::{AtomicU64, Ordering};

use hashvault_core::Handle;

/// Hands out strictly increasing, never-repeating [`Handle`]s.
///
/// A single atomic counter backs every call, so handles are unique under
/// any number of concurrent callers and a call that starts after another
/// returned always receives a larger handle. Handles start at 1.
#[derive(Debug)]
pub struct HandleIssuer {
    next: AtomicU64,
}

impl HandleIssuer {
    /// Creates an issuer whose first handle is [`Handle::FIRST`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(Handle::FIRST.get()),
        }
    }

    /// Issues the next handle.
    pub fn next_handle(&self) -> Handle {
        Handle(self.next.fetch_add(1, Ordering::SeqCst))
    }

    /// Number of handles issued so far.
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::SeqCst) - Handle::FIRST.get()
    }
}

impl Default for HandleIssuer {
    fn default() -> Self {
        Self::new()
    }
}
