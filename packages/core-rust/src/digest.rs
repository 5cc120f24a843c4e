//! One-way password digest: SHA-512, rendered as standard padded base64.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha512};

/// Computes the base64-encoded SHA-512 digest of `secret`.
///
/// Deterministic and infallible: the same input always yields the same
/// 88-character string.
///
/// # Examples
///
/// ```
/// use hashvault_core::digest_secret;
///
/// let encoded = digest_secret(b"angryMonkey");
/// assert!(encoded.starts_with("ZEHhWB65gUlzdVwtDQArEyx+KVLzp/aTaRaPlBzYRIFj6vjFdqEb0Q5B8zVKCZ0v"));
/// ```
#[must_use]
pub fn digest_secret(secret: &[u8]) -> String {
    let hash = Sha512::digest(secret);
    STANDARD.encode(hash)
}
