//! `hashvault` core: handles, payload parsing, password digests, and status types.
//!
//! Everything in this crate is transport-free and synchronous. The server
//! crate builds the asynchronous job pipeline on top of these types.

pub mod digest;
pub mod handle;
pub mod payload;
pub mod status;

pub use digest::digest_secret;
pub use handle::{Handle, ParseHandleError};
pub use payload::{parse_payload, PayloadError, DEFAULT_MAX_PAYLOAD_BYTES, PAYLOAD_FIELD};
pub use status::AggregateStatus;
