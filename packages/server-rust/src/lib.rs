//! `hashvault` server: accepts passwords, returns job handles immediately,
//! computes digests in the background, and drains outstanding jobs on shutdown.

pub mod network;
pub mod service;
pub mod storage;

pub use network::{LifecycleState, NetworkConfig, NetworkModule, ShutdownController};
pub use service::{FetchError, HashService, ServiceConfig, SubmitError};
pub use storage::{HashMapResultStore, ResultEntry, ResultStore};
