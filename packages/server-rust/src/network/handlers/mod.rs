//! HTTP handler definitions for the `hashvault` server.
//!
//! This module defines `AppState` (the shared state carried through axum
//! extractors) and re-exports all handler functions for convenient access
//! when building the router.

pub mod error;
pub mod hash;
pub mod health;
pub mod shutdown;
pub mod stats;

pub use error::ApiError;
pub use hash::{create_hash_handler, read_hash_handler};
pub use health::{health_handler, liveness_handler, readiness_handler};
pub use shutdown::shutdown_handler;
pub use stats::stats_handler;

use std::sync::Arc;
use std::time::Instant;

use super::NetworkConfig;
use crate::service::HashService;

/// Shared application state passed to all axum handlers via `State` extraction.
///
/// Holds `Arc` references to shared resources so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// The request-processing core.
    pub service: Arc<HashService>,
    /// Network configuration (bind address, timeouts).
    pub config: Arc<NetworkConfig>,
    /// Server process start time, used for uptime calculation.
    pub start_time: Instant,
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::Duration;

    use super::*;
    use crate::service::ServiceConfig;

    /// Running state with a short processing delay.
    pub(crate) fn test_state() -> AppState {
        let service = HashService::new(ServiceConfig {
            processing_delay: Duration::from_millis(10),
            ..ServiceConfig::default()
        });
        service.mark_running();
        AppState {
            service: Arc::new(service),
            config: Arc::new(NetworkConfig::default()),
            start_time: Instant::now(),
        }
    }
}
