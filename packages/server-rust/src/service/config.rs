use std::time::Duration;

use hashvault_core::DEFAULT_MAX_PAYLOAD_BYTES;

/// Configuration for the job pipeline behind the transport.
///
/// Controls the simulated processing cost, the payload size limit, and how
/// long shutdown may wait for outstanding jobs.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Fixed delay every job waits before computing its digest.
    pub processing_delay: Duration,
    /// Largest accepted payload in bytes.
    pub max_payload_bytes: usize,
    /// Upper bound on the shutdown drain. `None` waits indefinitely.
    pub drain_timeout: Option<Duration>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            processing_delay: Duration::from_secs(5),
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            drain_timeout: None,
        }
    }
}
