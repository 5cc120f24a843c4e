//! The request-processing core behind the transport.
//!
//! [`HashService`] wires the handle issuer, result store, work processor,
//! duration recorder, and lifecycle controller together and exposes the
//! four calls the transport makes: submit, fetch, status, and shutdown.

use std::sync::Arc;
use std::time::Duration;

use hashvault_core::{parse_payload, AggregateStatus, Handle, PayloadError};
use tracing::{debug, info, warn};

use super::config::ServiceConfig;
use super::durations::DurationRecorder;
use super::issuer::HandleIssuer;
use super::processor::{CompletionSink, TracingCompletionSink, WorkProcessor};
use crate::network::{LifecycleState, ShutdownController};
use crate::storage::{HashMapResultStore, ResultStore};

/// Reasons an accept call returns no handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// The payload failed the `password=<secret>` structural check.
    #[error("post not in expected format")]
    Malformed,
    /// The payload exceeded the configured size limit.
    #[error("payload of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },
    /// The service is not accepting work (not yet running, or draining).
    #[error("service is not accepting work")]
    ShuttingDown,
    /// Called outside a tokio runtime, so the job could not be scheduled.
    #[error("no async runtime available to run the job")]
    NoRuntime,
}

impl From<PayloadError> for SubmitError {
    fn from(err: PayloadError) -> Self {
        match err {
            PayloadError::Malformed => Self::Malformed,
            PayloadError::TooLarge { size, limit } => Self::TooLarge { size, limit },
        }
    }
}

/// Errors from looking up a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// No result for this handle: either unknown or still processing.
    #[error("hasher: key not found")]
    NotFound,
}

/// Request-processing core: accepts payloads, hands out handles, and
/// serves finished digests and latency statistics.
pub struct HashService {
    config: ServiceConfig,
    issuer: HandleIssuer,
    store: Arc<dyn ResultStore>,
    durations: Arc<DurationRecorder>,
    processor: WorkProcessor,
    lifecycle: Arc<ShutdownController>,
}

impl HashService {
    /// Creates a service with an in-memory store and the `tracing` completion sink.
    ///
    /// The service starts in [`LifecycleState::Starting`]; call
    /// [`mark_running`](Self::mark_running) to begin accepting work.
    #[must_use]
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_components(
            config,
            Arc::new(HashMapResultStore::new()),
            Arc::new(TracingCompletionSink),
        )
    }

    /// Creates a service around an explicit store and completion sink.
    #[must_use]
    pub fn with_components(
        config: ServiceConfig,
        store: Arc<dyn ResultStore>,
        sink: Arc<dyn CompletionSink>,
    ) -> Self {
        let processor = WorkProcessor::new(Arc::clone(&store), sink, config.processing_delay);
        Self {
            config,
            issuer: HandleIssuer::new(),
            store,
            durations: Arc::new(DurationRecorder::new()),
            processor,
            lifecycle: Arc::new(ShutdownController::new()),
        }
    }

    /// Returns the service configuration.
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Returns a shared handle to the lifecycle controller.
    #[must_use]
    pub fn lifecycle(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.lifecycle)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Opens the accept path (`Starting -> Running`).
    pub fn mark_running(&self) {
        self.lifecycle.set_running();
    }

    /// Accepts a payload and returns its handle without waiting for the digest.
    ///
    /// Rejected payloads never consume a handle. Exactly one duration sample
    /// is recorded per call; only calls that return `Ok` count as successes.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError::Malformed`] or [`SubmitError::TooLarge`] when
    /// the payload fails validation, [`SubmitError::NoRuntime`] when called
    /// outside a tokio runtime, and [`SubmitError::ShuttingDown`] when the
    /// service is not in the `Running` state.
    pub fn submit_work(&self, payload: &[u8]) -> Result<Handle, SubmitError> {
        let timer = self.durations.start();

        let secret = parse_payload(payload, self.config.max_payload_bytes).map_err(|err| {
            debug!(error = %err, "rejected payload");
            SubmitError::from(err)
        })?;

        if tokio::runtime::Handle::try_current().is_err() {
            warn!("rejected payload: submit_work called outside a tokio runtime");
            return Err(SubmitError::NoRuntime);
        }

        let Some(guard) = self.lifecycle.try_in_flight_guard() else {
            debug!(state = self.state().as_str(), "rejected payload while not running");
            return Err(SubmitError::ShuttingDown);
        };

        let handle = self.issuer.next_handle();
        // Detached: the job runs to completion whether or not anyone joins it.
        drop(self.processor.submit(handle, secret.to_vec(), guard));

        timer.succeed(handle);
        Ok(handle)
    }

    /// Looks up the digest for `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::NotFound`] when the handle was never issued or
    /// its job has not finished yet.
    pub fn fetch_result(&self, handle: Handle) -> Result<String, FetchError> {
        self.store
            .get(handle)
            .map(|entry| entry.value)
            .ok_or(FetchError::NotFound)
    }

    /// Count and mean latency of successful accept calls.
    #[must_use]
    pub fn status_snapshot(&self) -> AggregateStatus {
        self.durations.aggregate()
    }

    /// Stops accepting new work and signals shutdown listeners.
    ///
    /// Returns immediately. Returns `true` for the call that started the
    /// drain; repeated calls are no-ops that return `false`.
    pub fn begin_shutdown(&self) -> bool {
        let initiated = self.lifecycle.trigger_shutdown();
        if initiated {
            info!(
                in_flight = self.lifecycle.in_flight_count(),
                "shutdown requested, no longer accepting work"
            );
        } else {
            debug!("shutdown already in progress");
        }
        initiated
    }

    /// Waits until every accepted job has stored its result, then moves to `Stopped`.
    pub async fn drain(&self) {
        self.lifecycle.wait_for_drain().await;
    }

    /// Like [`drain`](Self::drain), bounded by `timeout`.
    ///
    /// Returns `false` if jobs were still running when the timeout expired.
    pub async fn drain_with_timeout(&self, timeout: Duration) -> bool {
        self.lifecycle.wait_for_drain_timeout(timeout).await
    }

    /// Number of jobs accepted but not yet stored.
    #[must_use]
    pub fn in_flight_count(&self) -> u64 {
        self.lifecycle.in_flight_count()
    }

    /// Number of finished results held in the store.
    #[must_use]
    pub fn stored_results(&self) -> usize {
        self.store.len()
    }

    /// Number of handles issued so far.
    #[must_use]
    pub fn issued_handles(&self) -> u64 {
        self.issuer.issued()
    }
}
