//! Accept-path latency bookkeeping.
//!
//! Every accept call records exactly one [`DurationSample`] through an
//! [`AcceptTimer`]. Only samples tagged [`Outcome::Success`] contribute to
//! the [`AggregateStatus`] served by the stats endpoint.

use std::sync::Arc;
use std::time::{Duration, Instant};

use hashvault_core::{AggregateStatus, Handle};
use parking_lot::Mutex;

/// Result of one accept call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A handle was issued and returned to the caller.
    Success,
    /// The call was rejected or abandoned before a handle was returned.
    Failure,
}

/// Elapsed time of one accept call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationSample {
    /// Issued handle. Always `Some` for successes, `None` for failures.
    pub handle: Option<Handle>,
    /// Wall-clock time from the start of the call until it returned.
    pub elapsed: Duration,
    /// Whether the call returned a handle.
    pub outcome: Outcome,
}

/// Append-only log of accept-call durations.
#[derive(Debug, Default)]
pub struct DurationRecorder {
    samples: Mutex<Vec<DurationSample>>,
}

impl DurationRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one sample.
    pub fn record(&self, handle: Option<Handle>, elapsed: Duration, outcome: Outcome) {
        self.samples.lock().push(DurationSample {
            handle,
            elapsed,
            outcome,
        });
    }

    /// Count and truncated mean (microseconds) of the successful samples.
    #[must_use]
    pub fn aggregate(&self) -> AggregateStatus {
        let (total, sum_micros) = {
            let samples = self.samples.lock();
            samples
                .iter()
                .filter(|s| s.outcome == Outcome::Success)
                .fold((0u64, 0u128), |(n, sum), s| {
                    (n + 1, sum + s.elapsed.as_micros())
                })
        };
        AggregateStatus::from_totals(total, sum_micros)
    }

    /// Number of recorded samples of either outcome.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }

    /// Starts timing one accept call.
    #[must_use]
    pub fn start(self: &Arc<Self>) -> AcceptTimer {
        AcceptTimer {
            recorder: Arc::clone(self),
            started: Instant::now(),
            handle: None,
        }
    }
}

/// RAII timer for one accept call.
///
/// Records a sample when dropped: a success if [`AcceptTimer::succeed`] was
/// called, a failure on every other exit path (early return, `?`, panic).
#[derive(Debug)]
#[must_use = "dropping the timer immediately records a failed call"]
pub struct AcceptTimer {
    recorder: Arc<DurationRecorder>,
    started: Instant,
    handle: Option<Handle>,
}

impl AcceptTimer {
    /// Marks the call successful with the handle being returned and stops the timer.
    pub fn succeed(mut self, handle: Handle) {
        self.handle = Some(handle);
    }
}

impl Drop for AcceptTimer {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed();
        let outcome = if self.handle.is_some() {
            Outcome::Success
        } else {
            Outcome::Failure
        };
        self.recorder.record(self.handle, elapsed, outcome);
    }
}
