//! Lifecycle controller with in-flight work tracking.
//!
//! Uses `ArcSwap` for lock-free lifecycle transitions and an atomic
//! counter with RAII guards for in-flight tracking. Drain waiters are woken
//! through a `Notify` when the counter returns to zero.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::sync::{watch, Notify};

/// Lifecycle state, transitioned by the shutdown controller.
///
/// State machine: Starting -> Running -> Draining -> Stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Components are being initialised; no work is accepted yet.
    Starting,
    /// Work is accepted.
    Running,
    /// New work is refused; accepted work is allowed to finish.
    Draining,
    /// All accepted work has finished. Terminal.
    Stopped,
}

impl LifecycleState {
    /// Lower-case name used in health responses and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }
}

/// Counter of outstanding work plus the wake-up used by drain waiters.
#[derive(Debug, Default)]
struct InFlight {
    count: AtomicU64,
    idle: Notify,
}

impl InFlight {
    async fn wait_idle(&self) {
        loop {
            // Register interest before reading the counter so a release that
            // lands between the load and the await is not missed.
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.count.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Owns the lifecycle state machine and the in-flight work counter.
///
/// 1. `set_running()` opens the accept path once components are wired
/// 2. The accept path takes a guard via `try_in_flight_guard()`
/// 3. `trigger_shutdown()` moves to Draining and signals all listeners
/// 4. `wait_for_drain()` blocks until every guard is dropped, then Stopped
#[derive(Debug)]
pub struct ShutdownController {
    shutdown_signal: watch::Sender<bool>,
    in_flight: Arc<InFlight>,
    state: Arc<ArcSwap<LifecycleState>>,
}

impl ShutdownController {
    /// Creates a new controller in the `Starting` state.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            shutdown_signal: tx,
            in_flight: Arc::new(InFlight::default()),
            state: Arc::new(ArcSwap::from_pointee(LifecycleState::Starting)),
        }
    }

    /// Transitions `Starting -> Running`.
    ///
    /// Has no effect in any other state, so a controller that has begun
    /// draining can never be reopened.
    pub fn set_running(&self) {
        self.state.rcu(|state| match **state {
            LifecycleState::Starting => LifecycleState::Running,
            other => other,
        });
    }

    /// Returns a receiver that flips to `true` when shutdown is triggered.
    #[must_use]
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_signal.subscribe()
    }

    /// Completes once shutdown has been triggered, immediately if it already was.
    pub async fn shutdown_requested(&self) {
        let mut rx = self.shutdown_receiver();
        // The sender lives as long as `self`, so this only errors if the
        // controller is being torn down, which also means we are shutting down.
        let _ = rx.wait_for(|triggered| *triggered).await;
    }

    /// Initiates draining.
    ///
    /// The first call moves `Starting` or `Running` to `Draining`, signals
    /// every shutdown receiver, and returns `true`. Any later call is a no-op
    /// that returns `false`.
    pub fn trigger_shutdown(&self) -> bool {
        let previous = self.state.rcu(|state| match **state {
            LifecycleState::Starting | LifecycleState::Running => LifecycleState::Draining,
            other => other,
        });

        let initiated = matches!(
            *previous,
            LifecycleState::Starting | LifecycleState::Running
        );
        if initiated {
            self.shutdown_signal.send_replace(true);
        }
        initiated
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        **self.state.load()
    }

    /// Whether new work is currently accepted.
    #[must_use]
    pub fn is_accepting(&self) -> bool {
        self.state() == LifecycleState::Running
    }

    /// Creates an RAII guard that counts one unit of in-flight work.
    ///
    /// The counter is incremented on creation and decremented when the
    /// guard is dropped, including during unwinding.
    #[must_use]
    pub fn in_flight_guard(&self) -> InFlightGuard {
        self.in_flight.count.fetch_add(1, Ordering::SeqCst);
        InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    /// Admits one unit of work if the controller is `Running`.
    ///
    /// The guard is taken before the state is read. A drain that starts
    /// concurrently therefore either sees this guard in the counter, or this
    /// call sees `Draining` and releases the guard again. No work can be
    /// admitted after `wait_for_drain` has observed zero.
    #[must_use]
    pub fn try_in_flight_guard(&self) -> Option<InFlightGuard> {
        let guard = self.in_flight_guard();
        if self.is_accepting() {
            Some(guard)
        } else {
            None
        }
    }

    /// Returns the number of outstanding guards.
    #[must_use]
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.count.load(Ordering::SeqCst)
    }

    /// Waits, without a bound, until no work is in flight, then moves to `Stopped`.
    ///
    /// Callers must have triggered shutdown first, otherwise new work may
    /// still be admitted after this returns.
    pub async fn wait_for_drain(&self) {
        self.in_flight.wait_idle().await;
        self.state.store(Arc::new(LifecycleState::Stopped));
    }

    /// Waits for in-flight work to finish, up to `timeout`.
    ///
    /// Returns `true` and moves to `Stopped` if everything drained. Returns
    /// `false` on timeout and leaves the state at `Draining`.
    pub async fn wait_for_drain_timeout(&self, timeout: Duration) -> bool {
        if tokio::time::timeout(timeout, self.in_flight.wait_idle())
            .await
            .is_ok()
        {
            self.state.store(Arc::new(LifecycleState::Stopped));
            true
        } else {
            false
        }
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard that decrements the in-flight counter when dropped.
///
/// The last guard to drop wakes every drain waiter.
#[derive(Debug)]
pub struct InFlightGuard {
    in_flight: Arc<InFlight>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.in_flight.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.in_flight.idle.notify_waiters();
        }
    }
}
