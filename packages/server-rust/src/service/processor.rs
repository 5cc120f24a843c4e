//! Asynchronous digest jobs.
//!
//! [`WorkProcessor`] spawns one tokio task per accepted payload. The task
//! waits out the configured processing delay, digests the secret, publishes
//! the result into the [`ResultStore`], and reports the completion to a
//! [`CompletionSink`].

use std::sync::Arc;
use std::time::Duration;

use hashvault_core::{digest_secret, Handle};
use tokio::task::JoinHandle;
use tracing::info;

use crate::network::InFlightGuard;
use crate::storage::{now_millis, ResultEntry, ResultStore};

// ---------------------------------------------------------------------------
// CompletionSink
// ---------------------------------------------------------------------------

/// Receives one notification per finished job.
///
/// Implementations must not block: the call happens on the job's task
/// after the result is already visible in the store.
pub trait CompletionSink: Send + Sync + 'static {
    /// Called once the digest for `handle` has been stored.
    fn completed(&self, handle: Handle, digest: &str);
}

/// Default sink: one `tracing` event per completion.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingCompletionSink;

impl CompletionSink for TracingCompletionSink {
    fn completed(&self, handle: Handle, digest: &str) {
        info!(handle = %handle, digest = digest, "stored digest");
    }
}

// ---------------------------------------------------------------------------
// WorkProcessor
// ---------------------------------------------------------------------------

/// Spawns the delayed digest computation for accepted payloads.
pub struct WorkProcessor {
    store: Arc<dyn ResultStore>,
    sink: Arc<dyn CompletionSink>,
    delay: Duration,
}

impl WorkProcessor {
    /// Creates a processor that publishes into `store` after `delay`.
    #[must_use]
    pub fn new(store: Arc<dyn ResultStore>, sink: Arc<dyn CompletionSink>, delay: Duration) -> Self {
        Self { store, sink, delay }
    }

    /// Starts the job for `handle` and returns without waiting for it.
    ///
    /// `guard` must already be counted by the caller. It moves into the task
    /// and is released after the store write, or on any earlier exit of the
    /// task including a panic. Once spawned, the job always runs to
    /// completion.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, handle: Handle, secret: Vec<u8>, guard: InFlightGuard) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let sink = Arc::clone(&self.sink);
        let delay = self.delay;

        tokio::spawn(async move {
            let _guard = guard;

            tokio::time::sleep(delay).await;

            let digest = digest_secret(&secret);
            store.put(ResultEntry::new(handle, digest.clone(), now_millis()));
            sink.completed(handle, &digest);
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use parking_lot::Mutex;

    use super::*;
    use crate::network::ShutdownController;
    use crate::storage::HashMapResultStore;

    #[derive(Default)]
    struct RecordingSink {
        completed: Mutex<Vec<(Handle, String)>>,
    }

    impl CompletionSink for RecordingSink {
        fn completed(&self, handle: Handle, digest: &str) {
            self.completed.lock().push((handle, digest.to_string()));
        }
    }

    fn processor(delay: Duration) -> (WorkProcessor, Arc<HashMapResultStore>, Arc<RecordingSink>) {
        let store = Arc::new(HashMapResultStore::new());
        let sink = Arc::new(RecordingSink::default());
        let processor = WorkProcessor::new(store.clone(), sink.clone(), delay);
        (processor, store, sink)
    }

    #[tokio::test(start_paused = true)]
    async fn result_appears_only_after_delay() {
        let (processor, store, sink) = processor(Duration::from_secs(5));
        let controller = ShutdownController::new();

        let job = processor.submit(Handle(1), b"angryMonkey".to_vec(), controller.in_flight_guard());
        assert_eq!(controller.in_flight_count(), 1);

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(store.get(Handle(1)).is_none());

        job.await.unwrap();

        let entry = store.get(Handle(1)).expect("digest should be stored");
        assert_eq!(entry.value, digest_secret(b"angryMonkey"));
        assert_eq!(controller.in_flight_count(), 0);
        assert_eq!(
            sink.completed.lock().as_slice(),
            &[(Handle(1), digest_secret(b"angryMonkey"))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn guard_released_after_store_write() {
        let (processor, store, _sink) = processor(Duration::from_millis(10));
        let controller = ShutdownController::new();
        controller.set_running();

        processor.submit(Handle(9), b"secret".to_vec(), controller.try_in_flight_guard().unwrap());
        controller.trigger_shutdown();
        controller.wait_for_drain().await;

        assert!(store.contains(Handle(9)));
    }

    #[tokio::test(start_paused = true)]
    async fn jobs_complete_independently() {
        let (processor, store, sink) = processor(Duration::from_secs(1));
        let controller = ShutdownController::new();

        let jobs: Vec<_> = (1..=5u64)
            .map(|i| {
                processor.submit(
                    Handle(i),
                    format!("secret-{i}").into_bytes(),
                    controller.in_flight_guard(),
                )
            })
            .collect();
        for job in jobs {
            job.await.unwrap();
        }

        assert_eq!(store.len(), 5);
        assert_eq!(sink.completed.lock().len(), 5);
        for i in 1..=5u64 {
            assert_eq!(
                store.get(Handle(i)).unwrap().value,
                digest_secret(format!("secret-{i}").as_bytes())
            );
        }
    }
}
