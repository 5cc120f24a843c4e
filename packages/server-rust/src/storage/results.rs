//! Result store trait: handle-keyed, insert-once storage of finished digests.

use hashvault_core::Handle;

use super::record::ResultEntry;

/// Concurrent mapping from [`Handle`] to the finished [`ResultEntry`].
///
/// Entries are immutable once inserted and there is no delete operation.
/// An entry becomes visible to every `get` that starts after `put` returns.
///
/// Wrapped in `Arc<dyn ResultStore>` for sharing across tasks.
pub trait ResultStore: Send + Sync + 'static {
    /// Inserts `entry` under its handle.
    ///
    /// Returns `false` and leaves the existing entry untouched if the handle
    /// is already present.
    fn put(&self, entry: ResultEntry) -> bool;

    /// Returns a copy of the entry for `handle`, or `None` if it is absent.
    ///
    /// Absent covers both "never submitted" and "still processing".
    fn get(&self, handle: Handle) -> Option<ResultEntry>;

    /// Checks whether an entry exists for `handle`.
    fn contains(&self, handle: Handle) -> bool;

    /// Number of stored entries.
    fn len(&self) -> usize;

    /// Whether the store holds no entries.
    fn is_empty(&self) -> bool;
}
