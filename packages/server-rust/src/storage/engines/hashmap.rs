//! In-memory [`ResultStore`] backed by [`DashMap`].
//!
//! Each operation takes exactly one shard lock for its duration and never
//! holds it across an await point. Entries are never evicted, so the map
//! grows with the number of completed jobs.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use hashvault_core::Handle;

use crate::storage::record::ResultEntry;
use crate::storage::results::ResultStore;

/// Result store backed by a sharded concurrent hash map.
#[derive(Debug, Default)]
pub struct HashMapResultStore {
    entries: DashMap<Handle, ResultEntry>,
}

impl HashMapResultStore {
    /// Creates a new, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl ResultStore for HashMapResultStore {
    fn put(&self, entry: ResultEntry) -> bool {
        match self.entries.entry(entry.handle) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
        }
    }

    fn get(&self, handle: Handle) -> Option<ResultEntry> {
        self.entries.get(&handle).map(|r| r.clone())
    }

    fn contains(&self, handle: Handle) -> bool {
        self.entries.contains_key(&handle)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
