//! Concrete [`ResultStore`](super::ResultStore) implementations.

pub mod hashmap;

pub use hashmap::HashMapResultStore;
