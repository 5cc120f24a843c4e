//! In-memory result storage.
//!
//! - [`ResultStore`]: handle-keyed, insert-once storage trait
//! - [`ResultEntry`]: a finished digest plus its creation time
//! - [`engines`]: concrete store implementations

pub mod engines;
pub mod record;
pub mod results;

pub use engines::HashMapResultStore;
pub use record::*;
pub use results::*;
