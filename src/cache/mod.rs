//! Translation cache and its persistent backing

pub mod persist;
pub mod store;

pub use persist::{MemoryStore, PersistentStore, RedbStore};
pub use store::CacheStore;
