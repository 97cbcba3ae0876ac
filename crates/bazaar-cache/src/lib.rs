//! # Bazaar Cache
//!
//! Cache-aside store used by gateway service methods.
//!
//! A [`CacheStore`] builds deterministic keys, reads and writes JSON values
//! with a TTL, populates on miss through [`CacheStore::get_or_set`], and
//! invalidates in bulk by glob pattern. Backend failures never reach the
//! caller: reads degrade to a miss, writes and deletes to a no-op, each
//! with a log line.

pub mod backend;
pub mod error;
pub mod key;
mod single_flight;
mod store;

pub use backend::{KeyValueBackend, MemoryBackend, RedisBackend, ScanPage};
pub use error::{CacheError, CacheResult};
pub use key::{cache_key, KeyParam, KeyParams};
pub use store::CacheStore;
