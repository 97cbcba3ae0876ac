//! Key-value backends behind the cache store.

mod memory;
mod redis;

pub use self::memory::MemoryBackend;
pub use self::redis::RedisBackend;

use crate::error::CacheResult;
use async_trait::async_trait;

/// One page of a cursor scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    /// Cursor for the next call; `0` once the scan is complete.
    pub cursor: u64,
    /// Keys matched in this page. May repeat keys from earlier pages.
    pub keys: Vec<String>,
}

impl ScanPage {
    /// Creates a scan page.
    #[must_use]
    pub fn new(cursor: u64, keys: Vec<String>) -> Self {
        Self { cursor, keys }
    }
}

/// The subset of Redis commands the cache store relies on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueBackend: Send + Sync {
    /// GET: returns the raw stored string, if any.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// SETEX: stores `value` under `key` for `ttl_secs` seconds.
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> CacheResult<()>;

    /// DEL: returns the number of keys removed.
    async fn del(&self, key: &str) -> CacheResult<u64>;

    /// SCAN with `MATCH pattern COUNT count`, starting at `cursor`.
    async fn scan(&self, cursor: u64, pattern: &str, count: usize) -> CacheResult<ScanPage>;

    /// Deletes all `keys` in a single pipelined round trip.
    async fn del_many(&self, keys: &[String]) -> CacheResult<u64>;

    /// PING.
    async fn ping(&self) -> CacheResult<()>;

    /// Releases the underlying connections.
    async fn close(&self);

    /// Short backend label used in logs.
    fn kind(&self) -> &'static str;
}
