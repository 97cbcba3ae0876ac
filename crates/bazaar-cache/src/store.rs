//! Cache-aside store.

use crate::backend::{KeyValueBackend, MemoryBackend};
use crate::error::CacheError;
use crate::key::{cache_key, KeyParams};
use crate::single_flight::SingleFlight;
use bazaar_config::CacheConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Cache-aside store over a [`KeyValueBackend`].
///
/// Values are stored as JSON. Every backend failure is logged and absorbed:
/// reads report a miss, writes and deletes report `false` or `0`. Only
/// [`get_or_set`](Self::get_or_set) can fail, and only with the error its
/// compute function returned or with [`CacheError::EmptyKey`].
pub struct CacheStore {
    name: String,
    backend: Arc<dyn KeyValueBackend>,
    config: CacheConfig,
    flights: Option<SingleFlight>,
}

impl CacheStore {
    /// Creates a store named `name` over `backend`.
    pub fn new(name: impl Into<String>, backend: Arc<dyn KeyValueBackend>, config: CacheConfig) -> Self {
        let flights = config.single_flight.then(SingleFlight::new);
        Self {
            name: name.into(),
            backend,
            config,
            flights,
        }
    }

    /// Creates a store over a fresh [`MemoryBackend`].
    pub fn in_memory(name: impl Into<String>, config: CacheConfig) -> Self {
        Self::new(name, Arc::new(MemoryBackend::new()), config)
    }

    /// Store name used in logs and metrics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the store's configuration.
    #[must_use]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Builds a deterministic key from `prefix` and `params`.
    pub fn generate_key(&self, prefix: &str, params: &KeyParams) -> String {
        if prefix.is_empty() {
            warn!(cache = %self.name, "Generating cache key with an empty prefix");
        }
        cache_key(prefix, params)
    }

    /// Reads and deserializes the value under `key`.
    ///
    /// Returns `None` on a miss, on a stored JSON `null`, on backend failure,
    /// and on an entry that does not deserialize. Undecodable entries are
    /// deleted.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if key.is_empty() {
            warn!(cache = %self.name, "Cache get called with an empty key");
            return None;
        }

        let raw = match self.backend.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(cache = %self.name, key, "Cache miss");
                self.record("miss");
                return None;
            }
            Err(e) => {
                warn!(cache = %self.name, key, error = %e, "Cache read failed, treating as miss");
                self.record("degraded");
                return None;
            }
        };

        match serde_json::from_str::<Option<T>>(&raw) {
            Ok(Some(value)) => {
                debug!(cache = %self.name, key, "Cache hit");
                self.record("hit");
                Some(value)
            }
            Ok(None) => {
                debug!(cache = %self.name, key, "Cached null treated as miss");
                self.record("miss");
                None
            }
            Err(e) => {
                warn!(cache = %self.name, key, error = %e, "Discarding undecodable cache entry");
                self.record("corrupt");
                self.delete(key).await;
                None
            }
        }
    }

    /// Serializes `value` and stores it under `key`.
    ///
    /// `ttl` defaults to [`CacheConfig::default_ttl`] and is rounded down to
    /// whole seconds, with a minimum of one second. Returns `true` if the
    /// backend accepted the write.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<Duration>) -> bool {
        if key.is_empty() {
            warn!(cache = %self.name, "Cache set called with an empty key");
            return false;
        }

        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(cache = %self.name, key, error = %e, "Failed to serialize cache value");
                return false;
            }
        };

        if payload == "null" {
            warn!(cache = %self.name, key, "Storing null, reads will report a miss");
        }
        if payload.len() > self.config.size_warn_threshold_bytes {
            warn!(
                cache = %self.name,
                key,
                size = payload.len(),
                threshold = self.config.size_warn_threshold_bytes,
                "Large cache entry"
            );
        }

        let ttl_secs = ttl.unwrap_or_else(|| self.config.default_ttl()).as_secs().max(1);

        match self.backend.set_ex(key, &payload, ttl_secs).await {
            Ok(()) => {
                debug!(cache = %self.name, key, ttl_secs, "Cache entry stored");
                true
            }
            Err(e) => {
                warn!(cache = %self.name, key, error = %e, "Cache write failed");
                self.record("degraded");
                false
            }
        }
    }

    /// Returns the cached value under `key`, or computes, stores, and
    /// returns it.
    ///
    /// An error from `compute` is returned unchanged and nothing is stored.
    /// A failed store after a successful compute only logs.
    pub async fn get_or_set<T, E, F, Fut>(&self, key: &str, compute: F, ttl: Option<Duration>) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError> + fmt::Display,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if key.is_empty() {
            return Err(CacheError::EmptyKey.into());
        }

        if let Some(value) = self.get(key).await {
            return Ok(value);
        }

        let _flight = match &self.flights {
            Some(flights) => {
                let guard = flights.acquire(key).await;
                if let Some(value) = self.get(key).await {
                    return Ok(value);
                }
                Some(guard)
            }
            None => None,
        };

        let value = match compute().await {
            Ok(value) => value,
            Err(e) => {
                warn!(cache = %self.name, key, error = %e, "Cache compute failed");
                return Err(e);
            }
        };

        if !self.set(key, &value, ttl).await {
            warn!(cache = %self.name, key, "Computed value was not cached");
        }

        Ok(value)
    }

    /// Removes `key`. Returns `true` if a key was removed.
    pub async fn delete(&self, key: &str) -> bool {
        if key.is_empty() {
            warn!(cache = %self.name, "Cache delete called with an empty key");
            return false;
        }

        match self.backend.del(key).await {
            Ok(removed) => {
                debug!(cache = %self.name, key, removed, "Cache entry deleted");
                removed > 0
            }
            Err(e) => {
                warn!(cache = %self.name, key, error = %e, "Cache delete failed");
                self.record("degraded");
                false
            }
        }
    }

    /// Removes every key matching the glob `pattern`.
    ///
    /// Walks the full cursor scan first, then deletes all matched keys in a
    /// single pipelined round trip. Returns the number of keys removed, or
    /// `0` if the scan or the delete failed.
    pub async fn delete_by_pattern(&self, pattern: &str) -> u64 {
        if pattern.is_empty() {
            warn!(cache = %self.name, "Cache pattern delete called with an empty pattern");
            return 0;
        }

        let mut matched = BTreeSet::new();
        let mut cursor = 0;
        loop {
            match self.backend.scan(cursor, pattern, self.config.scan_batch_size).await {
                Ok(page) => {
                    matched.extend(page.keys);
                    cursor = page.cursor;
                }
                Err(e) => {
                    warn!(cache = %self.name, pattern, error = %e, "Cache scan failed");
                    self.record("degraded");
                    return 0;
                }
            }
            if cursor == 0 {
                break;
            }
        }

        if matched.is_empty() {
            debug!(cache = %self.name, pattern, "No cache entries matched pattern");
            return 0;
        }

        let keys: Vec<String> = matched.into_iter().collect();
        match self.backend.del_many(&keys).await {
            Ok(removed) => {
                info!(cache = %self.name, pattern, matched = keys.len(), removed, "Cache entries invalidated");
                removed
            }
            Err(e) => {
                warn!(cache = %self.name, pattern, error = %e, "Cache pattern delete failed");
                self.record("degraded");
                0
            }
        }
    }

    /// Returns true if the backend answers a PING.
    pub async fn ping(&self) -> bool {
        match self.backend.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!(cache = %self.name, error = %e, "Cache ping failed");
                false
            }
        }
    }

    /// Releases the backend's connections.
    pub async fn close(&self) {
        self.backend.close().await;
        info!(cache = %self.name, backend = self.backend.kind(), "Cache store closed");
    }

    fn record(&self, result: &'static str) {
        metrics::counter!(
            "bazaar_cache_operations_total",
            "cache" => self.name.clone(),
            "result" => result
        )
        .increment(1);
    }
}

impl fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("name", &self.name)
            .field("backend", &self.backend.kind())
            .field("config", &self.config)
            .finish()
    }
}
