//! Cache error types.

use bazaar_core::BazaarError;
use thiserror::Error;

/// Result type for cache backend operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-related errors.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Redis pool error.
    #[error("Redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    /// A lookup was attempted with an empty key.
    #[error("Cache key must not be empty")]
    EmptyKey,

    /// The backend has been closed.
    #[error("Cache backend is closed")]
    Closed,

    /// The backend rejected the command.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<CacheError> for BazaarError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::EmptyKey => BazaarError::EmptyCacheKey,
            CacheError::Configuration(msg) => BazaarError::Configuration(msg),
            other => BazaarError::Cache(other.to_string()),
        }
    }
}
