//! Application configuration structures.

use bazaar_core::TelemetryConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name and metadata.
    #[serde(default)]
    pub app: AppMetadata,

    /// Redis connection backing the general cache.
    #[serde(default)]
    pub redis: RedisConfig,

    /// Redis connection backing the edge (detail lookup) cache.
    #[serde(default = "RedisConfig::edge")]
    pub edge_redis: RedisConfig,

    /// Cache-aside store defaults.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Remote call guard defaults.
    #[serde(default)]
    pub call_guard: CallGuardConfig,

    /// Gateway service tuning.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: TelemetryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppMetadata::default(),
            redis: RedisConfig::default(),
            edge_redis: RedisConfig::edge(),
            cache: CacheConfig::default(),
            call_guard: CallGuardConfig::default(),
            gateway: GatewayConfig::default(),
            observability: TelemetryConfig::default(),
        }
    }
}

/// Application metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppMetadata {
    /// Application name.
    pub name: String,
    /// Environment (development, staging, production).
    pub environment: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "bazaar-gateway".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Redis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Redis URL.
    pub url: String,
    /// Connection pool size.
    pub pool_size: u32,
    /// Enable Redis. When disabled the store falls back to process memory.
    pub enabled: bool,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379/0".to_string(),
            pool_size: 10,
            enabled: true,
        }
    }
}

impl RedisConfig {
    /// Defaults for the edge cache connection (separate logical database).
    #[must_use]
    pub fn edge() -> Self {
        Self {
            url: "redis://localhost:6379/1".to_string(),
            ..Self::default()
        }
    }
}

/// Cache-aside store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL applied when a write does not specify one.
    pub default_ttl_secs: u64,
    /// Serialized values above this size are logged as suspicious.
    pub size_warn_threshold_bytes: usize,
    /// `COUNT` hint for each SCAN batch during pattern invalidation.
    pub scan_batch_size: usize,
    /// Coalesce concurrent misses for the same key within this process.
    pub single_flight: bool,
    /// Prefix prepended to every key the gateway builds, e.g. `staging`.
    pub key_namespace: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: 300, // 5 minutes
            size_warn_threshold_bytes: 1024 * 1024,
            scan_batch_size: 100,
            single_flight: false,
            key_namespace: None,
        }
    }
}

impl CacheConfig {
    /// Returns the default TTL as a Duration.
    #[must_use]
    pub const fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }
}

/// Defaults for guarded remote calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CallGuardConfig {
    /// Deadline for a single attempt, in milliseconds.
    pub timeout_ms: u64,
    /// Additional attempts after the first.
    pub retries: u32,
    /// Fixed delay between attempts, in milliseconds.
    pub delay_retry_ms: u64,
}

impl Default for CallGuardConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 3000,
            retries: 0,
            delay_retry_ms: 500,
        }
    }
}

impl CallGuardConfig {
    /// Returns the per-attempt timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Returns the inter-attempt delay as a Duration.
    #[must_use]
    pub const fn delay_retry(&self) -> Duration {
        Duration::from_millis(self.delay_retry_ms)
    }
}

/// Gateway service tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// TTL for product detail entries in the edge cache.
    pub detail_ttl_secs: u64,
    /// TTL for product listing entries in the general cache.
    pub list_ttl_secs: u64,
    /// Additional attempts for detail lookups.
    pub detail_retries: u32,
    /// Serve an empty page when the catalog service is down.
    pub list_fallback_empty: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            detail_ttl_secs: 600,
            list_ttl_secs: 60,
            detail_retries: 1,
            list_fallback_empty: true,
        }
    }
}

impl GatewayConfig {
    /// Returns the detail TTL as a Duration.
    #[must_use]
    pub const fn detail_ttl(&self) -> Duration {
        Duration::from_secs(self.detail_ttl_secs)
    }

    /// Returns the list TTL as a Duration.
    #[must_use]
    pub const fn list_ttl(&self) -> Duration {
        Duration::from_secs(self.list_ttl_secs)
    }
}
