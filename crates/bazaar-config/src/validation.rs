//! Configuration validation module.
//!
//! Provides validation for all configuration values, failing fast on
//! invalid configuration rather than at runtime.

use crate::{AppConfig, CacheConfig, CallGuardConfig, GatewayConfig, RedisConfig};
use bazaar_core::TelemetryConfig;
use std::fmt;
use url::Url;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    /// Pool size must be at least one.
    EmptyPool { name: String },
    /// Pool size exceeds maximum allowed.
    PoolSizeTooLarge { name: String, value: u32, maximum: u32 },
    /// URL format is invalid.
    InvalidUrl { url_type: String, message: String },
    /// Timeout or TTL value must be positive.
    NonPositiveValue { name: String },
    /// Log level is invalid.
    InvalidLogLevel { value: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPool { name } => {
                write!(f, "Pool size for {} must be at least 1", name)
            }
            Self::PoolSizeTooLarge { name, value, maximum } => {
                write!(
                    f,
                    "Pool size {} for {} exceeds maximum allowed ({})",
                    value, name, maximum
                )
            }
            Self::InvalidUrl { url_type, message } => {
                write!(f, "Invalid {} URL: {}", url_type, message)
            }
            Self::NonPositiveValue { name } => {
                write!(f, "'{}' must be positive", name)
            }
            Self::InvalidLogLevel { value } => {
                write!(
                    f,
                    "Invalid log level: '{}' (valid: trace, debug, info, warn, error)",
                    value
                )
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Maximum connection pool size.
    const MAX_POOL_SIZE: u32 = 256;
    /// Valid log levels.
    const VALID_LOG_LEVELS: &'static [&'static str] = &["trace", "debug", "info", "warn", "error"];

    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        Self::validate_redis("redis", &config.redis, &mut errors);
        Self::validate_redis("edge_redis", &config.edge_redis, &mut errors);
        Self::validate_cache(&config.cache, &mut errors);
        Self::validate_call_guard(&config.call_guard, &mut errors);
        Self::validate_gateway(&config.gateway, &mut errors);
        Self::validate_observability(&config.observability, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_redis(name: &str, config: &RedisConfig, errors: &mut Vec<ConfigValidationError>) {
        if !config.enabled {
            return;
        }

        match Url::parse(&config.url) {
            Ok(url) if matches!(url.scheme(), "redis" | "rediss") => {}
            Ok(url) => errors.push(ConfigValidationError::InvalidUrl {
                url_type: name.to_string(),
                message: format!("unsupported scheme '{}' (expected redis:// or rediss://)", url.scheme()),
            }),
            Err(e) => errors.push(ConfigValidationError::InvalidUrl {
                url_type: name.to_string(),
                message: e.to_string(),
            }),
        }

        if config.pool_size == 0 {
            errors.push(ConfigValidationError::EmptyPool {
                name: name.to_string(),
            });
        } else if config.pool_size > Self::MAX_POOL_SIZE {
            errors.push(ConfigValidationError::PoolSizeTooLarge {
                name: name.to_string(),
                value: config.pool_size,
                maximum: Self::MAX_POOL_SIZE,
            });
        }
    }

    fn validate_cache(config: &CacheConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.default_ttl_secs == 0 {
            errors.push(non_positive("cache.default_ttl_secs"));
        }
        if config.scan_batch_size == 0 {
            errors.push(non_positive("cache.scan_batch_size"));
        }
    }

    fn validate_call_guard(config: &CallGuardConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.timeout_ms == 0 {
            errors.push(non_positive("call_guard.timeout_ms"));
        }
    }

    fn validate_gateway(config: &GatewayConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.detail_ttl_secs == 0 {
            errors.push(non_positive("gateway.detail_ttl_secs"));
        }
        if config.list_ttl_secs == 0 {
            errors.push(non_positive("gateway.list_ttl_secs"));
        }
    }

    fn validate_observability(config: &TelemetryConfig, errors: &mut Vec<ConfigValidationError>) {
        let level = config.log_level.to_lowercase();
        if !Self::VALID_LOG_LEVELS.contains(&level.as_str()) {
            errors.push(ConfigValidationError::InvalidLogLevel {
                value: config.log_level.clone(),
            });
        }
    }
}

fn non_positive(name: &str) -> ConfigValidationError {
    ConfigValidationError::NonPositiveValue {
        name: name.to_string(),
    }
}
