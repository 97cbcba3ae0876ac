//! Shared infrastructure for gateway services.

use crate::cache_keys::CatalogKeys;
use crate::catalog::CatalogGateway;
use crate::client::CatalogClient;
use bazaar_cache::{CacheStore, RedisBackend};
use bazaar_config::{AppConfig, CacheConfig, RedisConfig};
use bazaar_core::BazaarResult;
use bazaar_resilience::CallGuard;
use std::sync::Arc;
use tracing::{info, warn};

/// Cache stores and call guard shared by every gateway service.
pub struct Infrastructure {
    /// General-purpose cache, used for listings.
    pub general_cache: Arc<CacheStore>,
    /// Edge cache for hot single-entity lookups.
    pub edge_cache: Arc<CacheStore>,
    /// Guard configured with the application defaults.
    pub call_guard: CallGuard,
    config: AppConfig,
}

impl Infrastructure {
    /// Connects both cache stores.
    ///
    /// A store whose Redis section is disabled runs in memory. An enabled
    /// Redis that does not answer a PING fails startup, and a store that
    /// already connected is closed again.
    pub async fn connect(config: &AppConfig) -> BazaarResult<Self> {
        let general_cache = connect_store("general", &config.redis, &config.cache).await?;
        let edge_cache = match connect_store("edge", &config.edge_redis, &config.cache).await {
            Ok(store) => store,
            Err(e) => {
                warn!(error = %e, "Edge cache unavailable, closing general cache");
                general_cache.close().await;
                return Err(e);
            }
        };

        Ok(Self {
            general_cache: Arc::new(general_cache),
            edge_cache: Arc::new(edge_cache),
            call_guard: CallGuard::new(config.call_guard.clone()),
            config: config.clone(),
        })
    }

    /// Builds the catalog gateway over these stores.
    pub fn catalog(&self, client: Arc<dyn CatalogClient>) -> CatalogGateway {
        CatalogGateway::new(
            client,
            self.call_guard.clone(),
            Arc::clone(&self.general_cache),
            Arc::clone(&self.edge_cache),
            CatalogKeys::new(self.config.cache.key_namespace.clone()),
            self.config.gateway.clone(),
        )
    }

    /// Closes both cache stores.
    pub async fn shutdown(&self) {
        info!("Shutting down gateway infrastructure...");
        tokio::join!(self.general_cache.close(), self.edge_cache.close());
        info!("Gateway infrastructure shut down");
    }
}

async fn connect_store(name: &str, redis: &RedisConfig, cache: &CacheConfig) -> BazaarResult<CacheStore> {
    if !redis.enabled {
        info!(cache = name, "Redis disabled, using in-memory cache");
        return Ok(CacheStore::in_memory(name, cache.clone()));
    }

    let backend = RedisBackend::connect(redis).await?;
    info!(cache = name, "Cache store connected to Redis");
    Ok(CacheStore::new(name, Arc::new(backend), cache.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(general_enabled: bool, edge_url: &str) -> AppConfig {
        let mut config = AppConfig::default();
        config.redis.enabled = general_enabled;
        config.edge_redis = RedisConfig {
            url: edge_url.to_string(),
            enabled: true,
            ..RedisConfig::edge()
        };
        config
    }

    #[tokio::test]
    async fn test_unreachable_edge_redis_fails_startup() {
        let result = Infrastructure::connect(&config(false, "redis://127.0.0.1:1/1")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_in_memory_stores_when_redis_disabled() {
        let mut config = config(false, "redis://127.0.0.1:1/1");
        config.edge_redis.enabled = false;

        let infra = Infrastructure::connect(&config).await.unwrap();
        assert!(infra.general_cache.ping().await);
        assert!(infra.edge_cache.ping().await);
        infra.shutdown().await;
    }
}
