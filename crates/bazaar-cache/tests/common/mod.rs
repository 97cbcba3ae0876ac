//! Common test infrastructure for Redis integration tests.

use bazaar_cache::RedisBackend;
use bazaar_config::RedisConfig;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::redis::Redis;

/// Test Redis container wrapper.
///
/// Keeps the container alive for as long as the backend is in use.
pub struct TestRedis {
    _container: ContainerAsync<Redis>,
    backend: RedisBackend,
}

impl TestRedis {
    /// Starts a fresh Redis container and connects a backend to it.
    pub async fn new() -> Self {
        let container = Redis::default()
            .start()
            .await
            .expect("Failed to start Redis container");

        let port = container
            .get_host_port_ipv4(6379)
            .await
            .expect("Failed to get Redis port");

        let config = RedisConfig {
            url: format!("redis://127.0.0.1:{}/0", port),
            pool_size: 4,
            enabled: true,
        };

        let backend = RedisBackend::connect(&config)
            .await
            .expect("Failed to connect to Redis");

        Self {
            _container: container,
            backend,
        }
    }

    /// Returns a clone of the connected backend.
    pub fn backend(&self) -> RedisBackend {
        self.backend.clone()
    }
}
