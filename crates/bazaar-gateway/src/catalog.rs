//! Catalog gateway service.

use crate::cache_keys::CatalogKeys;
use crate::client::CatalogClient;
use crate::dto::{ProductDto, ProductPage, ProductQuery, ProductUpdate};
use bazaar_cache::CacheStore;
use bazaar_config::GatewayConfig;
use bazaar_core::{BazaarError, BazaarResult};
use bazaar_resilience::{CallGuard, CallOptions};
use std::sync::Arc;
use tracing::{debug, warn};

const CATALOG_SERVICE: &str = "catalog";

/// Product reads and writes on behalf of gateway handlers.
///
/// Product details live in the edge cache, listings in the general cache.
/// Writes invalidate the detail entry of the product they touched and every
/// listing.
pub struct CatalogGateway {
    client: Arc<dyn CatalogClient>,
    guard: CallGuard,
    general: Arc<CacheStore>,
    edge: Arc<CacheStore>,
    keys: CatalogKeys,
    config: GatewayConfig,
}

impl CatalogGateway {
    /// Creates a new catalog gateway.
    pub fn new(
        client: Arc<dyn CatalogClient>,
        guard: CallGuard,
        general: Arc<CacheStore>,
        edge: Arc<CacheStore>,
        keys: CatalogKeys,
        config: GatewayConfig,
    ) -> Self {
        Self {
            client,
            guard,
            general,
            edge,
            keys,
            config,
        }
    }

    /// Gets a product, from the edge cache when possible.
    pub async fn get_product(&self, id: u64) -> BazaarResult<ProductDto> {
        let key = self.keys.product_detail(id);
        let options = || CallOptions::new().retries(self.config.detail_retries);

        self.edge
            .get_or_set(
                &key,
                || self.guard.call(CATALOG_SERVICE, || self.client.get_product(id), options()),
                Some(self.config.detail_ttl()),
            )
            .await
    }

    /// Lists products, from the general cache when possible.
    ///
    /// With `list_fallback_empty` set, an unreachable catalog yields an empty
    /// page. That page is not cached.
    pub async fn list_products(&self, query: ProductQuery) -> BazaarResult<ProductPage> {
        let key = self.keys.product_list(&query);

        let result = self
            .general
            .get_or_set(
                &key,
                || {
                    self.guard.call(
                        CATALOG_SERVICE,
                        || self.client.list_products(query.clone()),
                        CallOptions::new(),
                    )
                },
                Some(self.config.list_ttl()),
            )
            .await;

        match result {
            Err(BazaarError::ServiceUnavailable { message, .. }) if self.config.list_fallback_empty => {
                warn!(key = %key, error = %message, "Catalog unavailable, serving empty product page");
                Ok(ProductPage::empty(&query))
            }
            other => other,
        }
    }

    /// Updates a product and invalidates the entries it affects.
    pub async fn update_product(&self, id: u64, update: ProductUpdate) -> BazaarResult<ProductDto> {
        let product = self
            .guard
            .call(
                CATALOG_SERVICE,
                || self.client.update_product(id, update.clone()),
                CallOptions::new(),
            )
            .await?;

        self.invalidate(id).await;
        Ok(product)
    }

    /// Deletes a product and invalidates the entries it affects.
    pub async fn delete_product(&self, id: u64) -> BazaarResult<()> {
        self.guard
            .call(CATALOG_SERVICE, || self.client.delete_product(id), CallOptions::new())
            .await?;

        self.invalidate(id).await;
        Ok(())
    }

    async fn invalidate(&self, id: u64) {
        let detail = self.edge.delete(&self.keys.product_detail(id)).await;
        let listings = self.general.delete_by_pattern(&self.keys.product_list_pattern()).await;
        debug!(product_id = id, detail, listings, "Catalog cache invalidated");
    }
}
