//! Remote catalog service contract.

use crate::dto::{ProductDto, ProductPage, ProductQuery, ProductUpdate};
use async_trait::async_trait;
use bazaar_resilience::RemoteError;

/// Client for the remote catalog service.
///
/// Implementations translate transport failures into [`RemoteError`] at this
/// boundary, e.g. with `RemoteError::from(tonic::Status)`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetches one product.
    async fn get_product(&self, id: u64) -> Result<ProductDto, RemoteError>;

    /// Lists products matching `query`.
    async fn list_products(&self, query: ProductQuery) -> Result<ProductPage, RemoteError>;

    /// Applies `update` and returns the updated product.
    async fn update_product(&self, id: u64, update: ProductUpdate) -> Result<ProductDto, RemoteError>;

    /// Deletes a product.
    async fn delete_product(&self, id: u64) -> Result<(), RemoteError>;
}
