//! # Bazaar Gateway
//!
//! Gateway-side catalog service. Reads go through the cache-aside stores
//! and fall through to the remote catalog service under a [`CallGuard`];
//! writes go straight to the remote service and invalidate what they touch.
//!
//! [`CallGuard`]: bazaar_resilience::CallGuard

pub mod cache_keys;
pub mod catalog;
pub mod client;
pub mod dto;
pub mod infrastructure;

pub use cache_keys::CatalogKeys;
pub use catalog::CatalogGateway;
pub use client::CatalogClient;
pub use dto::{ProductDto, ProductPage, ProductQuery, ProductUpdate};
pub use infrastructure::Infrastructure;
