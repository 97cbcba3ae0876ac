//! Catalog DTOs exchanged with the remote catalog service.

use bazaar_cache::KeyParams;
use serde::{Deserialize, Serialize};

/// Product as served by the catalog service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDto {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_cents: u64,
    pub stock: u32,
}

/// Filters and paging for a product listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    /// Zero-based page index.
    pub page: u32,
    pub size: u32,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            category: None,
            search: None,
            page: 0,
            size: 20,
        }
    }
}

impl ProductQuery {
    /// Cache key parameters for this query. Unset filters are omitted.
    #[must_use]
    pub fn key_params(&self) -> KeyParams {
        KeyParams::new()
            .with("category", self.category.as_deref())
            .with("search", self.search.as_deref())
            .with("page", self.page)
            .with("size", self.size)
    }
}

/// One page of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPage {
    pub items: Vec<ProductDto>,
    pub page: u32,
    pub size: u32,
    pub total: u64,
}

impl ProductPage {
    /// An empty page for `query`, served when the catalog is unreachable.
    #[must_use]
    pub fn empty(query: &ProductQuery) -> Self {
        Self {
            items: Vec::new(),
            page: query.page,
            size: query.size,
            total: 0,
        }
    }
}

/// Partial update of a product. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_cents: Option<u64>,
    pub stock: Option<u32>,
}
