//! Cache key generators for catalog entries.

use crate::dto::ProductQuery;
use bazaar_cache::{cache_key, KeyParams};

const PRODUCT_DETAIL: &str = "product:detail";
const PRODUCT_LIST: &str = "product:list";

/// Builds catalog cache keys under an optional namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogKeys {
    namespace: Option<String>,
}

impl CatalogKeys {
    /// Creates a key builder. An empty namespace is ignored.
    #[must_use]
    pub fn new(namespace: Option<String>) -> Self {
        Self {
            namespace: namespace.filter(|ns| !ns.is_empty()),
        }
    }

    /// Key for a single product, e.g. `product:detail:id:42`.
    #[must_use]
    pub fn product_detail(&self, id: u64) -> String {
        self.namespaced(cache_key(PRODUCT_DETAIL, &KeyParams::new().with("id", id)))
    }

    /// Key for one product listing.
    #[must_use]
    pub fn product_list(&self, query: &ProductQuery) -> String {
        self.namespaced(cache_key(PRODUCT_LIST, &query.key_params()))
    }

    /// Pattern matching every product listing.
    #[must_use]
    pub fn product_list_pattern(&self) -> String {
        self.namespaced(format!("{}*", PRODUCT_LIST))
    }

    fn namespaced(&self, key: String) -> String {
        match &self.namespace {
            Some(ns) => format!("{}:{}", ns, key),
            None => key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_detail_key() {
        assert_eq!(CatalogKeys::default().product_detail(42), "product:detail:id:42");
    }

    #[test]
    fn test_product_list_key() {
        let query = ProductQuery {
            search: Some("desk lamp".into()),
            ..ProductQuery::default()
        };
        assert_eq!(
            CatalogKeys::default().product_list(&query),
            "product:list:page:0:search:desk lamp:size:20"
        );
    }

    #[test]
    fn test_namespace_prefixes_keys_and_patterns() {
        let keys = CatalogKeys::new(Some("staging".into()));
        assert_eq!(keys.product_detail(1), "staging:product:detail:id:1");
        assert_eq!(keys.product_list_pattern(), "staging:product:list*");
    }

    #[test]
    fn test_empty_namespace_is_ignored() {
        let keys = CatalogKeys::new(Some(String::new()));
        assert_eq!(keys.product_list_pattern(), "product:list*");
    }
}
