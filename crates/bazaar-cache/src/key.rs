//! Deterministic cache key construction.
//!
//! A key is `prefix` followed by `:name:value` for every present parameter,
//! ordered by parameter name. Null and empty-string parameters are dropped,
//! so optional filters that were not supplied share a key with the same
//! query that omits them.

use std::collections::BTreeMap;

/// A single key parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyParam {
    /// String value. Empty strings are treated as absent.
    Str(String),
    /// Signed integer value.
    Int(i64),
    /// Unsigned integer value.
    UInt(u64),
    /// Floating point value, rendered without a trailing `.0`. Non-finite
    /// values render as `NaN`, `Infinity` and `-Infinity`.
    Float(f64),
    /// Boolean value.
    Bool(bool),
    /// Absent value.
    Null,
}

impl KeyParam {
    fn render(&self) -> Option<String> {
        match self {
            Self::Str(s) if s.is_empty() => None,
            Self::Str(s) => Some(s.clone()),
            Self::Int(n) => Some(n.to_string()),
            Self::UInt(n) => Some(n.to_string()),
            Self::Float(n) if n.is_nan() => Some("NaN".to_string()),
            Self::Float(n) if n.is_infinite() => Some(if *n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()),
            Self::Float(n) => Some(n.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Null => None,
        }
    }
}

impl From<&str> for KeyParam {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for KeyParam {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&String> for KeyParam {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

macro_rules! key_param_from {
    ($variant:ident as $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for KeyParam {
                fn from(value: $source) -> Self {
                    Self::$variant(<$target>::from(value))
                }
            }
        )+
    };
}

key_param_from!(Int as i64: i8, i16, i32, i64);
key_param_from!(UInt as u64: u8, u16, u32, u64);
key_param_from!(Float as f64: f32, f64);

impl From<usize> for KeyParam {
    fn from(value: usize) -> Self {
        Self::UInt(value as u64)
    }
}

impl From<bool> for KeyParam {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<KeyParam>> From<Option<T>> for KeyParam {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Named parameters for a cache key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyParams {
    entries: Vec<(String, KeyParam)>,
}

impl KeyParams {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<KeyParam>) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds a parameter. A later value for the same name replaces the earlier one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<KeyParam>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Returns true if no parameter was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for KeyParams
where
    K: Into<String>,
    V: Into<KeyParam>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// Builds the key for `prefix` and `params`.
#[must_use]
pub fn cache_key(prefix: &str, params: &KeyParams) -> String {
    let latest: BTreeMap<&str, &KeyParam> = params
        .entries
        .iter()
        .map(|(name, value)| (name.as_str(), value))
        .collect();

    let mut key = prefix.to_string();
    for (name, value) in latest {
        if let Some(rendered) = value.render() {
            key.push(':');
            key.push_str(name);
            key.push(':');
            key.push_str(&rendered);
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_only() {
        assert_eq!(cache_key("product:all", &KeyParams::new()), "product:all");
    }

    #[test]
    fn test_params_sorted_by_name() {
        let params = KeyParams::new().with("page", 2).with("category", "shoes").with("limit", 20u32);
        assert_eq!(cache_key("product:list", &params), "product:list:category:shoes:limit:20:page:2");
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let a = KeyParams::new().with("b", 2).with("a", 1);
        let b = KeyParams::new().with("a", 1).with("b", 2);
        assert_eq!(cache_key("p", &a), cache_key("p", &b));
        assert_eq!(cache_key("p", &a), "p:a:1:b:2");
    }

    #[test]
    fn test_absent_params_are_dropped() {
        let params = KeyParams::new()
            .with("a", 1)
            .with("b", Option::<i32>::None)
            .with("c", "")
            .with("d", KeyParam::Null);
        assert_eq!(cache_key("p", &params), "p:a:1");
    }

    #[test]
    fn test_zero_and_false_are_kept() {
        let params = KeyParams::new().with("offset", 0).with("active", false);
        assert_eq!(cache_key("p", &params), "p:active:false:offset:0");
    }

    #[test]
    fn test_float_rendering() {
        let params = KeyParams::new().with("min", 1.0).with("max", 2.5);
        assert_eq!(cache_key("price", &params), "price:max:2.5:min:1");
    }

    #[test]
    fn test_non_finite_float_rendering() {
        let params = KeyParams::new()
            .with("max", f64::INFINITY)
            .with("min", f64::NEG_INFINITY)
            .with("ratio", f64::NAN);
        assert_eq!(cache_key("price", &params), "price:max:Infinity:min:-Infinity:ratio:NaN");
    }

    #[test]
    fn test_last_duplicate_wins() {
        let params = KeyParams::new().with("page", 1).with("page", 3);
        assert_eq!(cache_key("p", &params), "p:page:3");
    }

    #[test]
    fn test_from_iterator() {
        let params: KeyParams = [("id", "42"), ("locale", "en")].into_iter().collect();
        assert_eq!(cache_key("product:detail", &params), "product:detail:id:42:locale:en");
    }
}
