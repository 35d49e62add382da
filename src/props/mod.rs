//! Property model.
//!
//! # Data Flow
//! ```text
//! handler / context / shared state
//!     → Props (key → Prop bag)
//!     → page pipeline (filtering, manifests)
//!     → Prop::resolve (concrete JSON values)
//! ```

pub mod prop;

use std::collections::hash_map::{self, HashMap};

pub use prop::{Prop, PropFn, PropKind, ProvideProp, DEFAULT_DEFER_GROUP};

/// Validation messages keyed by field, sent to the client under `errors`.
pub type ValidationErrors = serde_json::Map<String, serde_json::Value>;

/// A bag of props keyed by name. Inserting an existing key replaces it.
#[derive(Debug, Clone, Default)]
pub struct Props(HashMap<String, Prop>);

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, prop: impl Into<Prop>) -> Option<Prop> {
        self.0.insert(key.into(), prop.into())
    }

    /// Builder form of [`Props::insert`].
    pub fn with(mut self, key: impl Into<String>, prop: impl Into<Prop>) -> Self {
        self.insert(key, prop);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Prop> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Prop> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, Prop> {
        self.0.iter()
    }

    /// Layer `other` on top of this bag; its keys win.
    pub fn extend(&mut self, other: Props) {
        self.0.extend(other.0);
    }
}

impl<K: Into<String>, P: Into<Prop>> FromIterator<(K, P)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, P)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, p)| (k.into(), p.into())).collect())
    }
}

impl<K: Into<String>, P: Into<Prop>, const N: usize> From<[(K, P); N]> for Props {
    fn from(entries: [(K, P); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl IntoIterator for Props {
    type Item = (String, Prop);
    type IntoIter = hash_map::IntoIter<String, Prop>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Props {
    type Item = (&'a String, &'a Prop);
    type IntoIter = hash_map::Iter<'a, String, Prop>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_later_layer_overwrites_by_key() {
        let mut base = Props::from([("a", 1), ("b", 2)]);
        base.extend(Props::from([("b", 20), ("c", 30)]));

        assert_eq!(base.len(), 3);
        assert_eq!(base.get("a").unwrap().resolve().unwrap(), json!(1));
        assert_eq!(base.get("b").unwrap().resolve().unwrap(), json!(20));
        assert_eq!(base.get("c").unwrap().resolve().unwrap(), json!(30));
    }

    #[test]
    fn test_builder_accepts_mixed_props() {
        let props = Props::new()
            .with("text", "world")
            .with("lazy", Prop::func(|| json!([1, 2])).optional());

        assert!(props.contains_key("text"));
        assert!(props.get("lazy").unwrap().ignore_on_first_load());
    }
}
