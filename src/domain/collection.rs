//! Category → collection path mapping for one site

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ScraperError, ScraperResult};

/// Read-only mapping from a logical category name to a site-relative
/// collection path. Passed explicitly to the lister so tests can swap it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionMap(BTreeMap<String, String>);

impl CollectionMap {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self(entries)
    }

    /// Collections of the divinikey.com Shopify store
    pub fn divinikey() -> Self {
        [
            ("switches", "/collections/switches"),
            ("keycaps", "/collections/new-keycaps"),
            ("cases", "/collections/keyboard-kits"),
            ("pcbs", "/collections/pcb"),
            ("plates", "/collections/keyboard-plates"),
            ("stabilizers", "/collections/keyboard-stabilizers"),
        ]
        .into_iter()
        .collect()
    }

    /// Resolve a category to its collection path
    pub fn resolve(&self, category: &str) -> ScraperResult<&str> {
        self.0
            .get(category)
            .map(String::as_str)
            .ok_or_else(|| ScraperError::UnknownCategory {
                category: category.to_string(),
                known: self.names().map(str::to_string).collect(),
            })
    }

    pub fn contains(&self, category: &str) -> bool {
        self.0.contains_key(category)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for CollectionMap {
    fn default() -> Self {
        Self::divinikey()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CollectionMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
