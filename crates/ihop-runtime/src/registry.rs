use std::collections::BTreeMap;

use serde_json::{Map, Value};
use url::Url;

#[derive(Debug, Clone, Default, PartialEq)]
/// Request-scoped URI → schema document lookup built from `case.registry`.
///
/// Keys are stored without their fragment so `…/schema#` and `…/schema`
/// resolve to the same document.
pub struct SchemaRegistry {
    documents: BTreeMap<String, Value>,
    skipped_keys: Vec<String>,
}

impl SchemaRegistry {
    /// Build a registry from the raw `case.registry` object.
    ///
    /// Keys that do not parse as absolute URIs are dropped; the engine will then
    /// surface any reference to them as an ordinary compile failure.
    pub fn build(entries: Map<String, Value>) -> Self {
        let mut registry = Self::default();
        for (key, document) in entries {
            match normalize_registry_uri(&key) {
                Some(uri) => {
                    registry.documents.insert(uri, document);
                }
                None => {
                    tracing::debug!(key = %key, "skipping registry entry without an absolute URI");
                    registry.skipped_keys.push(key);
                }
            }
        }
        registry
    }

    pub fn resolve(&self, uri: &str) -> Option<&Value> {
        let normalized = normalize_registry_uri(uri)?;
        self.documents.get(&normalized)
    }

    /// Normalized URI and document pairs, ordered by URI.
    pub fn documents(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.documents
            .iter()
            .map(|(uri, document)| (uri.as_str(), document))
    }

    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    pub fn skipped_keys(&self) -> &[String] {
        &self.skipped_keys
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Parse `raw` as an absolute URI and strip its fragment.
pub fn normalize_registry_uri(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw.trim()).ok()?;
    url.set_fragment(None);
    Some(url.into())
}
