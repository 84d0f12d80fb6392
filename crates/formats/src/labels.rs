//! Language-keyed display labels.
//!
//! Every published document stores labels the same way: a JSON object whose
//! keys are language codes and whose values are display strings, e.g.
//! `{"en": "Departments of France", "fr": "département français"}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use foundation::DEFAULT_LANGUAGE;

/// One labelled thing's translations. Key order is stable so serialized
/// output and iteration stay deterministic.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelRecord {
    labels: BTreeMap<String, String>,
}

impl LabelRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, language: impl Into<String>, label: impl Into<String>) {
        self.labels.insert(language.into(), label.into());
    }

    pub fn get(&self, language: &str) -> Option<&str> {
        self.labels.get(language).map(String::as_str)
    }

    /// Label in `language`, falling back to the default language.
    pub fn resolve(&self, language: &str) -> Option<&str> {
        self.get(language).or_else(|| self.get(DEFAULT_LANGUAGE))
    }

    /// Whether the record can label every supported display language, which
    /// requires the default-language entry to exist.
    pub fn has_default(&self) -> bool {
        self.labels.contains_key(DEFAULT_LANGUAGE)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Collects the string-valued entries of a GeoJSON `properties` object.
    /// Feature properties in the published datasets carry nothing else.
    pub fn from_properties(properties: &Map<String, Value>) -> Self {
        let mut labels = BTreeMap::new();
        for (key, value) in properties {
            if let Value::String(text) = value {
                labels.insert(key.clone(), text.clone());
            }
        }
        Self { labels }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelRecord {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let labels = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { labels }
    }
}
