//! In-memory category catalog.
//!
//! Wraps the parsed index document behind lookup and presentation queries.
//! The catalog never refreshes itself; the loader replaces it wholesale when
//! the index document arrives.

use std::collections::BTreeMap;

use formats::{CategoryIndexDoc, LabelRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryEntry {
    pub id: String,
    pub labels: LabelRecord,
}

impl CategoryEntry {
    /// Display label in `language`. Entries always carry the default
    /// language, so an empty result only happens for hand-built records.
    pub fn label(&self, language: &str) -> &str {
        self.labels.resolve(language).unwrap_or_default()
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CategoryIndex {
    entries: BTreeMap<String, CategoryEntry>,
}

impl CategoryIndex {
    /// Catalog with nothing in it, the state before (or after a failed)
    /// index load.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_doc(doc: CategoryIndexDoc) -> Self {
        let entries = doc
            .entries
            .into_iter()
            .map(|(id, labels)| {
                let entry = CategoryEntry {
                    id: id.clone(),
                    labels,
                };
                (id, entry)
            })
            .collect();
        Self { entries }
    }

    pub fn get(&self, id: &str) -> Option<&CategoryEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids in lexicographic order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// `(id, label)` pairs for the selector, ordered by label in `language`
    /// (case-insensitive) with the id as tie-break so equal labels keep a
    /// stable order.
    pub fn sorted_entries(&self, language: &str) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = self
            .entries
            .values()
            .map(|entry| (entry.id.clone(), entry.label(language).to_string()))
            .collect();
        out.sort_by(|a, b| {
            a.1.to_lowercase()
                .cmp(&b.1.to_lowercase())
                .then_with(|| a.0.cmp(&b.0))
        });
        out
    }
}
