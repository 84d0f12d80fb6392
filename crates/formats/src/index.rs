//! The category index document (`index.json`).
//!
//! Shape: a single JSON object mapping category ids to label records,
//! `{"Q6465": {"en": "...", "fr": "..."}, ...}`. Ids are opaque strings;
//! the pipeline that publishes the data uses Wikidata identifiers.

use std::collections::BTreeMap;

use crate::labels::LabelRecord;

#[derive(Debug)]
pub enum IndexError {
    NotAnObject,
    InvalidEntry { id: String, reason: String },
}

impl std::fmt::Display for IndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexError::NotAnObject => {
                write!(f, "expected a JSON object of id -> labels")
            }
            IndexError::InvalidEntry { id, reason } => {
                write!(f, "invalid index entry {id}: {reason}")
            }
        }
    }
}

impl std::error::Error for IndexError {}

/// Parsed category index. Entries that cannot label the default language are
/// dropped rather than failing the document; `skipped` counts them so the
/// caller can surface a diagnostic.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CategoryIndexDoc {
    pub entries: BTreeMap<String, LabelRecord>,
    pub skipped: usize,
}

impl CategoryIndexDoc {
    pub fn from_json_str(payload: &str) -> Result<Self, IndexError> {
        let value: serde_json::Value =
            serde_json::from_str(payload).map_err(|e| IndexError::InvalidEntry {
                id: String::new(),
                reason: format!("JSON parse error: {e}"),
            })?;
        Self::from_json_value(value)
    }

    pub fn from_json_value(value: serde_json::Value) -> Result<Self, IndexError> {
        let obj = value.as_object().ok_or(IndexError::NotAnObject)?;

        let mut entries = BTreeMap::new();
        let mut skipped = 0;
        for (id, labels_val) in obj {
            let labels_obj = labels_val
                .as_object()
                .ok_or_else(|| IndexError::InvalidEntry {
                    id: id.clone(),
                    reason: "labels must be an object".to_string(),
                })?;

            let mut record = LabelRecord::new();
            for (language, label) in labels_obj {
                let text = label.as_str().ok_or_else(|| IndexError::InvalidEntry {
                    id: id.clone(),
                    reason: format!("label for {language} must be a string"),
                })?;
                record.insert(language.clone(), text);
            }

            if record.has_default() {
                entries.insert(id.clone(), record);
            } else {
                skipped += 1;
            }
        }

        Ok(Self { entries, skipped })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
