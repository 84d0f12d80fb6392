//! Style expressions for labels and name filtering.
//!
//! These build MapLibre GL expression JSON. The renderer evaluates them per
//! feature; [`crate::filter::FilterEngine`] is the native twin used where no
//! renderer is running.

use serde_json::{Value, json};

use foundation::DEFAULT_LANGUAGE;

/// Expression selecting a feature's label in `language`, falling back to the
/// default language when the translation is missing.
pub fn label_expression(language: &str) -> Value {
    if language == DEFAULT_LANGUAGE {
        json!(["get", DEFAULT_LANGUAGE])
    } else {
        json!(["coalesce", ["get", language], ["get", DEFAULT_LANGUAGE]])
    }
}

/// Canonical form of a filter query: trimmed, lowercased. Empty output means
/// "match everything".
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Substring filter over the case-folded label in `language`, or `None` when
/// the query is empty and the layer filter should be cleared.
pub fn filter_expression(language: &str, query: &str) -> Option<Value> {
    let needle = normalize_query(query);
    if needle.is_empty() {
        return None;
    }
    Some(json!(["in", needle, ["downcase", label_expression(language)]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_language_reads_the_property_directly() {
        assert_eq!(label_expression("en"), json!(["get", "en"]));
    }

    #[test]
    fn other_languages_coalesce_onto_the_default() {
        assert_eq!(
            label_expression("fr"),
            json!(["coalesce", ["get", "fr"], ["get", "en"]])
        );
    }

    #[test]
    fn filter_folds_case_and_trims() {
        assert_eq!(
            filter_expression("fr", "  Saint "),
            Some(json!([
                "in",
                "saint",
                ["downcase", ["coalesce", ["get", "fr"], ["get", "en"]]]
            ]))
        );
    }

    #[test]
    fn blank_queries_clear_the_filter() {
        assert_eq!(filter_expression("en", ""), None);
        assert_eq!(filter_expression("en", "   "), None);
    }
}
