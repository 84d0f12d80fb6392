//! Native evaluation of the name filter.

use formats::LabelRecord;

use crate::expr::normalize_query;

/// Evaluates the same predicate as [`crate::expr::filter_expression`] against
/// parsed label records: case-insensitive substring match over the label
/// resolved for the engine's display language.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterEngine {
    language: String,
}

impl FilterEngine {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Empty queries match everything. A record with no resolvable label
    /// never matches a non-empty query; the renderer drops those features
    /// from filtered layers the same way.
    pub fn matches(&self, labels: &LabelRecord, query: &str) -> bool {
        let needle = normalize_query(query);
        if needle.is_empty() {
            return true;
        }
        match labels.resolve(&self.language) {
            Some(label) => label.to_lowercase().contains(&needle),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> LabelRecord {
        pairs.iter().copied().collect()
    }

    #[test]
    fn matches_are_case_insensitive_substrings() {
        let engine = FilterEngine::new("fr");
        let record = labels(&[("en", "Saint-Etienne"), ("fr", "Saint-Étienne")]);
        assert!(engine.matches(&record, "saint"));
        assert!(engine.matches(&record, "ÉTIENNE"));
        assert!(!engine.matches(&record, "lyon"));
    }

    #[test]
    fn resolution_falls_back_to_english_labels() {
        let engine = FilterEngine::new("fr");
        let record = labels(&[("en", "Loire Valley")]);
        assert!(engine.matches(&record, "loire"));
    }

    #[test]
    fn empty_and_whitespace_queries_match_everything() {
        let engine = FilterEngine::new("en");
        let record = labels(&[("en", "anything")]);
        assert!(engine.matches(&record, ""));
        assert!(engine.matches(&record, "  "));
        assert!(engine.matches(&LabelRecord::new(), ""));
    }

    #[test]
    fn unlabelled_records_never_match_a_query() {
        let engine = FilterEngine::new("en");
        assert!(!engine.matches(&LabelRecord::new(), "x"));
        let only_german = labels(&[("de", "München")]);
        assert!(only_german.resolve("en").is_none());
        assert!(!engine.matches(&only_german, "münchen"));
    }
}
