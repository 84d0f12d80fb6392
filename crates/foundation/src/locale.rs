//! Display-language resolution from browser locale preferences.

/// Language used when no preference matches and as the label fallback.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Primary subtag of a BCP 47 style tag, lowercased: `"fr-FR"` -> `"fr"`.
/// Underscores are tolerated because some platforms report POSIX locales.
pub fn primary_subtag(tag: &str) -> String {
    tag.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Picks the display language: the first preference whose primary subtag is
/// supported wins, otherwise [`DEFAULT_LANGUAGE`]. Region variants match on
/// the primary subtag only, so `"fr-CA"` selects `"fr"`.
pub fn resolve_language<I, S>(preferences: I, supported: &[&str]) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for preference in preferences {
        let primary = primary_subtag(preference.as_ref());
        if primary.is_empty() {
            continue;
        }
        if supported.iter().any(|s| s.eq_ignore_ascii_case(&primary)) {
            return primary;
        }
    }
    DEFAULT_LANGUAGE.to_string()
}
