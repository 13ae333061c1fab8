use super::domain::ViolationEntry;

/// Normalizes free text for substring matching: zero-width characters are dropped,
/// whitespace runs collapse to one space, and the result is trimmed and lower-cased.
pub fn normalize_text(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}

/// Counts violations whose normalized description contains `phrase`.
///
/// A blank phrase matches nothing.
pub fn count_matching_violations(violations: &[ViolationEntry], phrase: &str) -> usize {
    let needle = normalize_text(phrase);
    if needle.is_empty() {
        return 0;
    }

    violations
        .iter()
        .filter(|violation| normalize_text(&violation.description).contains(&needle))
        .count()
}
