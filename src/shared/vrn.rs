//! Vehicle registration number handling.

/// Canonical form used for display, storage and registry calls:
/// all whitespace removed, upper-cased.
pub fn normalize_vrn(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Key used to match a VRN across sources. Registries disagree on leading
/// zeros ("0AB12" vs "AB12"), so they are stripped here.
pub fn matching_key(raw: &str) -> String {
    let normalized = normalize_vrn(raw);
    let trimmed = normalized.trim_start_matches('0');
    if trimmed.is_empty() {
        normalized
    } else {
        trimmed.to_string()
    }
}

/// Normalise, drop empties and dedupe by matching key, keeping the first
/// spelling seen.
pub fn normalize_all<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    raw.into_iter()
        .map(|v| normalize_vrn(v.as_ref()))
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(matching_key(v)))
        .collect()
}
