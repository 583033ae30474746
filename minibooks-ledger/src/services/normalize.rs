//! GL account name canonicalization for fuzzy matching.

/// Normalize a free-text GL account name for lookup against the chart of
/// accounts. Lowercases, maps `&`, `/`, `-`, `_` to spaces, strips any other
/// non-alphanumeric characters, and collapses whitespace.
pub fn normalize(name: &str) -> String {
    let mapped: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '&' | '/' | '-' | '_' => ' ',
            other => other,
        })
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}
