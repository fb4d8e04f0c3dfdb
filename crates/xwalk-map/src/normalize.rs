//! Canonical form of task text used as the match key.

/// Normalizes free text for matching.
///
/// Lowercases with the Unicode default mapping, drops every character that
/// is neither alphanumeric nor whitespace, then collapses whitespace runs to
/// single spaces and trims. Idempotent.
pub fn normalize_text(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}
