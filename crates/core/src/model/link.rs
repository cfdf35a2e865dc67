/// Normalizes a user-supplied problem link.
///
/// Trims surrounding whitespace and prefixes `https://` when the link is
/// non-empty and does not already start with `http`. The store never calls
/// this; callers apply it before `add_question`.
#[must_use]
pub fn normalize_link(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with("http") {
        trimmed.to_owned()
    } else {
        format!("https://{trimmed}")
    }
}
