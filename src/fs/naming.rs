//! Filename sanitization helpers.
//!
//! Post descriptions and account marks come straight from user-generated
//! content, so everything that ends up in a path component goes through here.

/// Remove characters that are illegal in file names and trim the result.
///
/// Falls back to `default` when nothing printable survives.
pub fn sanitize_name(name: &str, default: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => ' ',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect();

    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Collapse runs of whitespace into single spaces.
pub fn collapse_spaces(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate a string to at most `max` characters (not bytes).
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
