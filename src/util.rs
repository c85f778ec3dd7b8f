// src/util.rs — Shared utility functions

/// Shorten a string to at most `max_chars` characters, appending "..."
/// when anything was cut. Operates on character boundaries, so multibyte
/// input never panics.
pub fn ellipsize(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        None => s.to_string(),
        Some((byte_idx, _)) => format!("{}...", &s[..byte_idx]),
    }
}

/// Leading-N-words key used for near-duplicate question matching.
/// Lowercased and whitespace-normalized.
pub fn leading_words(s: &str, n: usize) -> String {
    s.to_lowercase()
        .split_whitespace()
        .take(n)
        .collect::<Vec<_>>()
        .join(" ")
}
