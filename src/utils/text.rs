// src/utils/text.rs

//! Text helpers for notification bodies.

use unicode_segmentation::UnicodeSegmentation;

/// Cut `text` to at most `max_graphemes` user-perceived characters,
/// appending `marker` when anything was dropped.
pub fn truncate_with_marker(text: &str, max_graphemes: usize, marker: &str) -> String {
    match text.grapheme_indices(true).nth(max_graphemes) {
        Some((idx, _)) => format!("{}{marker}", &text[..idx]),
        None => text.to_string(),
    }
}

/// Join the first `limit` items with `", "`.
pub fn join_first(items: &[String], limit: usize) -> String {
    items
        .iter()
        .take(limit)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
