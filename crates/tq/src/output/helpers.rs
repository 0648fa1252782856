//! Common helper functions for output formatting.

/// Truncates a string to at most `max_chars` characters, ending in `...`.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        s.to_string()
    }
}
