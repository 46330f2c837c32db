//! Shared formatting helpers for slot texts.
//!
//! Percentage fields share one layout so a real value and the unknown
//! placeholder always occupy the same columns: `"CPU 42%"` / `"CPU ???"`.

/// Format a labelled percentage, `None` rendering as the placeholder.
///
/// Values above 100 are clamped so the field never grows past three digits.
pub fn format_percent(label: &str, value: Option<u64>) -> String {
    match value {
        Some(v) => format!("{}{:3}%", label, v.min(100)),
        None => format!("{} ???", label),
    }
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a char.
pub fn truncate_at_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Number of chars, the unit column alignment is measured in.
pub fn width(s: &str) -> usize {
    s.chars().count()
}
