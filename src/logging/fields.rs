//! Field helpers for structured logging

/// Truncate to at most `max_chars` characters, appending `...` when cut.
///
/// Counts characters rather than bytes so multi-byte text never splits.
///
/// # Examples
///
/// ```
/// use dispatcher::logging::truncate_chars;
///
/// assert_eq!(truncate_chars("hello world", 5), "hello...");
/// assert_eq!(truncate_chars("héllo", 10), "héllo");
/// ```
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

/// Single-line preview of a task or prompt for log fields.
pub fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(&flat, 80)
}
