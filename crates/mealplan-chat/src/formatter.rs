//! Display cleanup for backend text.

/// Remove `**` emphasis delimiters from backend text.
///
/// `None` and empty input give an empty string. Runs of asterisks shrink to
/// at most one, so applying this twice changes nothing.
pub fn strip_markup(text: Option<&str>) -> String {
    match text {
        Some(t) if !t.is_empty() => t.replace("**", ""),
        _ => String::new(),
    }
}
