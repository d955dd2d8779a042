//! Text helpers for rendering documents in a terminal or list cell.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::models::Document;

const ELLIPSIS: &str = "...";

/// Format a document's publish date as `January 15, 2024`.
///
/// Falls back to the raw value when it cannot be parsed, and to an empty
/// string when there is none.
pub fn format_publish_date(document: &Document) -> String {
    match document.published_at() {
        Some(ts) => ts.format("%B %-d, %Y").to_string(),
        None => document.publish_date.trim().to_string(),
    }
}

/// Truncate text to fit within the specified display width.
///
/// Wide characters count for their terminal width. An ellipsis is appended
/// when anything was cut.
///
/// # Examples
///
/// ```
/// use archive_assistant::utils::truncate_with_ellipsis;
///
/// assert_eq!(truncate_with_ellipsis("Hello World", 8), "Hello...");
/// assert_eq!(truncate_with_ellipsis("Hi", 8), "Hi");
/// ```
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if text.width() <= max_width {
        return text.to_string();
    }

    let budget = max_width.saturating_sub(ELLIPSIS.len());
    let mut used = 0;
    let cut = text
        .char_indices()
        .find_map(|(idx, c)| {
            used += c.width().unwrap_or(1);
            (used > budget).then_some(idx)
        })
        .unwrap_or(text.len());

    format!("{}{}", text[..cut].trim_end(), ELLIPSIS)
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_publish_date() {
        let mut doc = Document::new(1u64, "X");
        doc.publish_date = "2024-01-05T08:30:00Z".to_string();
        assert_eq!(format_publish_date(&doc), "January 5, 2024");

        doc.publish_date = "sometime".to_string();
        assert_eq!(format_publish_date(&doc), "sometime");

        doc.publish_date = String::new();
        assert_eq!(format_publish_date(&doc), "");
    }

    #[test]
    fn test_truncate_wide_chars() {
        assert_eq!(truncate_with_ellipsis("日本語のテキスト", 7), "日本...");
        assert_eq!(truncate_with_ellipsis("abc", 2), "...");
        assert_eq!(truncate_with_ellipsis("anything", 0), "");
        assert_eq!(truncate_with_ellipsis("Harbour Log entry", 11), "Harbour...");
    }

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("  two\n\nlines  here "), "two lines here");
    }
}
