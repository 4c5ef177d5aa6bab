//! Text utilities shared across rendering paths.

use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Truncates a string with ellipsis if it exceeds max_width (unicode-aware).
///
/// Uses display width for accurate terminal column calculation, handling
/// wide characters (CJK, emoji) correctly.
pub fn truncate_with_ellipsis(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width <= 1 {
        return "…".to_string();
    }
    let mut truncated = String::new();
    for ch in text.chars() {
        let next_width = truncated.width() + ch.width().unwrap_or(0);
        if next_width + 1 > max_width {
            break;
        }
        truncated.push(ch);
    }
    truncated.push('…');
    truncated
}

/// Truncates from the start with a leading ellipsis (unicode-aware).
///
/// Keeps the tail of the string visible, which suits input lines where the
/// cursor sits at the end.
pub fn truncate_start_with_ellipsis(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width <= 1 {
        return "…".to_string();
    }
    let mut kept: Vec<char> = Vec::new();
    let mut kept_width = 0;
    for ch in text.chars().rev() {
        let ch_width = ch.width().unwrap_or(0);
        if kept_width + ch_width + 1 > max_width {
            break;
        }
        kept.push(ch);
        kept_width += ch_width;
    }
    let mut result = String::from("…");
    result.extend(kept.into_iter().rev());
    result
}

/// Sanitizes a line for display by removing ANSI escapes and expanding tabs.
///
/// Tabs render as variable-width jumps in a terminal while `unicode_width`
/// treats them as zero columns, which breaks wrapping math. A fixed 4-space
/// expansion keeps line-start tabs correct, with minor inaccuracy mid-line.
pub fn sanitize_for_display(s: &str) -> Cow<'_, str> {
    // Only allocate if we actually need to make changes
    if s.contains('\x1b') || s.contains('\t') {
        Cow::Owned(s.replace('\x1b', "").replace('\t', "    "))
    } else {
        Cow::Borrowed(s)
    }
}
