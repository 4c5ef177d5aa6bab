use std::cell::RefCell;
use std::collections::HashMap;

use unicode_width::UnicodeWidthStr;

use super::cell::CellId;
use super::style::{Style, StyledLine, StyledSpan};

/// Cache for wrapped lines to avoid re-computing on every frame.
///
/// Keyed by `(CellId, width, content_len)` where `content_len` invalidates
/// entries when a cell's content changes.
///
/// Uses interior mutability (`RefCell`) to allow caching during immutable
/// render passes.
#[derive(Debug, Default)]
pub struct WrapCache {
    cache: RefCell<HashMap<(CellId, usize, usize), Vec<StyledLine>>>,
}

impl WrapCache {
    pub fn new() -> Self {
        Self {
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Clears all cached entries.
    ///
    /// Call this on terminal resize to invalidate width-dependent caches.
    pub fn clear(&self) {
        self.cache.borrow_mut().clear();
    }

    pub(crate) fn get(
        &self,
        cell_id: CellId,
        width: usize,
        content_len: usize,
    ) -> Option<Vec<StyledLine>> {
        self.cache
            .borrow()
            .get(&(cell_id, width, content_len))
            .cloned()
    }

    pub(crate) fn insert(
        &self,
        cell_id: CellId,
        width: usize,
        content_len: usize,
        lines: Vec<StyledLine>,
    ) {
        self.cache
            .borrow_mut()
            .insert((cell_id, width, content_len), lines);
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }
}

/// Renders content with a prefix, handling line wrapping.
///
/// The prefix appears on the first line; subsequent wrapped lines
/// are indented to align with the content start (or repeat the prefix
/// if `repeat_prefix` is true).
pub(crate) fn render_prefixed_content(
    prefix: &str,
    content: &str,
    width: usize,
    prefix_style: Style,
    content_style: Style,
    repeat_prefix: bool,
) -> Vec<StyledLine> {
    let mut lines = Vec::new();
    let prefix_display_width = prefix.width();

    // Minimum usable width
    let min_width = prefix_display_width + 10;
    let effective_width = width.max(min_width);

    // Content width after prefix/indent
    let content_width = effective_width.saturating_sub(prefix_display_width);

    // Split content into paragraphs (preserve blank lines)
    for paragraph in content.split('\n') {
        if paragraph.is_empty() {
            let line_prefix = if repeat_prefix || lines.is_empty() {
                StyledSpan::new(prefix, prefix_style)
            } else {
                StyledSpan::new(" ".repeat(prefix_display_width), Style::Plain)
            };
            lines.push(StyledLine {
                spans: vec![line_prefix],
            });
            continue;
        }

        for wrapped_line in wrap_text(paragraph, content_width) {
            let mut spans = Vec::new();

            if repeat_prefix || lines.is_empty() {
                spans.push(StyledSpan::new(prefix, prefix_style));
            } else {
                // Indent continuation lines to the content start
                spans.push(StyledSpan::new(
                    " ".repeat(prefix_display_width),
                    Style::Plain,
                ));
            }

            spans.push(StyledSpan::new(wrapped_line, content_style));
            lines.push(StyledLine { spans });
        }
    }

    // Handle empty content
    if lines.is_empty() {
        lines.push(StyledLine {
            spans: vec![StyledSpan::new(prefix, prefix_style)],
        });
    }

    lines
}

/// Wraps text to fit within the given display width.
///
/// Uses unicode display width for proper handling of CJK characters,
/// emoji, and zero-width characters. Does not hyphenate.
pub(crate) fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width: usize = 0;

    for word in text.split_whitespace() {
        let word_width = word.width();

        if current_line.is_empty() {
            if word_width > width {
                // Word is too long, force break by character
                let mut broken = wrap_chars(word, width);
                if let Some(last) = broken.pop() {
                    lines.extend(broken);
                    current_width = last.width();
                    current_line = last;
                }
            } else {
                current_line = word.to_string();
                current_width = word_width;
            }
        } else if current_width + 1 + word_width <= width {
            // Word fits on current line (+ 1 for space)
            current_line.push(' ');
            current_line.push_str(word);
            current_width += 1 + word_width;
        } else {
            lines.push(std::mem::take(&mut current_line));
            if word_width > width {
                let mut broken = wrap_chars(word, width);
                if let Some(last) = broken.pop() {
                    lines.extend(broken);
                    current_width = last.width();
                    current_line = last;
                }
            } else {
                current_line = word.to_string();
                current_width = word_width;
            }
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Breaks a string into parts that fit within the given display width.
///
/// Used for hard wrapping (code blocks, long words) where whitespace
/// preservation and exact width matter more than word boundaries.
///
/// Note: callers should expand tabs to spaces first; `unicode_width`
/// reports tabs as zero columns while terminals render them wide.
pub(crate) fn wrap_chars(text: &str, width: usize) -> Vec<String> {
    use unicode_width::UnicodeWidthChar;

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut current_width: usize = 0;

    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);

        // Zero-width characters always stay with the current part
        if ch_width == 0 {
            current.push(ch);
            continue;
        }

        if current_width + ch_width > width && !current.is_empty() {
            parts.push(current);
            current = String::new();
            current_width = 0;
        }

        current.push(ch);
        current_width += ch_width;
    }

    if !current.is_empty() {
        parts.push(current);
    }

    if parts.is_empty() {
        parts.push(String::new());
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text_basic() {
        assert_eq!(wrap_text("hello world", 20), vec!["hello world"]);
    }

    #[test]
    fn test_wrap_text_split() {
        assert_eq!(wrap_text("hello world", 8), vec!["hello", "world"]);
    }

    #[test]
    fn test_wrap_text_long_word() {
        assert_eq!(
            wrap_text("supercalifragilistic", 10),
            vec!["supercalif", "ragilistic"]
        );
    }

    #[test]
    fn test_wrap_text_cjk_double_width() {
        // "你好世界" = 4 characters, 8 display columns
        let wrapped = wrap_text("你好世界", 6);
        assert_eq!(wrapped, vec!["你好世", "界"]);
    }

    #[test]
    fn test_wrap_text_mixed_ascii_cjk() {
        // "Hi你好" = 2 + 4 = 6 display columns
        let wrapped = wrap_text("Hi你好", 5);
        assert_eq!(wrapped, vec!["Hi你", "好"]);
    }

    #[test]
    fn test_wrap_chars_cjk() {
        let parts = wrap_chars("你好世界很长", 4);
        assert_eq!(parts, vec!["你好", "世界", "很长"]);
    }

    #[test]
    fn test_render_prefixed_content_first_line_prefix() {
        let lines = render_prefixed_content(
            "│ ",
            "one two three four five",
            12,
            Style::UserPrefix,
            Style::User,
            false,
        );
        assert!(lines.len() > 1);
        assert_eq!(lines[0].spans[0].text, "│ ");
        assert_eq!(lines[0].spans[0].style, Style::UserPrefix);
        // Continuation lines are indented, not prefixed
        assert_eq!(lines[1].spans[0].text, "  ");
        assert_eq!(lines[1].spans[0].style, Style::Plain);
    }

    #[test]
    fn test_render_prefixed_content_repeat_prefix() {
        let lines = render_prefixed_content(
            "│ ",
            "alpha beta gamma delta",
            12,
            Style::UserPrefix,
            Style::User,
            true,
        );
        for line in &lines {
            assert_eq!(line.spans[0].text, "│ ");
        }
    }

    #[test]
    fn test_wrap_cache_roundtrip() {
        let cache = WrapCache::new();
        let id = CellId(7);
        let lines = vec![StyledLine::empty()];
        cache.insert(id, 80, 5, lines.clone());
        assert_eq!(cache.get(id, 80, 5), Some(lines));
        // Different width misses
        assert_eq!(cache.get(id, 60, 5), None);
        cache.clear();
        assert!(cache.is_empty());
    }
}
