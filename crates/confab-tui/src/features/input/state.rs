//! Input feature state.
//!
//! A single-line draft buffer with a grapheme-aware cursor. Multi-line
//! editing is not needed; messages are submitted with Enter.

use unicode_segmentation::UnicodeSegmentation;

/// State of the message input box.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Draft text.
    text: String,
    /// Cursor position in grapheme clusters from the start.
    cursor: usize,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position in grapheme clusters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns true if the draft is empty or whitespace-only.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Clears the draft and resets the cursor.
    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Replaces the draft, placing the cursor at the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.grapheme_count();
    }

    /// Inserts a character at the cursor.
    pub fn insert_char(&mut self, ch: char) {
        let byte_idx = self.byte_index(self.cursor);
        self.text.insert(byte_idx, ch);
        self.cursor += 1;
    }

    /// Inserts a string at the cursor (bracketed paste).
    pub fn insert_str(&mut self, s: &str) {
        let byte_idx = self.byte_index(self.cursor);
        self.text.insert_str(byte_idx, s);
        self.cursor += s.graphemes(true).count();
    }

    /// Deletes the grapheme before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let start = self.byte_index(self.cursor - 1);
        let end = self.byte_index(self.cursor);
        self.text.replace_range(start..end, "");
        self.cursor -= 1;
    }

    /// Deletes the grapheme at the cursor.
    pub fn delete(&mut self) {
        if self.cursor >= self.grapheme_count() {
            return;
        }
        let start = self.byte_index(self.cursor);
        let end = self.byte_index(self.cursor + 1);
        self.text.replace_range(start..end, "");
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.grapheme_count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.grapheme_count();
    }

    fn grapheme_count(&self) -> usize {
        self.text.graphemes(true).count()
    }

    /// Byte offset for the given grapheme index.
    fn byte_index(&self, grapheme_idx: usize) -> usize {
        self.text
            .grapheme_indices(true)
            .nth(grapheme_idx)
            .map_or(self.text.len(), |(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_backspace() {
        let mut input = InputState::new();
        input.insert_char('h');
        input.insert_char('i');
        assert_eq!(input.text(), "hi");
        assert_eq!(input.cursor(), 2);

        input.backspace();
        assert_eq!(input.text(), "h");
        assert_eq!(input.cursor(), 1);
    }

    #[test]
    fn test_insert_mid_text() {
        let mut input = InputState::new();
        input.set_text("ac");
        input.move_left();
        input.insert_char('b');
        assert_eq!(input.text(), "abc");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn test_cjk_cursor_movement() {
        let mut input = InputState::new();
        input.set_text("你好");
        assert_eq!(input.cursor(), 2);

        input.backspace();
        assert_eq!(input.text(), "你");

        input.move_home();
        input.insert_char('说');
        assert_eq!(input.text(), "说你");
    }

    #[test]
    fn test_delete_at_cursor() {
        let mut input = InputState::new();
        input.set_text("abc");
        input.move_home();
        input.delete();
        assert_eq!(input.text(), "bc");
        // Delete at end is a no-op
        input.move_end();
        input.delete();
        assert_eq!(input.text(), "bc");
    }

    #[test]
    fn test_is_blank() {
        let mut input = InputState::new();
        assert!(input.is_blank());
        input.set_text("   ");
        assert!(input.is_blank());
        assert!(!input.is_empty());
        input.set_text("hi");
        assert!(!input.is_blank());
    }

    #[test]
    fn test_insert_str_paste() {
        let mut input = InputState::new();
        input.set_text("ab");
        input.move_left();
        input.insert_str("XY");
        assert_eq!(input.text(), "aXYb");
        assert_eq!(input.cursor(), 3);
    }
}
