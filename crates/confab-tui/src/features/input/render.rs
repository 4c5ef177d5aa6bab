//! Input feature view.
//!
//! Pure rendering for the message input box.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use super::state::InputState;

/// Height of the input area in lines, including borders.
pub const INPUT_HEIGHT: u16 = 3;

/// Prompt marker at the start of the input line.
const PROMPT: &str = "> ";

/// Cursor block character.
const CURSOR: &str = "█";

/// Renders the input box with the current session name as the title.
pub fn render_input(frame: &mut Frame, area: Rect, input: &InputState, session_name: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {session_name} "),
            Style::default().fg(Color::Cyan),
        ));

    let inner_width = area.width.saturating_sub(2) as usize;
    let line = build_input_line(input, inner_width);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

/// Builds the visible input line with a block cursor.
///
/// The text is windowed horizontally so the cursor always stays in view;
/// the window shifts by display width, not byte or char count.
fn build_input_line(input: &InputState, inner_width: usize) -> Line<'static> {
    let avail = inner_width.saturating_sub(PROMPT.width() + 1); // +1 cursor column
    let graphemes: Vec<&str> = input.text().graphemes(true).collect();
    let cursor = input.cursor().min(graphemes.len());

    // Window start: walk back from the cursor until the window is full
    let mut start = cursor;
    let mut used = 0usize;
    while start > 0 {
        let w = graphemes[start - 1].width();
        if used + w > avail {
            break;
        }
        used += w;
        start -= 1;
    }

    let before: String = graphemes[start..cursor].concat();
    let mut after = String::new();
    let mut after_width = 0usize;
    for g in &graphemes[cursor..] {
        let w = g.width();
        if used + after_width + w > avail {
            break;
        }
        after.push_str(g);
        after_width += w;
    }

    let text_style = Style::default().fg(Color::White);
    let mut spans = vec![
        Span::styled(PROMPT, Style::default().fg(Color::Green)),
        Span::styled(before, text_style),
        Span::styled(CURSOR, Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ];
    if !after.is_empty() {
        spans.push(Span::styled(after, text_style));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_input_line_shows_prompt_and_cursor() {
        let mut input = InputState::new();
        input.set_text("hello");
        let line = build_input_line(&input, 40);
        assert_eq!(line_text(&line), format!("> hello{CURSOR}"));
    }

    #[test]
    fn test_input_line_windows_long_text() {
        let mut input = InputState::new();
        input.set_text("abcdefghijklmnopqrstuvwxyz");
        let line = build_input_line(&input, 12);
        let text = line_text(&line);
        // Cursor visible at the end of the window
        assert!(text.ends_with(CURSOR));
        assert!(text.width() <= 12);
    }

    #[test]
    fn test_cursor_mid_text_splits_spans() {
        let mut input = InputState::new();
        input.set_text("abc");
        input.move_left();
        let line = build_input_line(&input, 40);
        assert_eq!(line_text(&line), format!("> ab{CURSOR}c"));
    }
}
