//! Transcript rendering functions.
//!
//! This module contains all transcript rendering logic:
//! - `render_transcript()` - main entry point
//! - `render_transcript_full()` - full rendering (all cells)
//! - `render_transcript_lazy()` - lazy rendering (visible cells only)
//! - Style conversion helpers
//! - Cell line count calculation

use confab_core::wire::LogSource;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use super::state::VisibleRange;
use super::style::{Style as TranscriptStyle, StyledLine};
use super::{CellId, TranscriptState};

/// Spinner speed divisor (render frames per spinner frame).
pub const SPINNER_SPEED_DIVISOR: usize = 6;

/// Renders the transcript into ratatui Lines.
///
/// Returns `(lines, is_lazy)` where `is_lazy` indicates if lazy rendering
/// was used. When lazy rendering is used, the lines are already scrolled
/// and ready to display.
pub fn render_transcript(
    transcript: &TranscriptState,
    width: usize,
    spinner_frame: usize,
) -> (Vec<Line<'static>>, bool) {
    // Lazy rendering once cell line info is available
    if let Some(visible) = transcript.scroll.visible_range(transcript.viewport_height) {
        return (
            render_transcript_lazy(transcript, width, spinner_frame, visible),
            true,
        );
    }

    // Full rendering (first frame or after changes)
    (render_transcript_full(transcript, width, spinner_frame), false)
}

/// Full transcript rendering - iterates all cells.
///
/// Used on the first frame or when `cell_line_info` needs to be rebuilt.
fn render_transcript_full(
    transcript: &TranscriptState,
    width: usize,
    spinner_frame: usize,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for cell in &transcript.cells {
        let styled_lines = cell.display_lines_cached(
            width,
            spinner_frame / SPINNER_SPEED_DIVISOR,
            &transcript.wrap_cache,
        );

        for styled_line in styled_lines {
            lines.push(convert_styled_line(styled_line));
        }

        // Blank line between cells
        lines.push(Line::default());
    }

    lines
}

/// Lazy transcript rendering - only renders visible cells.
///
/// Uses the pre-calculated visible range to skip off-screen cells.
/// Returns lines ready for display (already scrolled/sliced).
fn render_transcript_lazy(
    transcript: &TranscriptState,
    width: usize,
    spinner_frame: usize,
    visible: VisibleRange,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for (cell_idx, cell) in transcript.cells[visible.cell_range.clone()].iter().enumerate() {
        let styled_lines = cell.display_lines_cached(
            width,
            spinner_frame / SPINNER_SPEED_DIVISOR,
            &transcript.wrap_cache,
        );

        // For the first cell, skip lines that are above the viewport
        let skip_count = if cell_idx == 0 {
            visible.first_cell_line_offset
        } else {
            0
        };

        for styled_line in styled_lines.into_iter().skip(skip_count) {
            lines.push(convert_styled_line(styled_line));
        }

        // Blank line after each cell, matching the full render so line
        // counts stay consistent with cell_line_info
        lines.push(Line::default());
    }

    lines
}

/// Calculates cell line info for external application.
///
/// Returns `(CellId, line_count)` tuples suitable for
/// `ScrollState::update_cell_line_info`.
pub fn calculate_cell_line_counts(
    transcript: &TranscriptState,
    terminal_width: usize,
    spinner_frame: usize,
    horizontal_overhead: usize,
) -> Vec<(CellId, usize)> {
    let effective_width = terminal_width.saturating_sub(horizontal_overhead);

    transcript
        .cells
        .iter()
        .map(|cell| {
            let lines = cell.display_lines_cached(
                effective_width,
                spinner_frame / SPINNER_SPEED_DIVISOR,
                &transcript.wrap_cache,
            );
            // +1 for blank line between cells
            (cell.id(), lines.len() + 1)
        })
        .collect()
}

/// Converts a transcript StyledLine to a ratatui Line.
pub fn convert_styled_line(styled_line: StyledLine) -> Line<'static> {
    let spans: Vec<Span<'static>> = styled_line
        .spans
        .into_iter()
        .map(|s| Span::styled(s.text, convert_style(s.style)))
        .collect();
    Line::from(spans)
}

/// Converts a transcript Style to a ratatui Style.
pub fn convert_style(style: TranscriptStyle) -> Style {
    match style {
        TranscriptStyle::Plain => Style::default(),
        TranscriptStyle::UserPrefix => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
        TranscriptStyle::User => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::ITALIC),
        TranscriptStyle::Assistant => Style::default().fg(Color::White),
        TranscriptStyle::Pending => Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
        TranscriptStyle::SystemPrefix => Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
        TranscriptStyle::System => Style::default().fg(Color::DarkGray),

        // Recursion log panel styles
        TranscriptStyle::LogTimestamp => Style::default().fg(Color::DarkGray),
        TranscriptStyle::LogLevel => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        TranscriptStyle::LogFunction => Style::default().fg(Color::White),
        TranscriptStyle::LogLabel => Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM),
        TranscriptStyle::LogTool => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        TranscriptStyle::LogError => Style::default().fg(Color::Red),
        TranscriptStyle::LogSource(source) => log_source_style(source),

        // Markdown styles
        TranscriptStyle::CodeInline => Style::default().fg(Color::Cyan),
        TranscriptStyle::CodeBlock => Style::default().fg(Color::Cyan),
        TranscriptStyle::CodeFence => Style::default().fg(Color::DarkGray),
        TranscriptStyle::Emphasis => Style::default().add_modifier(Modifier::ITALIC),
        TranscriptStyle::Strong => Style::default().add_modifier(Modifier::BOLD),
        TranscriptStyle::H1 => Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        TranscriptStyle::H2 => Style::default().add_modifier(Modifier::BOLD),
        TranscriptStyle::H3 => Style::default()
            .add_modifier(Modifier::ITALIC)
            .fg(Color::White),
        TranscriptStyle::Link => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::UNDERLINED),
        TranscriptStyle::BlockQuote => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::ITALIC),
        TranscriptStyle::ListBullet => Style::default().fg(Color::Yellow),
        TranscriptStyle::ListNumber => Style::default().fg(Color::Yellow),
    }
}

/// Maps a log source category to its display color.
fn log_source_style(source: LogSource) -> Style {
    let color = match source {
        LogSource::Agent => Color::Green,
        LogSource::Tool => Color::Yellow,
        LogSource::Llm => Color::Magenta,
        LogSource::Database => Color::Blue,
        LogSource::User => Color::Cyan,
        LogSource::Assistant => Color::White,
        LogSource::Default => Color::DarkGray,
    };
    Style::default().fg(color)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::transcript::HistoryCell;

    fn transcript_with_cells(cells: Vec<HistoryCell>) -> TranscriptState {
        let mut state = TranscriptState::new();
        for cell in cells {
            state.push_cell(cell);
        }
        state
    }

    #[test]
    fn test_full_render_adds_blank_line_between_cells() {
        let state = transcript_with_cells(vec![
            HistoryCell::user("one"),
            HistoryCell::user("two"),
        ]);

        let (lines, is_lazy) = render_transcript(&state, 80, 0);
        assert!(!is_lazy);
        // Two single-line cells plus a blank line after each
        assert_eq!(lines.len(), 4);
        assert!(lines[1].spans.is_empty());
        assert!(lines[3].spans.is_empty());
    }

    #[test]
    fn test_lazy_render_used_once_line_info_known() {
        let mut state = transcript_with_cells(vec![HistoryCell::user("hello")]);
        let counts = calculate_cell_line_counts(&state, 80, 0, 0);
        state.scroll.update_cell_line_info(counts);

        let (_, is_lazy) = render_transcript(&state, 80, 0);
        assert!(is_lazy);
    }

    #[test]
    fn test_lazy_render_line_count_matches_cell_info() {
        let mut state = transcript_with_cells(vec![
            HistoryCell::user("alpha"),
            HistoryCell::assistant("beta\n\ngamma"),
        ]);
        let counts = calculate_cell_line_counts(&state, 80, 0, 0);
        let total: usize = counts.iter().map(|(_, n)| n).sum();
        state.scroll.update_cell_line_info(counts);

        let (lines, is_lazy) = render_transcript(&state, 80, 0);
        assert!(is_lazy);
        assert_eq!(lines.len(), total);
    }

    #[test]
    fn test_cell_line_counts_respect_overhead() {
        let state = transcript_with_cells(vec![HistoryCell::user(
            "a fairly long message that needs wrapping at narrow widths",
        )]);

        let wide = calculate_cell_line_counts(&state, 80, 0, 0);
        let narrow = calculate_cell_line_counts(&state, 80, 0, 50);
        assert!(narrow[0].1 > wide[0].1);
    }
}
