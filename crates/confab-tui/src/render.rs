//! Top-level frame rendering.
//!
//! Layout:
//!
//! ```text
//! ┌────────────────────────────┬──────────────┐
//! │ transcript                 │ recursion    │
//! │                            │ log panel    │
//! │                            │ (optional)   │
//! ├────────────────────────────┤              │
//! │ input box                  │              │
//! ├────────────────────────────┤              │
//! │ status line                │              │
//! └────────────────────────────┴──────────────┘
//! ```

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::common::Scrollbar;
pub use crate::features::transcript::calculate_cell_line_counts;
use crate::features::input::{INPUT_HEIGHT, render_input};
use crate::features::logs::render_logs_panel;
use crate::features::transcript::{SPINNER_SPEED_DIVISOR, render_transcript};
use crate::overlays::OverlayExt;
use crate::state::AppState;

/// Left margin plus scrollbar column.
pub const TRANSCRIPT_HORIZONTAL_OVERHEAD: usize = 2;

/// Status line height.
const STATUS_HEIGHT: u16 = 1;

/// Share of the terminal given to the log panel when visible.
const LOGS_PANEL_PERCENT: u16 = 40;

/// Spinner frames shown in the status line while a task runs.
const STATUS_SPINNER: &[&str] = &["◐", "◓", "◑", "◒"];

/// Viewport height available for the transcript at a terminal height.
pub fn calculate_transcript_height(terminal_height: u16) -> usize {
    terminal_height.saturating_sub(INPUT_HEIGHT + STATUS_HEIGHT) as usize
}

/// Width of the transcript column, before the horizontal overhead.
pub fn transcript_area_width(terminal_width: u16, logs_visible: bool) -> usize {
    if logs_visible {
        (terminal_width as usize * (100 - LOGS_PANEL_PERCENT as usize)) / 100
    } else {
        terminal_width as usize
    }
}

/// Renders a complete frame.
pub fn render(frame: &mut Frame, app: &AppState) {
    let area = frame.area();

    let (main_area, logs_area) = if app.tui.logs.visible {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(100 - LOGS_PANEL_PERCENT),
                Constraint::Percentage(LOGS_PANEL_PERCENT),
            ])
            .split(area);
        (columns[0], Some(columns[1]))
    } else {
        (area, None)
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(main_area);

    render_transcript_area(frame, rows[0], app);
    render_input(frame, rows[1], &app.tui.input, &app.tui.sessions.current);
    render_status_line(frame, rows[2], app);

    if let Some(logs_area) = logs_area {
        render_logs_panel(frame, logs_area, &app.tui.logs);
    }

    // Overlays draw above everything, centered over the transcript
    app.overlay.render(frame, area, rows[1].y);
}

fn render_transcript_area(frame: &mut Frame, area: Rect, app: &AppState) {
    let transcript = &app.tui.transcript;
    let viewport_height = area.height as usize;
    let content_width = (area.width as usize).saturating_sub(TRANSCRIPT_HORIZONTAL_OVERHEAD);

    let (rendered, is_lazy) =
        render_transcript(transcript, content_width, app.tui.spinner_frame);

    let scroll_offset = transcript.scroll.get_offset(viewport_height);
    let mut lines: Vec<Line<'static>> = if is_lazy {
        rendered.into_iter().take(viewport_height).collect()
    } else {
        rendered
            .into_iter()
            .skip(scroll_offset)
            .take(viewport_height)
            .collect()
    };

    // Bottom-align short transcripts
    if lines.len() < viewport_height {
        let padding = viewport_height - lines.len();
        let mut padded = vec![Line::default(); padding];
        padded.append(&mut lines);
        lines = padded;
    }

    let content_area = Rect::new(
        area.x + 1,
        area.y,
        area.width.saturating_sub(TRANSCRIPT_HORIZONTAL_OVERHEAD as u16),
        area.height,
    );
    frame.render_widget(Paragraph::new(lines), content_area);

    let scrollbar = Scrollbar::new(
        transcript.scroll.cached_line_count,
        viewport_height,
        scroll_offset,
    );
    frame.render_widget(scrollbar, area);
}

fn render_status_line(frame: &mut Frame, area: Rect, app: &AppState) {
    let tui = &app.tui;

    let indicator = if tui.tasks.is_any_running() {
        let frame_idx = tui.spinner_frame / SPINNER_SPEED_DIVISOR;
        Span::styled(
            STATUS_SPINNER[frame_idx % STATUS_SPINNER.len()],
            Style::default().fg(Color::Yellow),
        )
    } else {
        Span::styled("●", Style::default().fg(Color::Green))
    };

    let line = Line::from(vec![
        Span::raw(" "),
        indicator,
        Span::raw(" "),
        Span::styled(
            tui.sessions.current.clone(),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            "  Enter 发送 · c 重新生成 · Ctrl+P 会话 · Ctrl+S 保存 · Ctrl+L 日志 · Ctrl+C 退出",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_height_leaves_room_for_chrome() {
        assert_eq!(calculate_transcript_height(24), 20);
        assert_eq!(calculate_transcript_height(4), 0);
    }

    #[test]
    fn test_transcript_width_shrinks_with_log_panel() {
        assert_eq!(transcript_area_width(100, false), 100);
        assert_eq!(transcript_area_width(100, true), 60);
    }
}
