//! Shared overlay chrome.
//!
//! Every overlay is a bordered popup centered over the transcript, with an
//! optional hint row along the bottom border line. The helpers here draw
//! that chrome and hand the overlay its body rect; the overlays fill in the
//! rest.

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::common::truncate_start_with_ellipsis;

/// Chrome shared by all overlays. `accent` colors the border, title, and
/// hint keys; `hints` are `(key, action)` pairs.
pub struct PopupChrome<'a> {
    pub title: &'a str,
    pub accent: Color,
    pub width: u16,
    pub height: u16,
    pub hints: &'a [(&'a str, &'a str)],
}

/// Clears and draws the popup chrome, returning the body rect the overlay
/// may draw into. The body excludes the border and the hint row.
pub fn draw_popup(frame: &mut Frame, area: Rect, input_y: u16, chrome: &PopupChrome<'_>) -> Rect {
    let popup = popup_rect(area, input_y, chrome.width, chrome.height);

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(chrome.accent))
            .title(format!(" {} ", chrome.title))
            .title_style(
                Style::default()
                    .fg(chrome.accent)
                    .add_modifier(Modifier::BOLD),
            ),
        popup,
    );

    let inner = Rect::new(
        popup.x + 1,
        popup.y + 1,
        popup.width.saturating_sub(2),
        popup.height.saturating_sub(2),
    );

    if chrome.hints.is_empty() {
        return inner;
    }
    draw_hint_row(frame, inner, chrome.hints, chrome.accent);
    Rect::new(inner.x, inner.y, inner.width, inner.height.saturating_sub(1))
}

/// Centers the popup horizontally, and vertically within the space above
/// the input bar. Oversized requests are clamped to fit.
fn popup_rect(area: Rect, available_height: u16, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(available_height.saturating_sub(2));
    Rect::new(
        (area.width.saturating_sub(width)) / 2,
        (available_height.saturating_sub(height)) / 2,
        width,
        height,
    )
}

fn draw_hint_row(frame: &mut Frame, inner: Rect, hints: &[(&str, &str)], accent: Color) {
    let mut spans = Vec::with_capacity(hints.len() * 3);
    for (i, (key, action)) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" • ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled(*key, Style::default().fg(accent)));
        spans.push(Span::styled(
            format!(" {action}"),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let row = Rect::new(
        inner.x,
        inner.y + inner.height.saturating_sub(1),
        inner.width,
        1,
    );
    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        row,
    );
}

/// A one-line `> text█` prompt. Shows the dimmed placeholder while empty.
pub struct PromptLine<'a> {
    pub value: &'a str,
    pub placeholder: &'a str,
    pub text_color: Color,
    pub accent: Color,
}

pub fn draw_prompt_line(frame: &mut Frame, area: Rect, prompt: &PromptLine<'_>) {
    const MARKER: &str = "> ";
    let max_width = area.width.saturating_sub(MARKER.len() as u16 + 1) as usize;

    let mut spans = vec![Span::styled(MARKER, Style::default().fg(Color::DarkGray))];
    let cursor = Span::styled("█", Style::default().fg(prompt.accent));

    if prompt.value.is_empty() {
        // Cursor sits before the placeholder, where typing will land
        spans.push(cursor);
        spans.push(Span::styled(
            truncate_start_with_ellipsis(prompt.placeholder, max_width),
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::styled(
            truncate_start_with_ellipsis(prompt.value, max_width),
            Style::default().fg(prompt.text_color),
        ));
        spans.push(cursor);
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draws a full-width rule `row` lines below the top of `body`.
pub fn draw_separator(frame: &mut Frame, body: Rect, row: u16) {
    if row >= body.height {
        return;
    }
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "─".repeat(body.width as usize),
            Style::default().fg(Color::DarkGray),
        ))),
        Rect::new(body.x, body.y + row, body.width, 1),
    );
}
