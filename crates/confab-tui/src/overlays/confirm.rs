//! Delete confirmation overlay.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::render_utils::{PopupChrome, draw_popup};
use super::{OverlayRequest, OverlayUpdate};
use crate::common::TaskKind;
use crate::effects::UiEffect;
use crate::state::TuiState;

#[derive(Debug)]
pub struct ConfirmDeleteState {
    /// Session the confirmation is about.
    pub session_id: String,
}

impl ConfirmDeleteState {
    pub fn open(session_id: String) -> Self {
        Self { session_id }
    }

    pub fn handle_key(&mut self, tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                if tui.tasks.is_running(TaskKind::SessionDelete) {
                    return OverlayUpdate::stay();
                }
                OverlayUpdate::close().with_ui_effects(vec![UiEffect::DeleteSession {
                    session_id: self.session_id.clone(),
                }])
            }
            // Cancelling returns to the picker
            KeyCode::Char('n') | KeyCode::Esc => {
                OverlayUpdate::open(OverlayRequest::SessionPicker)
            }
            KeyCode::Char('c') if ctrl => OverlayUpdate::close(),
            _ => OverlayUpdate::stay(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, input_y: u16) {
        let body = draw_popup(
            frame,
            area,
            input_y,
            &PopupChrome {
                title: "Delete session",
                accent: Color::Red,
                width: 50,
                height: 6,
                hints: &[("y", "delete"), ("n", "cancel")],
            },
        );

        let line = Line::from(vec![
            Span::styled("Delete ", Style::default().fg(Color::White)),
            Span::styled(
                format!("\"{}\"", self.session_id),
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("?", Style::default().fg(Color::White)),
        ]);
        let question = Rect::new(body.x, body.y + 1, body.width, 1);
        frame.render_widget(Paragraph::new(line), question);
    }
}
