//! Session rename overlay.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::render_utils::{PopupChrome, PromptLine, draw_popup, draw_prompt_line};
use super::OverlayUpdate;
use crate::common::TaskKind;
use crate::effects::UiEffect;
use crate::state::TuiState;

#[derive(Debug)]
pub struct RenameState {
    /// New name being typed. Seeded with the current name.
    pub input: String,
    /// Session being renamed.
    pub session_id: String,
    /// Error shown under the input (rename already in flight).
    pub error: Option<String>,
}

impl RenameState {
    pub fn open(session_id: String) -> Self {
        Self {
            input: session_id.clone(),
            session_id,
            error: None,
        }
    }

    pub fn handle_key(&mut self, tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => OverlayUpdate::close(),
            KeyCode::Char('c') if ctrl => OverlayUpdate::close(),
            KeyCode::Enter => {
                let new_name = self.input.trim().to_string();
                // Empty or unchanged names close without contacting the server
                if new_name.is_empty() || new_name == self.session_id {
                    return OverlayUpdate::close();
                }
                if tui.tasks.is_running(TaskKind::SessionRename) {
                    self.error = Some("Rename already in progress".to_string());
                    return OverlayUpdate::stay();
                }
                OverlayUpdate::close().with_ui_effects(vec![UiEffect::RenameSession {
                    old_name: self.session_id.clone(),
                    new_name,
                }])
            }
            KeyCode::Char('u') if ctrl => {
                self.input.clear();
                self.error = None;
                OverlayUpdate::stay()
            }
            KeyCode::Backspace => {
                self.input.pop();
                self.error = None;
                OverlayUpdate::stay()
            }
            KeyCode::Char(c) if !ctrl => {
                self.input.push(c);
                self.error = None;
                OverlayUpdate::stay()
            }
            _ => OverlayUpdate::stay(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, input_y: u16) {
        let body = draw_popup(
            frame,
            area,
            input_y,
            &PopupChrome {
                title: "Rename session",
                accent: Color::Yellow,
                width: 60,
                height: 6,
                hints: &[("Enter", "rename"), ("Esc", "cancel")],
            },
        );

        let input_area = Rect::new(body.x, body.y, body.width, 1);
        draw_prompt_line(
            frame,
            input_area,
            &PromptLine {
                value: &self.input,
                placeholder: "New session name...",
                text_color: Color::White,
                accent: Color::Yellow,
            },
        );

        let info_area = Rect::new(body.x, body.y + 2, body.width, 1);
        let info = match &self.error {
            Some(err) => Line::from(Span::styled(
                err.clone(),
                Style::default().fg(Color::Red),
            )),
            None => Line::from(Span::styled(
                format!("Renaming \"{}\"", self.session_id),
                Style::default().fg(Color::DarkGray),
            )),
        };
        frame.render_widget(Paragraph::new(info), info_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlays::OverlayTransition;
    use confab_core::config::Config;
    use crossterm::event::KeyEvent;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn tui() -> TuiState {
        TuiState::new(Config::default(), false)
    }

    #[test]
    fn test_open_seeds_input_with_current_name() {
        let state = RenameState::open("会话_1".to_string());
        assert_eq!(state.input, "会话_1");
    }

    #[test]
    fn test_enter_with_unchanged_name_closes_silently() {
        let mut state = RenameState::open("alpha".to_string());
        let update = state.handle_key(&tui(), key(KeyCode::Enter));
        assert!(matches!(update.transition, OverlayTransition::Close));
        assert!(update.effects.is_empty());
    }

    #[test]
    fn test_enter_with_blank_name_closes_silently() {
        let mut state = RenameState::open("alpha".to_string());
        state.input = "   ".to_string();
        let update = state.handle_key(&tui(), key(KeyCode::Enter));
        assert!(matches!(update.transition, OverlayTransition::Close));
        assert!(update.effects.is_empty());
    }

    #[test]
    fn test_enter_with_new_name_emits_rename_effect() {
        let mut state = RenameState::open("alpha".to_string());
        state.input = "  beta  ".to_string();
        let update = state.handle_key(&tui(), key(KeyCode::Enter));
        assert!(matches!(update.transition, OverlayTransition::Close));
        assert!(matches!(
            update.effects.as_slice(),
            [UiEffect::RenameSession { old_name, new_name }]
                if old_name == "alpha" && new_name == "beta"
        ));
    }

    #[test]
    fn test_typing_clears_error() {
        let mut state = RenameState::open("alpha".to_string());
        state.error = Some("busy".to_string());
        state.handle_key(&tui(), key(KeyCode::Char('x')));
        assert!(state.error.is_none());
        assert_eq!(state.input, "alphax");
    }
}
