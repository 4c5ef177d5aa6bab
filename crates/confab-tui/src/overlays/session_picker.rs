//! Session picker overlay.
//!
//! Lists the server's sessions with a filter line. From here sessions can
//! be switched (Enter), renamed (`r`/`F2`), deleted (`d`/`Delete`), or a
//! new one created (`n`).

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::render_utils::{PopupChrome, PromptLine, draw_popup, draw_prompt_line, draw_separator};
use super::{OverlayRequest, OverlayUpdate};
use crate::common::{TaskKind, truncate_with_ellipsis};
use crate::effects::UiEffect;
use crate::features::sessions::mint_temp_session_id;
use crate::state::TuiState;

/// Maximum rows visible in the picker list.
pub const MAX_VISIBLE_SESSIONS: usize = 10;

#[derive(Debug)]
pub struct SessionPickerState {
    /// Snapshot of the session list at open time.
    pub sessions: Vec<String>,
    /// Name of the active session (highlighted).
    pub current: String,
    /// Selected row in the filtered list.
    pub selected: usize,
    /// Scroll offset into the filtered list.
    pub offset: usize,
    /// Search filter text.
    pub filter: String,
}

impl SessionPickerState {
    pub fn open(sessions: Vec<String>, current: String) -> (Self, Vec<UiEffect>) {
        // Preselect the active session
        let selected = sessions.iter().position(|s| *s == current).unwrap_or(0);
        let mut state = Self {
            sessions,
            current,
            selected,
            offset: 0,
            filter: String::new(),
        };
        state.scroll_to_selection();
        (state, vec![])
    }

    pub fn handle_key(&mut self, tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc | KeyCode::Char('c') if key.code == KeyCode::Esc || ctrl => {
                OverlayUpdate::close()
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if self.selected > 0 {
                    self.selected -= 1;
                    if self.selected < self.offset {
                        self.offset = self.selected;
                    }
                }
                OverlayUpdate::stay()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let total = self.visible_sessions().len();
                if self.selected + 1 < total {
                    self.selected += 1;
                    if self.selected >= self.offset + MAX_VISIBLE_SESSIONS {
                        self.offset = self.selected - MAX_VISIBLE_SESSIONS + 1;
                    }
                }
                OverlayUpdate::stay()
            }
            KeyCode::Enter => {
                let Some(session_id) = self.selected_session() else {
                    return OverlayUpdate::close();
                };
                if tui.tasks.is_running(TaskKind::SessionSwitch) {
                    return OverlayUpdate::stay();
                }
                OverlayUpdate::close().with_ui_effects(vec![UiEffect::SwitchSession {
                    session_id: session_id.to_string(),
                }])
            }
            KeyCode::Char('r') | KeyCode::F(2) => match self.selected_session() {
                Some(session_id) => OverlayUpdate::open(OverlayRequest::Rename {
                    session_id: session_id.to_string(),
                }),
                None => OverlayUpdate::stay(),
            },
            KeyCode::Char('d') | KeyCode::Delete => match self.selected_session() {
                Some(session_id) => OverlayUpdate::open(OverlayRequest::ConfirmDelete {
                    session_id: session_id.to_string(),
                }),
                None => OverlayUpdate::stay(),
            },
            KeyCode::Char('n') => {
                if tui.tasks.is_running(TaskKind::SessionCreate) {
                    return OverlayUpdate::stay();
                }
                OverlayUpdate::close().with_ui_effects(vec![UiEffect::CreateSession {
                    temp_session_id: mint_temp_session_id(),
                }])
            }
            // Ctrl+U: clear the filter
            KeyCode::Char('u') if ctrl => {
                self.filter.clear();
                self.clamp_selection();
                OverlayUpdate::stay()
            }
            KeyCode::Backspace => {
                self.filter.pop();
                self.clamp_selection();
                OverlayUpdate::stay()
            }
            KeyCode::Char(c) if !ctrl => {
                self.filter.push(c);
                self.clamp_selection();
                OverlayUpdate::stay()
            }
            _ => OverlayUpdate::stay(),
        }
    }

    /// Sessions matching the current filter (case-insensitive substring).
    pub fn visible_sessions(&self) -> Vec<&str> {
        if self.filter.is_empty() {
            return self.sessions.iter().map(String::as_str).collect();
        }
        let needle = self.filter.to_lowercase();
        self.sessions
            .iter()
            .filter(|s| s.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }

    pub fn selected_session(&self) -> Option<&str> {
        self.visible_sessions().get(self.selected).copied()
    }

    fn clamp_selection(&mut self) {
        let count = self.visible_sessions().len();
        if count == 0 {
            self.selected = 0;
            self.offset = 0;
        } else if self.selected >= count {
            self.selected = count - 1;
            self.scroll_to_selection();
        }
    }

    fn scroll_to_selection(&mut self) {
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + MAX_VISIBLE_SESSIONS {
            self.offset = self.selected - MAX_VISIBLE_SESSIONS + 1;
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, input_y: u16) {
        let visible = self.visible_sessions();
        let list_height = visible.len().clamp(1, MAX_VISIBLE_SESSIONS) as u16;
        // borders + filter line + separator + list + hints
        let overlay_height = list_height + 5;

        let body = draw_popup(
            frame,
            area,
            input_y,
            &PopupChrome {
                title: "Sessions",
                accent: Color::Cyan,
                width: 60,
                height: overlay_height,
                hints: &[
                    ("Enter", "switch"),
                    ("r", "rename"),
                    ("d", "delete"),
                    ("n", "new"),
                    ("Esc", "close"),
                ],
            },
        );

        let filter_area = Rect::new(body.x, body.y, body.width, 1);
        draw_prompt_line(
            frame,
            filter_area,
            &PromptLine {
                value: &self.filter,
                placeholder: "Type to filter...",
                text_color: Color::Cyan,
                accent: Color::Cyan,
            },
        );
        draw_separator(frame, body, 1);

        let list_top = body.y + 2;
        let row_width = body.width.saturating_sub(2) as usize;

        if visible.is_empty() {
            let empty = Paragraph::new(Line::from(Span::styled(
                "No matching sessions",
                Style::default().fg(Color::DarkGray),
            )));
            frame.render_widget(empty, Rect::new(body.x, list_top, body.width, 1));
            return;
        }

        for (row, (idx, name)) in visible
            .iter()
            .enumerate()
            .skip(self.offset)
            .take(MAX_VISIBLE_SESSIONS)
            .enumerate()
        {
            let is_selected = idx == self.selected;
            let is_current = *name == self.current;

            let marker = if is_selected { "▸ " } else { "  " };
            let mut style = if is_current {
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            if is_selected {
                style = style.add_modifier(Modifier::REVERSED);
            }

            let label = truncate_with_ellipsis(name, row_width);
            let line = Line::from(vec![
                Span::styled(marker, Style::default().fg(Color::Cyan)),
                Span::styled(label, style),
            ]);
            let row_area = Rect::new(body.x, list_top + row as u16, body.width, 1);
            frame.render_widget(Paragraph::new(line), row_area);
        }
    }
}
