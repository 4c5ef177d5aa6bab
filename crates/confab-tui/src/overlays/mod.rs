//! Overlay modules for the TUI.
//!
//! Overlays are modal UI components that temporarily take over keyboard
//! input. Each overlay is self-contained: it owns its state, key handler,
//! and render function.
//!
//! ## Module Structure
//!
//! - `session_picker.rs`: Session list picker (Ctrl+P)
//! - `rename.rs`: Session rename overlay (`r`/`F2` in the picker)
//! - `confirm.rs`: Delete confirmation (`d`/`Delete` in the picker)
//! - `render_utils.rs`: Shared rendering utilities for overlays

pub mod confirm;
pub mod rename;
pub mod render_utils;
pub mod session_picker;

pub use confirm::ConfirmDeleteState;
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;
pub use rename::RenameState;
pub use session_picker::SessionPickerState;

use crate::effects::UiEffect;
use crate::mutations::StateMutation;
use crate::state::TuiState;

/// Requests to open a new overlay.
#[derive(Debug)]
pub enum OverlayRequest {
    SessionPicker,
    Rename { session_id: String },
    ConfirmDelete { session_id: String },
}

/// Transition returned by overlay key handlers.
#[derive(Debug)]
pub enum OverlayTransition {
    Stay,
    Close,
    Open(OverlayRequest),
}

/// Update returned by overlay key handlers.
#[derive(Debug)]
pub struct OverlayUpdate {
    pub transition: OverlayTransition,
    pub mutations: Vec<StateMutation>,
    pub effects: Vec<UiEffect>,
}

impl OverlayUpdate {
    fn new(transition: OverlayTransition) -> Self {
        Self {
            transition,
            mutations: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn stay() -> Self {
        Self::new(OverlayTransition::Stay)
    }

    pub fn close() -> Self {
        Self::new(OverlayTransition::Close)
    }

    pub fn open(request: OverlayRequest) -> Self {
        Self::new(OverlayTransition::Open(request))
    }

    #[must_use]
    pub fn with_mutations(mut self, mutations: Vec<StateMutation>) -> Self {
        self.mutations = mutations;
        self
    }

    #[must_use]
    pub fn with_ui_effects(mut self, effects: Vec<UiEffect>) -> Self {
        self.effects = effects;
        self
    }
}

#[derive(Debug)]
pub enum Overlay {
    SessionPicker(SessionPickerState),
    Rename(RenameState),
    ConfirmDelete(ConfirmDeleteState),
}

impl Overlay {
    pub fn render(&self, frame: &mut Frame, area: Rect, input_y: u16) {
        match self {
            Overlay::SessionPicker(p) => p.render(frame, area, input_y),
            Overlay::Rename(r) => r.render(frame, area, input_y),
            Overlay::ConfirmDelete(c) => c.render(frame, area, input_y),
        }
    }

    pub fn handle_key(&mut self, tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        match self {
            Overlay::SessionPicker(p) => p.handle_key(tui, key),
            Overlay::Rename(r) => r.handle_key(tui, key),
            Overlay::ConfirmDelete(c) => c.handle_key(tui, key),
        }
    }
}

/// Extension trait for `Option<Overlay>` providing convenience render helpers.
pub trait OverlayExt {
    /// Renders the overlay if one is active.
    fn render(&self, frame: &mut Frame, area: Rect, input_y: u16);
}

impl OverlayExt for Option<Overlay> {
    fn render(&self, frame: &mut Frame, area: Rect, input_y: u16) {
        if let Some(overlay) = self {
            overlay.render(frame, area, input_y);
        }
    }
}
