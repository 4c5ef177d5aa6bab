//! Application state composition.
//!
//! This module defines the top-level state hierarchy for the TUI:
//! - `AppState` - combined state (`TuiState` + overlay)
//! - `TuiState` - non-overlay UI state (input, transcript, sessions, logs)
//!
//! ## State Hierarchy
//!
//! ```text
//! AppState
//! ├── tui: TuiState
//! │   ├── input: InputState           (message draft)
//! │   ├── transcript: TranscriptState (cells, scroll, layout)
//! │   ├── sessions: SessionsState     (session list, current)
//! │   ├── logs: LogsState             (recursion log panel)
//! │   └── tasks: Tasks                (task lifecycle state)
//! └── overlay: Option<Overlay>        (modal overlays)
//! ```
//!
//! ## Split State Architecture
//!
//! State is split between `TuiState` (non-overlay) and `Option<Overlay>`:
//! overlay handlers get `&mut self` and `&mut TuiState` simultaneously
//! without borrow conflicts.

use confab_core::config::Config;
use confab_core::wire::{HistoryTurn, PageState, Role};

use crate::common::Tasks;
use crate::features::input::InputState;
use crate::features::logs::LogsState;
use crate::features::sessions::SessionsState;
use crate::features::transcript::{HistoryCell, TranscriptState};
use crate::overlays::Overlay;

/// Message auto-submitted by `--probe` (the browser test hook's text).
pub const PROBE_MESSAGE: &str = "测试会话响应";

/// Combined application state for the TUI.
///
/// Combines `TuiState` with `Option<Overlay>` to enable the split state
/// architecture.
pub struct AppState {
    pub tui: TuiState,
    pub overlay: Option<Overlay>,
}

impl AppState {
    pub fn new(config: Config, probe: bool) -> Self {
        Self {
            tui: TuiState::new(config, probe),
            overlay: None,
        }
    }
}

/// TUI application state (non-overlay).
pub struct TuiState {
    /// Flag indicating the app should quit.
    pub should_quit: bool,
    /// Message draft input.
    pub input: InputState,
    /// Transcript display state (cells, scroll, layout, cache).
    pub transcript: TranscriptState,
    /// Session list and current session.
    pub sessions: SessionsState,
    /// Recursion log panel state.
    pub logs: LogsState,
    /// Task lifecycle state for async operations.
    pub tasks: Tasks,
    /// Client configuration.
    pub config: Config,
    /// Spinner animation frame counter.
    pub spinner_frame: usize,
    /// Whether the probe timer should be armed at startup.
    pub probe: bool,
}

impl TuiState {
    pub fn new(config: Config, probe: bool) -> Self {
        Self {
            should_quit: false,
            input: InputState::new(),
            transcript: TranscriptState::new(),
            sessions: SessionsState::default(),
            logs: LogsState::default(),
            tasks: Tasks::default(),
            config,
            spinner_frame: 0,
            probe,
        }
    }

    /// Applies a freshly fetched page wholesale: session list, transcript,
    /// and log panel are all replaced; the transcript starts at the bottom.
    pub fn apply_page(&mut self, page: PageState) {
        self.sessions
            .replace(page.sessions, page.current_session);

        self.transcript.reset();
        for cell in build_transcript_from_history(&page.history) {
            self.transcript.push_cell(cell);
        }
        self.transcript.scroll_to_bottom();

        self.logs.clear();
        if !page.recursion_logs.is_empty() {
            self.logs.apply_fetch(page.recursion_logs);
        }
    }
}

/// Builds transcript cells from saved history turns.
///
/// User turns render literally; assistant turns render as markdown and
/// record their position in the history array for continue-from-here.
/// Unknown roles become system cells.
pub fn build_transcript_from_history(history: &[HistoryTurn]) -> Vec<HistoryCell> {
    history
        .iter()
        .enumerate()
        .map(|(index, turn)| match turn.role {
            Role::User => HistoryCell::user(&turn.text),
            Role::Assistant => HistoryCell::assistant_at(&turn.text, index),
            Role::System => HistoryCell::system(&turn.text),
        })
        .collect()
}
