//! UI event types.
//!
//! This module defines the unified event enum for the TUI. All external
//! inputs (terminal, async HTTP results, timers) are converted to `UiEvent`
//! before being processed by the reducer.
//!
//! ## Inbox Pattern
//!
//! Async operations send events directly to the runtime's event inbox.
//! Results arrive as separate events.
//!
//! ## Task Lifecycle Events
//!
//! Async work uses a uniform lifecycle:
//! - The runtime emits `UiEvent::TaskStarted` once a task is actually spawned
//! - The runtime emits `UiEvent::TaskCompleted` with the result event when done
//! - The reducer is the only place that mutates `TaskState`

use crossterm::event::Event as CrosstermEvent;

use confab_core::wire::{LogEntry, PageState, StatusReply};

use crate::common::{TaskCompleted, TaskKind, TaskStarted};

/// Session operation results.
///
/// Results-only events for session I/O. Task gating flags are handled by
/// the `TaskStarted`/`TaskCompleted` lifecycle, not separate flags.
#[derive(Debug)]
pub enum SessionUiEvent {
    /// Page state fetched (startup, switch, create, continue).
    PageLoaded { page: PageState },

    /// Page fetch or navigation failed.
    PageLoadFailed { error: String },

    /// Rename round-trip finished. `entered` is the name the user typed;
    /// the reply may carry a server-assigned `new_session_id` that wins.
    RenameDone {
        old_name: String,
        entered: String,
        reply: StatusReply,
    },

    /// Rename transport failure.
    RenameFailed { error: String },

    /// Delete round-trip finished.
    DeleteDone {
        session_id: String,
        reply: StatusReply,
    },

    /// Delete transport failure.
    DeleteFailed { error: String },

    /// Save round-trip finished.
    SaveDone { reply: confab_core::wire::SaveReply },

    /// Save transport failure.
    SaveFailed { error: String },
}

/// Chat operation results.
#[derive(Debug)]
pub enum ChatUiEvent {
    /// Assistant reply arrived for the in-flight message.
    ReplyReceived { markdown: String },

    /// Send failed (transport or server error).
    SendFailed { error: String },

    /// Continue-from-history navigation failed.
    ContinueFailed { error: String },

    /// Probe timer fired; auto-fill and submit the canned message.
    ProbeFire,
}

/// Recursion log results.
#[derive(Debug)]
pub enum LogsUiEvent {
    /// Log batch fetched.
    Fetched { entries: Vec<LogEntry> },

    /// Log fetch or parse failed.
    FetchFailed { error: String },
}

/// Unified event enum for the TUI.
///
/// All inputs to the TUI are converted to this type before processing.
/// The reducer (`update`) pattern-matches on these events to update state.
#[derive(Debug)]
pub enum UiEvent {
    /// Timer tick (for animation, polling).
    Tick,

    /// Frame event for per-frame state updates (layout, delta coalescing).
    ///
    /// Emitted once per frame before other events are processed.
    /// Contains terminal dimensions for layout calculations.
    Frame { width: u16, height: u16 },

    /// Terminal input event (key, mouse, paste, focus, resize).
    Terminal(CrosstermEvent),

    /// Task lifecycle: runtime started a task.
    TaskStarted { kind: TaskKind, started: TaskStarted },

    /// Task lifecycle: runtime completed a task (wraps the result event).
    TaskCompleted {
        kind: TaskKind,
        completed: TaskCompleted<Box<UiEvent>>,
    },

    /// Session async I/O results.
    Session(SessionUiEvent),

    /// Chat async I/O results.
    Chat(ChatUiEvent),

    /// Recursion log async I/O results.
    Logs(LogsUiEvent),
}
