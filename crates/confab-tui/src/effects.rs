//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O and task spawning only (no direct UI mutations).
//!
//! This keeps the reducer pure: it only mutates state and returns effects,
//! never performs I/O or spawns tasks directly. The runtime assigns task
//! ids and reports lifecycle through `TaskStarted`/`TaskCompleted` events;
//! the reducer gates duplicates by consulting `tasks.is_running(kind)`
//! before emitting an effect.

use std::time::Duration;

use crate::common::TaskKind;

/// Effects returned by the reducer for the runtime to execute.
///
/// The reducer returns `Vec<UiEffect>` from each update call.
/// The runtime executes these effects after rendering.
#[derive(Debug)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Fetch the page state (GET `/`).
    LoadPage,

    /// Switch to a session, then re-fetch the page state.
    SwitchSession { session_id: String },

    /// Create a session from a temp id, then re-fetch the page state.
    CreateSession { temp_session_id: String },

    /// Rename a session.
    RenameSession {
        old_name: String,
        new_name: String,
    },

    /// Delete a session.
    DeleteSession { session_id: String },

    /// Save the current session.
    SaveSession,

    /// Send a chat message.
    SendMessage { message: String },

    /// Truncate history at an index and re-run, then re-fetch the page.
    ContinueFromHistory { history_index: usize },

    /// Fetch recursion logs, optionally after a delay.
    RefreshLogs { delay: Option<Duration> },

    /// Arm the probe timer (auto-submit a canned message after 1 s).
    ScheduleProbe,
}

impl UiEffect {
    /// Task slot this effect occupies while in flight, if any.
    pub fn task_kind(&self) -> Option<TaskKind> {
        match self {
            UiEffect::Quit | UiEffect::ScheduleProbe => None,
            UiEffect::LoadPage => Some(TaskKind::PageLoad),
            UiEffect::SwitchSession { .. } => Some(TaskKind::SessionSwitch),
            UiEffect::CreateSession { .. } => Some(TaskKind::SessionCreate),
            UiEffect::RenameSession { .. } => Some(TaskKind::SessionRename),
            UiEffect::DeleteSession { .. } => Some(TaskKind::SessionDelete),
            UiEffect::SaveSession => Some(TaskKind::SessionSave),
            UiEffect::SendMessage { .. } => Some(TaskKind::MessageSend),
            UiEffect::ContinueFromHistory { .. } => Some(TaskKind::HistoryContinue),
            UiEffect::RefreshLogs { .. } => Some(TaskKind::LogsRefresh),
        }
    }
}
