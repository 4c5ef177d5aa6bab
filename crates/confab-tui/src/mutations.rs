//! Cross-slice state mutations.
//!
//! Feature reducers and overlays return these mutations to request changes
//! outside their own slice. The main reducer applies them in order.

use confab_core::wire::LogEntry;

use crate::features::transcript::HistoryCell;

/// Mutations for cross-slice state changes.
#[derive(Debug)]
pub enum StateMutation {
    Transcript(TranscriptMutation),
    Input(InputMutation),
    Sessions(SessionsMutation),
    Logs(LogsMutation),
}

/// Transcript slice mutations requested by other slices.
#[derive(Debug)]
pub enum TranscriptMutation {
    AppendCell(HistoryCell),
    AppendSystemMessage(String),
    RemovePending,
    Clear,
    ReplaceCells(Vec<HistoryCell>),
    ResetScroll,
    ClearWrapCache,
    ScrollToTop,
    ScrollToBottom,
    PageUp,
    PageDown,
}

/// Input slice mutations requested by other slices.
#[derive(Debug)]
pub enum InputMutation {
    Clear,
    SetText(String),
}

/// Session slice mutations requested by other slices.
#[derive(Debug)]
pub enum SessionsMutation {
    Replace {
        sessions: Vec<String>,
        current: String,
    },
    PatchRenamed {
        old_name: String,
        new_name: String,
    },
    Remove {
        session_id: String,
    },
    SetCurrent {
        session_id: String,
    },
}

/// Log panel mutations requested by other slices.
#[derive(Debug)]
pub enum LogsMutation {
    Replace(Vec<LogEntry>),
    Clear,
    SetError(String),
    ToggleVisible,
}
