//! Shared plumbing: task lifecycle, scrollbar widget, text helpers.

pub mod scrollbar;
pub mod task;
pub mod text;

pub use scrollbar::Scrollbar;
pub use task::{TaskCompleted, TaskId, TaskKind, TaskSeq, TaskStarted, TaskState, Tasks};
pub use text::{truncate_start_with_ellipsis, truncate_with_ellipsis};
