//! Recursion log panel feature slice.

pub mod render;
pub mod state;

pub use render::render_logs_panel;
pub use state::{LogFetch, LogsState};
