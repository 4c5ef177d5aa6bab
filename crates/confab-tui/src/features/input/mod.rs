//! Input feature slice.

pub mod render;
pub mod state;

pub use render::{INPUT_HEIGHT, render_input};
pub use state::InputState;
