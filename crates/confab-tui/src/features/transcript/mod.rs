//! Transcript feature slice: cells, scroll state, markdown, and rendering.

pub mod cell;
pub mod markdown;
pub mod render;
pub mod state;
pub mod style;
pub mod wrap;

pub use cell::{CellId, HistoryCell};
pub use render::{SPINNER_SPEED_DIVISOR, calculate_cell_line_counts, render_transcript};
pub use state::{ScrollMode, ScrollState, TranscriptState, VisibleRange};
pub use style::{Style, StyledLine, StyledSpan};
pub use wrap::WrapCache;
