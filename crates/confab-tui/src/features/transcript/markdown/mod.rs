//! Markdown rendering for assistant replies.
//!
//! pulldown-cmark events are folded into UI-agnostic `StyledLine`s, wrapped
//! at the current transcript width. HTML events are never interpreted.

mod parse;
mod wrap;

pub use parse::render_markdown;
pub use wrap::{WrapOptions, wrap_styled_spans};
