use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use unicode_width::UnicodeWidthStr;

use super::markdown::render_markdown;
use super::style::{Style, StyledLine, StyledSpan};
use super::wrap::{WrapCache, render_prefixed_content, wrap_text};
use crate::common::text::sanitize_for_display;

/// Global counter for generating unique cell IDs.
static CELL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a transcript cell.
///
/// IDs are monotonically increasing and unique within a process.
/// Used for scroll position tracking and wrap cache keying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellId(pub u64);

impl CellId {
    /// Generates a new unique cell ID.
    pub fn new() -> Self {
        CellId(CELL_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for CellId {
    fn default() -> Self {
        Self::new()
    }
}

/// Spinner frames using circle characters for better terminal compatibility.
/// Braille dots (⠋⠙⠹) may not render correctly in all terminals/fonts.
pub(crate) const SPINNER_FRAMES: &[&str] = &["◐", "◓", "◑", "◒"];

/// A logical unit in the transcript.
///
/// Each cell represents a complete conceptual block: a user message, an
/// assistant reply, the pending-reply placeholder, or a system banner.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryCell {
    /// User input message. Rendered literally, never parsed as markup.
    User {
        id: CellId,
        created_at: DateTime<Utc>,
        content: String,
    },

    /// Assistant reply, rendered as markdown.
    ///
    /// `history_index` is the server-side history position recorded at
    /// append time; when absent, the position among message cells is used
    /// for continue-from-here.
    Assistant {
        id: CellId,
        created_at: DateTime<Utc>,
        content: String,
        history_index: Option<usize>,
    },

    /// Placeholder shown between submit and reply.
    Pending {
        id: CellId,
        created_at: DateTime<Utc>,
    },

    /// System message or informational banner.
    System {
        id: CellId,
        created_at: DateTime<Utc>,
        content: String,
    },
}

impl HistoryCell {
    /// Returns the cell's unique ID.
    pub fn id(&self) -> CellId {
        match self {
            HistoryCell::User { id, .. } => *id,
            HistoryCell::Assistant { id, .. } => *id,
            HistoryCell::Pending { id, .. } => *id,
            HistoryCell::System { id, .. } => *id,
        }
    }

    /// Creates a new user cell.
    pub fn user(content: impl Into<String>) -> Self {
        HistoryCell::User {
            id: CellId::new(),
            created_at: Utc::now(),
            content: content.into(),
        }
    }

    /// Creates a new assistant cell without a recorded history index.
    pub fn assistant(content: impl Into<String>) -> Self {
        HistoryCell::Assistant {
            id: CellId::new(),
            created_at: Utc::now(),
            content: content.into(),
            history_index: None,
        }
    }

    /// Creates an assistant cell with an explicit history index.
    pub fn assistant_at(content: impl Into<String>, history_index: usize) -> Self {
        HistoryCell::Assistant {
            id: CellId::new(),
            created_at: Utc::now(),
            content: content.into(),
            history_index: Some(history_index),
        }
    }

    /// Creates the pending-reply placeholder.
    pub fn pending() -> Self {
        HistoryCell::Pending {
            id: CellId::new(),
            created_at: Utc::now(),
        }
    }

    /// Creates a system/info cell.
    pub fn system(content: impl Into<String>) -> Self {
        HistoryCell::System {
            id: CellId::new(),
            created_at: Utc::now(),
            content: content.into(),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, HistoryCell::Pending { .. })
    }

    /// Counts toward history indexing (user and assistant turns only).
    pub fn is_message(&self) -> bool {
        matches!(
            self,
            HistoryCell::User { .. } | HistoryCell::Assistant { .. }
        )
    }

    /// Explicit history index recorded at append time, if any.
    pub fn recorded_history_index(&self) -> Option<usize> {
        match self {
            HistoryCell::Assistant { history_index, .. } => *history_index,
            _ => None,
        }
    }

    /// Returns whether this cell's display output can be cached.
    ///
    /// The pending placeholder animates every frame and is never cached.
    pub fn is_cacheable(&self) -> bool {
        !self.is_pending()
    }

    /// Returns a discriminator for cache key computation.
    ///
    /// The value must change when the rendered output would change.
    pub fn content_len(&self) -> usize {
        match self {
            HistoryCell::User { content, .. } => content.len(),
            HistoryCell::Assistant { content, .. } => content.len(),
            HistoryCell::Pending { .. } => 0,
            HistoryCell::System { content, .. } => content.len(),
        }
    }

    /// Renders this cell into display lines at the given width.
    pub fn display_lines(&self, width: usize, spinner_frame: usize) -> Vec<StyledLine> {
        match self {
            HistoryCell::User { content, .. } => {
                // Literal text: sanitize control characters, never parse
                let sanitized = sanitize_for_display(content);
                render_prefixed_content(
                    "│ ",
                    &sanitized,
                    width,
                    Style::UserPrefix,
                    Style::User,
                    true,
                )
            }
            HistoryCell::Assistant { content, .. } => render_markdown(content, width),
            HistoryCell::Pending { .. } => {
                let frame = SPINNER_FRAMES[spinner_frame % SPINNER_FRAMES.len()];
                vec![StyledLine {
                    spans: vec![
                        StyledSpan::new(format!("{frame} "), Style::Pending),
                        StyledSpan::new("Thinking...", Style::Pending),
                    ],
                }]
            }
            HistoryCell::System { content, .. } => {
                let prefix = "• ";
                let prefix_width = prefix.width();
                let content_width = width.saturating_sub(prefix_width).max(10);
                let sanitized = sanitize_for_display(content);

                let mut lines = Vec::new();
                for (i, wrapped) in wrap_text(&sanitized, content_width).into_iter().enumerate() {
                    let lead = if i == 0 {
                        StyledSpan::new(prefix, Style::SystemPrefix)
                    } else {
                        StyledSpan::new(" ".repeat(prefix_width), Style::Plain)
                    };
                    lines.push(StyledLine {
                        spans: vec![lead, StyledSpan::new(wrapped, Style::System)],
                    });
                }
                lines
            }
        }
    }

    /// Renders this cell into display lines, using cache when possible.
    ///
    /// This is the preferred method for rendering in the TUI loop.
    pub fn display_lines_cached(
        &self,
        width: usize,
        spinner_frame: usize,
        cache: &WrapCache,
    ) -> Vec<StyledLine> {
        // Skip cache for dynamic cells
        if !self.is_cacheable() {
            return self.display_lines(width, spinner_frame);
        }

        let cell_id = self.id();
        let content_len = self.content_len();

        if let Some(cached) = cache.get(cell_id, width, content_len) {
            return cached;
        }

        let lines = self.display_lines(width, spinner_frame);
        cache.insert(cell_id, width, content_len, lines.clone());
        lines
    }
}
