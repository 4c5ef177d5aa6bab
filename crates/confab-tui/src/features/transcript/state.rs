//! Transcript display state.
//!
//! Manages scroll position, viewport dimensions, and the rendering cache
//! for the transcript area.

use std::ops::Range;

use super::cell::{CellId, HistoryCell};
use super::wrap::WrapCache;

/// Scroll mode for the transcript.
#[derive(Debug, Clone)]
pub enum ScrollMode {
    /// Auto-scroll to show latest content (bottom of transcript).
    FollowLatest,
    /// User scrolled manually; offset is line index from top.
    Anchored { offset: usize },
}

/// Line count info for a single cell.
///
/// Used for O(log n) visibility calculations in lazy rendering.
#[derive(Debug, Clone)]
pub struct CellLineInfo {
    /// Unique cell ID (stored for debugging and future extensibility).
    #[allow(dead_code)]
    pub cell_id: CellId,
    /// Starting line index (cumulative offset from top).
    pub start_line: usize,
    /// Number of lines this cell produces (including trailing blank).
    pub line_count: usize,
}

/// Result of visible range calculation.
#[derive(Debug, Clone)]
pub struct VisibleRange {
    /// Range of cell indices that are visible.
    pub cell_range: Range<usize>,
    /// Line offset to skip within the first visible cell.
    pub first_cell_line_offset: usize,
}

/// Scroll state for the transcript pane.
///
/// Encapsulates scroll mode, cached line count, and all scroll navigation
/// logic. This keeps scroll math in one place and simplifies the reducer.
#[derive(Debug, Clone)]
pub struct ScrollState {
    /// Current scroll mode (follow latest or anchored at offset).
    pub mode: ScrollMode,
    /// Cached total line count from last render (for scroll calculations).
    pub cached_line_count: usize,
    /// Line info per cell for O(log n) visibility calculations.
    /// Updated when cells change or terminal width changes.
    pub cell_line_info: Vec<CellLineInfo>,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            mode: ScrollMode::FollowLatest,
            cached_line_count: 0,
            cell_line_info: Vec::new(),
        }
    }
}

impl ScrollState {
    /// Returns true if currently following output (auto-scroll).
    pub fn is_following(&self) -> bool {
        matches!(self.mode, ScrollMode::FollowLatest)
    }

    /// Returns the current scroll offset for rendering.
    ///
    /// In `FollowLatest` mode, calculates the offset to show the bottom of
    /// content. In `Anchored` mode, returns the stored offset clamped to
    /// the valid range.
    pub fn get_offset(&self, viewport_height: usize) -> usize {
        match &self.mode {
            ScrollMode::FollowLatest => self.cached_line_count.saturating_sub(viewport_height),
            ScrollMode::Anchored { offset } => {
                let max_offset = self.cached_line_count.saturating_sub(viewport_height);
                (*offset).min(max_offset)
            }
        }
    }

    /// Scrolls up by the given number of lines.
    pub fn scroll_up(&mut self, lines: usize, viewport_height: usize) {
        let current_offset = self.get_offset(viewport_height);
        let new_offset = current_offset.saturating_sub(lines);
        self.mode = ScrollMode::Anchored { offset: new_offset };
    }

    /// Scrolls down by the given number of lines.
    ///
    /// Transitions to `FollowLatest` mode when reaching the bottom.
    pub fn scroll_down(&mut self, lines: usize, viewport_height: usize) {
        if matches!(self.mode, ScrollMode::FollowLatest) {
            return; // Already at bottom
        }

        let current_offset = self.get_offset(viewport_height);
        let max_offset = self.cached_line_count.saturating_sub(viewport_height);
        let new_offset = (current_offset + lines).min(max_offset);

        if new_offset >= max_offset {
            self.mode = ScrollMode::FollowLatest;
        } else {
            self.mode = ScrollMode::Anchored { offset: new_offset };
        }
    }

    /// Scrolls to the top of the transcript.
    pub fn scroll_to_top(&mut self) {
        self.mode = ScrollMode::Anchored { offset: 0 };
    }

    /// Scrolls to the bottom of the transcript (enables follow mode).
    pub fn scroll_to_bottom(&mut self) {
        self.mode = ScrollMode::FollowLatest;
    }

    /// Scrolls up by one page.
    pub fn page_up(&mut self, viewport_height: usize) {
        self.scroll_up(viewport_height.max(1), viewport_height);
    }

    /// Scrolls down by one page.
    pub fn page_down(&mut self, viewport_height: usize) {
        self.scroll_down(viewport_height.max(1), viewport_height);
    }

    /// Resets scroll state to follow mode (after clearing the transcript).
    pub fn reset(&mut self) {
        self.mode = ScrollMode::FollowLatest;
        self.cached_line_count = 0;
        self.cell_line_info.clear();
    }

    /// Calculates which cells are visible in the current viewport.
    ///
    /// Returns `None` if `cell_line_info` is not yet populated. Otherwise
    /// returns the range of cell indices to render and the line offset
    /// inside the first visible cell.
    pub fn visible_range(&self, viewport_height: usize) -> Option<VisibleRange> {
        if self.cell_line_info.is_empty() {
            return None;
        }

        let scroll_offset = self.get_offset(viewport_height);
        let viewport_end = scroll_offset + viewport_height;

        // Binary search for first cell that overlaps with viewport:
        // cell.start_line + cell.line_count > scroll_offset
        let first_cell = self
            .cell_line_info
            .partition_point(|info| info.start_line + info.line_count <= scroll_offset);

        if first_cell >= self.cell_line_info.len() {
            return None;
        }

        // Binary search for last cell that overlaps with viewport:
        // cell.start_line < viewport_end
        let last_cell = self
            .cell_line_info
            .partition_point(|info| info.start_line < viewport_end);

        let first_cell_info = &self.cell_line_info[first_cell];
        let first_cell_line_offset = scroll_offset.saturating_sub(first_cell_info.start_line);

        Some(VisibleRange {
            cell_range: first_cell..last_cell,
            first_cell_line_offset,
        })
    }

    /// Updates cell line info from rendered cells.
    ///
    /// Call this after layout to keep visibility calculations accurate.
    /// The iterator yields `(cell_id, line_count)` pairs in cell order.
    /// Also updates `cached_line_count`.
    pub fn update_cell_line_info<I>(&mut self, line_counts: I)
    where
        I: IntoIterator<Item = (CellId, usize)>,
    {
        self.cell_line_info.clear();
        let mut cumulative_offset = 0;

        for (cell_id, line_count) in line_counts {
            self.cell_line_info.push(CellLineInfo {
                cell_id,
                start_line: cumulative_offset,
                line_count,
            });
            cumulative_offset += line_count;
        }

        self.cached_line_count = cumulative_offset;
    }
}

/// Accumulator for mouse scroll deltas.
///
/// Coalesces rapid scroll events (especially from trackpads) into a single
/// scroll operation per frame, reducing jitter.
///
/// Convention: positive delta = scroll down, negative delta = scroll up.
#[derive(Debug, Clone, Default)]
pub struct ScrollAccumulator {
    pending_delta: i32,
}

impl ScrollAccumulator {
    /// Accumulates a scroll delta.
    pub fn accumulate(&mut self, delta: i32) {
        self.pending_delta += delta;
    }

    /// Takes the accumulated delta, resetting it to zero.
    pub fn take_delta(&mut self) -> i32 {
        std::mem::take(&mut self.pending_delta)
    }
}

/// Transcript display state.
///
/// Encapsulates everything needed to display the transcript: cells, scroll
/// position, layout dimensions, and the wrap cache.
#[derive(Debug)]
pub struct TranscriptState {
    /// Transcript cells (in-memory display).
    pub cells: Vec<HistoryCell>,

    /// Scroll state (mode, offset, cached line count).
    pub scroll: ScrollState,

    /// Accumulator for mouse scroll deltas.
    pub scroll_accumulator: ScrollAccumulator,

    /// Cache for wrapped line rendering.
    pub wrap_cache: WrapCache,

    /// Available height for the transcript viewport.
    pub viewport_height: usize,

    /// Current terminal dimensions (width, height).
    pub terminal_size: (u16, u16),
}

impl Default for TranscriptState {
    fn default() -> Self {
        Self {
            cells: Vec::new(),
            scroll: ScrollState::default(),
            scroll_accumulator: ScrollAccumulator::default(),
            wrap_cache: WrapCache::new(),
            viewport_height: 20,
            terminal_size: (80, 24),
        }
    }
}

impl TranscriptState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a cell to the transcript.
    pub fn push_cell(&mut self, cell: HistoryCell) {
        self.cells.push(cell);
    }

    /// Removes the pending-reply placeholder, if present.
    ///
    /// Returns true if a placeholder was removed.
    pub fn remove_pending(&mut self) -> bool {
        let before = self.cells.len();
        self.cells.retain(|c| !c.is_pending());
        self.cells.len() != before
    }

    /// Returns true if a pending-reply placeholder is displayed.
    pub fn has_pending(&self) -> bool {
        self.cells.iter().any(HistoryCell::is_pending)
    }

    /// Resets the transcript to an empty state.
    ///
    /// Clears cells, scroll, and wrap cache. Keeps viewport and terminal
    /// dimensions.
    pub fn reset(&mut self) {
        self.cells.clear();
        self.scroll.reset();
        self.wrap_cache.clear();
    }

    /// Resolves the server history index for the cell at `cell_index`.
    ///
    /// An explicitly recorded index wins; otherwise the cell's position
    /// among message cells (user and assistant turns) is used, which
    /// matches the server's history ordering for freshly loaded pages.
    pub fn history_index_for(&self, cell_index: usize) -> Option<usize> {
        let cell = self.cells.get(cell_index)?;
        if let Some(recorded) = cell.recorded_history_index() {
            return Some(recorded);
        }
        if !cell.is_message() {
            return None;
        }
        Some(
            self.cells[..cell_index]
                .iter()
                .filter(|c| c.is_message())
                .count(),
        )
    }

    /// Scrolls up by the given number of lines.
    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll.scroll_up(lines, self.viewport_height);
    }

    /// Scrolls down by the given number of lines.
    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll.scroll_down(lines, self.viewport_height);
    }

    /// Scrolls up by one page.
    pub fn page_up(&mut self) {
        self.scroll.page_up(self.viewport_height);
    }

    /// Scrolls down by one page.
    pub fn page_down(&mut self) {
        self.scroll.page_down(self.viewport_height);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll.scroll_to_top();
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll.scroll_to_bottom();
    }

    /// Updates layout dimensions from terminal size and computed viewport.
    pub fn update_layout(&mut self, terminal_size: (u16, u16), viewport_height: usize) {
        self.terminal_size = terminal_size;
        self.viewport_height = viewport_height;
    }
}
