//! Recursion log panel state.

use confab_core::wire::LogEntry;

/// Outcome of applying a fetched log batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFetch {
    /// Contents replaced.
    Replaced,
    /// Fingerprint matched; panel left untouched.
    Skipped,
}

/// Recursion log panel state.
#[derive(Debug, Clone, Default)]
pub struct LogsState {
    /// Entries in server response order.
    pub entries: Vec<LogEntry>,
    /// Fingerprint of the last applied batch: entry count plus the first
    /// entry's timestamp. A matching fingerprint skips the rebuild.
    fingerprint: Option<(usize, String)>,
    /// Inline error line, shown above any surviving entries.
    pub error: Option<String>,
    /// Whether the panel is shown.
    pub visible: bool,
}

impl LogsState {
    /// Applies a fetched batch.
    ///
    /// A batch whose fingerprint (count, first timestamp) matches the last
    /// applied one is dropped without touching the panel. Identical
    /// fingerprints with different interior entries are accepted as stale
    /// by contract; the latest differing fetch wins.
    pub fn apply_fetch(&mut self, entries: Vec<LogEntry>) -> LogFetch {
        let fingerprint = Self::fingerprint_of(&entries);
        if self.fingerprint.as_ref() == Some(&fingerprint) {
            self.error = None;
            return LogFetch::Skipped;
        }

        self.fingerprint = Some(fingerprint);
        self.entries = entries;
        self.error = None;
        LogFetch::Replaced
    }

    /// Records a fetch failure. Previous entries stay visible.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Client-side clear: empties the panel without a network call.
    ///
    /// The fingerprint is dropped so the next refresh always repopulates.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.fingerprint = None;
        self.error = None;
    }

    pub fn toggle_visible(&mut self) {
        self.visible = !self.visible;
    }

    fn fingerprint_of(entries: &[LogEntry]) -> (usize, String) {
        (
            entries.len(),
            entries
                .first()
                .map(|e| e.timestamp.clone())
                .unwrap_or_default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(timestamp: &str, function: &str) -> LogEntry {
        LogEntry {
            timestamp: timestamp.to_string(),
            level: "INFO".to_string(),
            function: function.to_string(),
            params: None,
            result: None,
            tool_name: None,
            source: None,
        }
    }

    #[test]
    fn test_apply_fetch_replaces_contents() {
        let mut logs = LogsState::default();
        let result = logs.apply_fetch(vec![entry("10:00:00", "recurse")]);
        assert_eq!(result, LogFetch::Replaced);
        assert_eq!(logs.entries.len(), 1);
    }

    #[test]
    fn test_matching_fingerprint_skips_rebuild() {
        let mut logs = LogsState::default();
        logs.apply_fetch(vec![entry("10:00:00", "recurse")]);

        // Same count and first timestamp, different interior: skipped
        let result = logs.apply_fetch(vec![entry("10:00:00", "different")]);
        assert_eq!(result, LogFetch::Skipped);
        assert_eq!(logs.entries[0].function, "recurse");
    }

    #[test]
    fn test_changed_count_replaces() {
        let mut logs = LogsState::default();
        logs.apply_fetch(vec![entry("10:00:00", "a")]);
        let result = logs.apply_fetch(vec![entry("10:00:00", "a"), entry("10:00:01", "b")]);
        assert_eq!(result, LogFetch::Replaced);
        assert_eq!(logs.entries.len(), 2);
    }

    #[test]
    fn test_clear_drops_fingerprint() {
        let mut logs = LogsState::default();
        logs.apply_fetch(vec![entry("10:00:00", "a")]);
        logs.clear();
        assert!(logs.entries.is_empty());

        // Identical batch repopulates after a clear
        let result = logs.apply_fetch(vec![entry("10:00:00", "a")]);
        assert_eq!(result, LogFetch::Replaced);
    }

    #[test]
    fn test_error_preserves_entries() {
        let mut logs = LogsState::default();
        logs.apply_fetch(vec![entry("10:00:00", "a")]);
        logs.set_error("加载递归日志时出错");
        assert_eq!(logs.entries.len(), 1);
        assert!(logs.error.is_some());

        // A successful fetch clears the error
        logs.apply_fetch(vec![entry("10:00:05", "b")]);
        assert!(logs.error.is_none());
    }
}
