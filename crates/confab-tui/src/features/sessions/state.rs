//! Session list state.
//!
//! The list mirrors the server's ordered session names. Mutations patch in
//! place after the server confirms; nothing changes optimistically.

use chrono::Utc;

/// Ordered session list plus the active session name.
#[derive(Debug, Clone, Default)]
pub struct SessionsState {
    /// Session names, in server order.
    pub sessions: Vec<String>,
    /// Name of the active session.
    pub current: String,
}

impl SessionsState {
    /// Replaces the whole list and current name from a fresh page load.
    pub fn replace(&mut self, sessions: Vec<String>, current: String) {
        self.sessions = sessions;
        self.current = current;
    }

    /// Patches one renamed entry in place.
    ///
    /// `new_name` is the server-confirmed name. Updates the current-session
    /// label if the renamed session was active. The rest of the list is
    /// untouched.
    pub fn patch_renamed(&mut self, old_name: &str, new_name: &str) {
        if let Some(entry) = self.sessions.iter_mut().find(|s| *s == old_name) {
            *entry = new_name.to_string();
        }
        if self.current == old_name {
            self.current = new_name.to_string();
        }
    }

    /// Removes exactly one entry by name.
    pub fn remove(&mut self, session_id: &str) {
        if let Some(pos) = self.sessions.iter().position(|s| s == session_id) {
            self.sessions.remove(pos);
        }
    }

    /// Replaces the current-session label (server-assigned save title).
    pub fn set_current(&mut self, session_id: &str) {
        if let Some(entry) = self.sessions.iter_mut().find(|s| **s == self.current) {
            *entry = session_id.to_string();
        }
        self.current = session_id.to_string();
    }
}

/// Mints a temporary session id for session creation.
///
/// The wire contract requires `新会话_` followed by the epoch timestamp in
/// milliseconds.
pub fn mint_temp_session_id() -> String {
    format!("新会话_{}", Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> SessionsState {
        SessionsState {
            sessions: vec!["alpha".into(), "beta".into(), "gamma".into()],
            current: "beta".into(),
        }
    }

    #[test]
    fn test_patch_renamed_updates_one_entry() {
        let mut s = state();
        s.patch_renamed("alpha", "omega");
        assert_eq!(s.sessions, vec!["omega", "beta", "gamma"]);
        assert_eq!(s.current, "beta");
    }

    #[test]
    fn test_patch_renamed_updates_current_label() {
        let mut s = state();
        s.patch_renamed("beta", "delta");
        assert_eq!(s.current, "delta");
        assert_eq!(s.sessions[1], "delta");
    }

    #[test]
    fn test_patch_renamed_missing_session_is_noop() {
        let mut s = state();
        s.patch_renamed("nope", "whatever");
        assert_eq!(s.sessions, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_remove_exactly_one_entry() {
        let mut s = state();
        s.remove("gamma");
        assert_eq!(s.sessions, vec!["alpha", "beta"]);
        s.remove("gamma");
        assert_eq!(s.sessions.len(), 2);
    }

    #[test]
    fn test_set_current_renames_list_entry_too() {
        let mut s = state();
        s.set_current("会话_你好");
        assert_eq!(s.current, "会话_你好");
        assert_eq!(s.sessions[1], "会话_你好");
    }

    #[test]
    fn test_temp_session_id_shape() {
        let id = mint_temp_session_id();
        let digits = id.strip_prefix("新会话_").expect("prefix");
        assert!(!digits.is_empty());
        assert!(digits.chars().all(|c| c.is_ascii_digit()));
    }
}
