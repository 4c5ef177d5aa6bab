//! Wire types for the chat server's JSON contract.
//!
//! Field names mirror the server payloads exactly. Unknown fields are
//! ignored so the server can grow its payloads without breaking clients.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Speaker role of a history turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Maps the server's role string. Unknown roles render as system text.
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            _ => Role::System,
        }
    }
}

/// One turn of saved history.
///
/// The server stores turns as two-element `["role", "text"]` arrays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryTurn {
    pub role: Role,
    pub text: String,
}

impl<'de> Deserialize<'de> for HistoryTurn {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (role, text) = <(String, String)>::deserialize(deserializer)?;
        Ok(Self {
            role: Role::from_raw(&role),
            text,
        })
    }
}

/// The page document served at `/`.
///
/// Fields mirror the variables the server renders into the page: the
/// session list, the active session id, its history, and the current
/// recursion log window.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageState {
    #[serde(default)]
    pub sessions: Vec<String>,
    #[serde(default)]
    pub current_session: String,
    #[serde(default)]
    pub history: Vec<HistoryTurn>,
    #[serde(default)]
    pub recursion_logs: Vec<LogEntry>,
}

/// Reply from `/send_message`.
///
/// Server-side failures also arrive through this shape, with the error
/// text in `response`.
#[derive(Debug, Clone, Deserialize)]
pub struct SendReply {
    pub response: String,
}

/// Reply from `/save_session`.
///
/// `session_id` is present when the server auto-titled a fresh session.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveReply {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Reply from `/rename_session` and `/delete_session`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusReply {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub new_session_id: Option<String>,
}

/// Reply from `/get_recursion_logs`.
///
/// The documented shape is `{"logs": [...]}`. Older servers answered with
/// a bare array; the untagged second arm keeps them working.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LogsReply {
    Wrapped { logs: Vec<LogEntry> },
    Bare(Vec<LogEntry>),
}

impl LogsReply {
    pub fn into_entries(self) -> Vec<LogEntry> {
        match self {
            LogsReply::Wrapped { logs } => logs,
            LogsReply::Bare(entries) => entries,
        }
    }
}

/// One recursion log record.
///
/// Entries carry no identity beyond their position in the response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LogEntry {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub level: String,
    /// Some server versions emit this field as `function_name`.
    #[serde(default, alias = "function_name")]
    pub function: String,
    #[serde(default)]
    pub params: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl LogEntry {
    /// Levels starting with `TOOL_` mark tool invocations.
    pub fn is_tool_call(&self) -> bool {
        self.level.starts_with("TOOL_")
    }

    /// Category of this entry's source tag.
    pub fn source_kind(&self) -> LogSource {
        LogSource::from_raw(self.source.as_deref())
    }
}

/// Origin category of a log entry, used to style its source tag.
///
/// The raw `source` string is free-form (often a dotted module path); this
/// enum gives it a total mapping so every entry styles deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogSource {
    Agent,
    Tool,
    Llm,
    Database,
    User,
    Assistant,
    #[default]
    Default,
}

impl LogSource {
    /// Known category names, in match-priority order.
    const NAMED: [(&'static str, LogSource); 6] = [
        ("Agent", LogSource::Agent),
        ("Tool", LogSource::Tool),
        ("LLM", LogSource::Llm),
        ("Database", LogSource::Database),
        ("User", LogSource::User),
        ("Assistant", LogSource::Assistant),
    ];

    /// Maps a raw source string to a category.
    ///
    /// Resolution order: substring containment in either direction against
    /// the known names (exact matches included), then the segment after the
    /// last dot, then `Default`. Missing or empty sources are `Default`.
    pub fn from_raw(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return LogSource::Default;
        };
        if raw.is_empty() {
            return LogSource::Default;
        }

        for (name, source) in Self::NAMED {
            if raw.contains(name) || name.contains(raw) {
                return source;
            }
        }

        if let Some(last) = raw.rsplit('.').next() {
            for (name, source) in Self::NAMED {
                if last == name {
                    return source;
                }
            }
        }

        LogSource::Default
    }

    /// Canonical name, e.g. for the status line.
    pub fn label(self) -> &'static str {
        match self {
            LogSource::Agent => "Agent",
            LogSource::Tool => "Tool",
            LogSource::Llm => "LLM",
            LogSource::Database => "Database",
            LogSource::User => "User",
            LogSource::Assistant => "Assistant",
            LogSource::Default => "Default",
        }
    }
}
