//! Recursion log panel view.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use confab_core::wire::LogEntry;

use super::state::LogsState;
use crate::features::transcript::render::convert_styled_line;
use crate::features::transcript::{Style as TranscriptStyle, StyledLine, StyledSpan};

/// Placeholder shown when the panel has no entries.
const EMPTY_PLACEHOLDER: &str = "暂无递归调用记录";

/// Renders the recursion log panel into the given area.
pub fn render_logs_panel(frame: &mut Frame, area: Rect, logs: &LogsState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" 递归调用记录 ");

    let lines: Vec<Line<'static>> = build_panel_lines(logs)
        .into_iter()
        .map(convert_styled_line)
        .collect();

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

/// Builds the panel contents as styled lines.
fn build_panel_lines(logs: &LogsState) -> Vec<StyledLine> {
    let mut lines = Vec::new();

    if let Some(error) = &logs.error {
        lines.push(StyledLine {
            spans: vec![StyledSpan::new(error.clone(), TranscriptStyle::LogError)],
        });
        lines.push(StyledLine::empty());
    }

    if logs.entries.is_empty() {
        lines.push(StyledLine {
            spans: vec![StyledSpan::new(EMPTY_PLACEHOLDER, TranscriptStyle::System)],
        });
        return lines;
    }

    for (i, entry) in logs.entries.iter().enumerate() {
        if i > 0 {
            lines.push(StyledLine::empty());
        }
        render_entry(entry, &mut lines);
    }

    lines
}

/// Renders one log entry as a block of styled lines.
fn render_entry(entry: &LogEntry, lines: &mut Vec<StyledLine>) {
    // Header: timestamp plus [LEVEL]
    lines.push(StyledLine {
        spans: vec![
            StyledSpan::new(entry.timestamp.clone(), TranscriptStyle::LogTimestamp),
            StyledSpan::new(" ", TranscriptStyle::Plain),
            StyledSpan::new(format!("[{}]", entry.level), TranscriptStyle::LogLevel),
        ],
    });

    // Function name with the unknown-function fallback
    let function = if entry.function.is_empty() {
        "未知函数"
    } else {
        entry.function.as_str()
    };
    let mut name_spans = vec![StyledSpan::new(function, TranscriptStyle::LogFunction)];
    if entry.is_tool_call() {
        let tool = entry.tool_name.as_deref().unwrap_or("");
        name_spans.push(StyledSpan::new(
            format!(" 🔧 {tool}"),
            TranscriptStyle::LogTool,
        ));
    }
    lines.push(StyledLine { spans: name_spans });

    if let Some(params) = &entry.params {
        lines.push(labeled_json("参数: ", params));
    }
    if let Some(result) = &entry.result {
        lines.push(labeled_json("结果: ", result));
    }

    if let Some(source) = &entry.source {
        lines.push(StyledLine {
            spans: vec![
                StyledSpan::new("来源: ", TranscriptStyle::LogLabel),
                StyledSpan::new(
                    source.clone(),
                    TranscriptStyle::LogSource(entry.source_kind()),
                ),
            ],
        });
    }
}

/// A `label: value` line with the value as compact JSON.
fn labeled_json(label: &str, value: &serde_json::Value) -> StyledLine {
    let rendered = serde_json::to_string(value).unwrap_or_else(|_| value.to_string());
    StyledLine {
        spans: vec![
            StyledSpan::new(label, TranscriptStyle::LogLabel),
            StyledSpan::new(rendered, TranscriptStyle::System),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn all_text(lines: &[StyledLine]) -> String {
        lines
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.text.as_str()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn tool_entry() -> LogEntry {
        LogEntry {
            timestamp: "10:30:00".to_string(),
            level: "TOOL_CALL".to_string(),
            function: "call_tool".to_string(),
            params: Some(json!({"query": "你好"})),
            result: Some(json!("done")),
            tool_name: Some("search".to_string()),
            source: Some("agent.recursion".to_string()),
        }
    }

    #[test]
    fn test_empty_panel_shows_placeholder() {
        let logs = LogsState::default();
        let text = all_text(&build_panel_lines(&logs));
        assert!(text.contains("暂无递归调用记录"));
    }

    #[test]
    fn test_entry_block_fields() {
        let mut logs = LogsState::default();
        logs.apply_fetch(vec![tool_entry()]);

        let text = all_text(&build_panel_lines(&logs));
        assert!(text.contains("10:30:00"));
        assert!(text.contains("[TOOL_CALL]"));
        assert!(text.contains("call_tool"));
        assert!(text.contains("🔧 search"));
        assert!(text.contains("参数: "));
        assert!(text.contains(r#"{"query":"你好"}"#));
        assert!(text.contains("结果: "));
        assert!(text.contains("来源: "));
    }

    #[test]
    fn test_empty_function_renders_placeholder() {
        let mut entry = tool_entry();
        entry.function = String::new();
        entry.level = "INFO".to_string();
        let mut logs = LogsState::default();
        logs.apply_fetch(vec![entry]);

        let text = all_text(&build_panel_lines(&logs));
        assert!(text.contains("未知函数"));
        assert!(!text.contains("🔧"));
    }

    #[test]
    fn test_error_line_keeps_entries_visible() {
        let mut logs = LogsState::default();
        logs.apply_fetch(vec![tool_entry()]);
        logs.set_error("加载递归日志时出错");

        let text = all_text(&build_panel_lines(&logs));
        assert!(text.contains("加载递归日志时出错"));
        assert!(text.contains("call_tool"));
    }
}
