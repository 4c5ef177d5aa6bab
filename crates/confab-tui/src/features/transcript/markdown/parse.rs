//! Markdown to styled-line conversion for assistant replies.

use comfy_table::{ContentArrangement, Table};
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use unicode_width::UnicodeWidthStr;

use super::wrap::{WrapOptions, wrap_styled_spans};
use crate::features::transcript::{Style, StyledLine, StyledSpan};

/// Renders markdown into wrapped styled lines at the given width.
pub fn render_markdown(text: &str, width: usize) -> Vec<StyledLine> {
    if text.is_empty() {
        return vec![StyledLine::empty()];
    }

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);

    let mut writer = MarkdownWriter::new(width);
    for event in Parser::new_ext(text, options) {
        writer.on_event(event);
    }
    writer.into_lines()
}

struct MarkdownWriter {
    width: usize,
    lines: Vec<StyledLine>,
    /// Inline spans of the block currently being collected.
    inline: Vec<StyledSpan>,
    /// Nested inline styles; the last entry wins.
    styles: Vec<Style>,
    in_code_block: bool,
    /// Language of the current fenced block, shown on the opening fence.
    fence_lang: Option<String>,
    lists: Vec<ListLevel>,
    /// Present while inside a table; all text routes into it.
    table: Option<TableCollector>,
}

struct ListLevel {
    /// `Some(n)` numbers the next item of an ordered list.
    next_index: Option<u64>,
}

impl MarkdownWriter {
    fn new(width: usize) -> Self {
        Self {
            width,
            lines: Vec::new(),
            inline: Vec::new(),
            styles: vec![Style::Assistant],
            in_code_block: false,
            fence_lang: None,
            lists: Vec::new(),
            table: None,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or(Style::Assistant)
    }

    fn pop_style(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }

    fn on_event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.on_start(tag),
            Event::End(tag) => self.on_end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            // Breaks inside a table cell collapse to a space
            Event::SoftBreak => match &mut self.table {
                Some(table) => table.text(" "),
                None => self.inline.push(StyledSpan::new(" ", self.style())),
            },
            Event::HardBreak => match &mut self.table {
                Some(table) => table.text(" "),
                None => self.inline.push(StyledSpan::new("\n", self.style())),
            },
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.inline.push(StyledSpan::new(marker, Style::ListBullet));
            }
            Event::Rule => {
                self.flush_paragraph();
                self.push_line(vec![StyledSpan::new(
                    "─".repeat(self.width.min(40)),
                    Style::Plain,
                )]);
            }
            // Raw HTML never reaches the terminal
            Event::Html(_) | Event::InlineHtml(_) => {}
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {}
        }
    }

    fn on_start(&mut self, tag: Tag) {
        match tag {
            Tag::Heading { level, .. } => self.styles.push(match level {
                HeadingLevel::H1 => Style::H1,
                HeadingLevel::H2 => Style::H2,
                _ => Style::H3,
            }),
            Tag::CodeBlock(kind) => {
                self.flush_paragraph();
                self.in_code_block = true;
                self.fence_lang = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                    _ => None,
                };
                self.styles.push(Style::CodeBlock);
            }
            Tag::List(start) => {
                self.flush_paragraph();
                self.lists.push(ListLevel { next_index: start });
            }
            Tag::Item => self.flush_paragraph(),
            Tag::BlockQuote(_) => {
                self.flush_paragraph();
                self.styles.push(Style::BlockQuote);
            }
            Tag::Emphasis => self.styles.push(Style::Emphasis),
            Tag::Strong => self.styles.push(Style::Strong),
            Tag::Link { .. } => self.styles.push(Style::Link),
            // No terminal rendering for these; fall back to plain
            Tag::Strikethrough | Tag::Superscript | Tag::Subscript => {
                self.styles.push(Style::Plain);
            }
            Tag::Table(_) => {
                self.flush_paragraph();
                self.table = Some(TableCollector::default());
            }
            Tag::TableHead => {
                if let Some(table) = &mut self.table {
                    table.in_head = true;
                }
            }
            Tag::TableCell => {
                if let Some(table) = &mut self.table {
                    table.cell.clear();
                }
            }
            _ => {}
        }
    }

    fn on_end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush_paragraph();
                // Blank line between paragraphs, but not inside list items
                if self.lists.is_empty() {
                    self.lines.push(StyledLine::empty());
                }
            }
            TagEnd::Heading(_) => {
                self.flush_paragraph();
                self.pop_style();
                self.lines.push(StyledLine::empty());
            }
            TagEnd::CodeBlock => {
                self.flush_code_block();
                self.in_code_block = false;
                self.pop_style();
                self.lines.push(StyledLine::empty());
            }
            TagEnd::List(_) => {
                self.lists.pop();
                if self.lists.is_empty() {
                    self.lines.push(StyledLine::empty());
                }
            }
            TagEnd::Item => {
                self.flush_list_item();
                if let Some(level) = self.lists.last_mut() {
                    if let Some(n) = &mut level.next_index {
                        *n += 1;
                    }
                }
            }
            TagEnd::BlockQuote(_) => {
                self.flush_paragraph();
                self.pop_style();
            }
            TagEnd::Emphasis
            | TagEnd::Strong
            | TagEnd::Link
            | TagEnd::Strikethrough
            | TagEnd::Superscript
            | TagEnd::Subscript => self.pop_style(),
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    for line in table.render(self.width) {
                        self.push_line(vec![StyledSpan::new(line, Style::Plain)]);
                    }
                }
                self.lines.push(StyledLine::empty());
            }
            TagEnd::TableHead => {
                if let Some(table) = &mut self.table {
                    table.finish_row();
                    table.in_head = false;
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = &mut self.table {
                    if !table.in_head {
                        table.finish_row();
                    }
                }
            }
            TagEnd::TableCell => {
                if let Some(table) = &mut self.table {
                    table.finish_cell();
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(table) = &mut self.table {
            table.text(&text.replace('\n', " "));
            return;
        }
        self.inline.push(StyledSpan::new(text, self.style()));
    }

    fn inline_code(&mut self, code: &str) {
        if let Some(table) = &mut self.table {
            table.text(&format!("`{}`", code.replace('\n', " ")));
            return;
        }
        self.inline.push(StyledSpan::new(code, Style::CodeInline));
    }

    fn push_line(&mut self, spans: Vec<StyledSpan>) {
        self.lines.push(StyledLine { spans });
    }

    fn flush_paragraph(&mut self) {
        if self.inline.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.inline);
        self.lines
            .extend(wrap_styled_spans(&spans, &WrapOptions::new(self.width)));
    }

    /// Emits the collected block verbatim between dim fences, each line
    /// indented two columns and never wrapped.
    fn flush_code_block(&mut self) {
        if self.inline.is_empty() {
            return;
        }
        let code: String = std::mem::take(&mut self.inline)
            .iter()
            .map(|s| s.text.as_str())
            .collect();

        let fence = match self.fence_lang.take() {
            Some(lang) => format!("```{lang}"),
            None => "```".to_string(),
        };
        self.push_line(vec![StyledSpan::new(fence, Style::CodeFence)]);

        for line in code.trim_end_matches('\n').split('\n') {
            self.push_line(vec![
                StyledSpan::new("  ", Style::Plain),
                StyledSpan::new(line, Style::CodeBlock),
            ]);
        }

        self.push_line(vec![StyledSpan::new("```", Style::CodeFence)]);
    }

    fn flush_list_item(&mut self) {
        if self.inline.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.inline);

        let (marker, marker_style) = match self.lists.last().and_then(|l| l.next_index) {
            Some(n) => (format!("{n}. "), Style::ListNumber),
            None => ("• ".to_string(), Style::ListBullet),
        };
        let indent = "  ".repeat(self.lists.len().saturating_sub(1));

        // Continuation lines align under the item text, past the marker
        let opts = WrapOptions {
            width: self.width,
            first_prefix: vec![
                StyledSpan::new(indent.clone(), Style::Plain),
                StyledSpan::new(marker.clone(), marker_style),
            ],
            rest_prefix: vec![StyledSpan::new(
                format!("{indent}{}", " ".repeat(marker.width())),
                Style::Plain,
            )],
        };
        self.lines.extend(wrap_styled_spans(&spans, &opts));
    }

    fn into_lines(mut self) -> Vec<StyledLine> {
        if !self.inline.is_empty() {
            if self.in_code_block {
                self.flush_code_block();
            } else {
                self.flush_paragraph();
            }
        }

        while self.lines.last().is_some_and(|l| l.spans.is_empty()) {
            self.lines.pop();
        }
        if self.lines.is_empty() {
            self.lines.push(StyledLine::empty());
        }
        self.lines
    }
}

/// Accumulates table cells as plain text; comfy-table does the layout.
#[derive(Default)]
struct TableCollector {
    in_head: bool,
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    cell: String,
}

impl TableCollector {
    fn text(&mut self, text: &str) {
        self.cell.push_str(text);
    }

    fn finish_cell(&mut self) {
        self.row.push(std::mem::take(&mut self.cell));
    }

    fn finish_row(&mut self) {
        let row = std::mem::take(&mut self.row);
        if self.in_head {
            self.header = row;
        } else {
            self.rows.push(row);
        }
    }

    fn render(&self, max_width: usize) -> Vec<String> {
        let mut table = Table::new();
        table.set_width(max_width as u16);
        table.set_content_arrangement(ContentArrangement::Dynamic);

        if !self.header.is_empty() {
            table.set_header(&self.header);
        }
        for row in &self.rows {
            table.add_row(row);
        }

        table.to_string().lines().map(String::from).collect()
    }
}
