//! Width-aware wrapping for runs of styled spans.
//!
//! Wrapping happens in two passes: spans are first tokenized into words,
//! spaces, verbatim runs, and hard breaks, then a layout pass places the
//! tokens onto lines. Code spans stay verbatim (whitespace preserved,
//! broken per character when oversized); everything else wraps at word
//! boundaries. Styles survive every break.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::features::transcript::{Style, StyledLine, StyledSpan};

/// Wrap settings, including hanging-indent prefixes for list items.
#[derive(Debug, Clone, Default)]
pub struct WrapOptions {
    /// Maximum display width per line.
    pub width: usize,
    /// Spans prepended to the first line (e.g. a list marker).
    pub first_prefix: Vec<StyledSpan>,
    /// Spans prepended to every continuation line.
    pub rest_prefix: Vec<StyledSpan>,
}

impl WrapOptions {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            first_prefix: vec![],
            rest_prefix: vec![],
        }
    }
}

pub fn wrap_styled_spans(spans: &[StyledSpan], opts: &WrapOptions) -> Vec<StyledLine> {
    if opts.width == 0 || spans.is_empty() {
        // Nothing sensible to wrap against; emit everything on one line
        let mut all = opts.first_prefix.clone();
        all.extend(spans.iter().cloned());
        return vec![StyledLine { spans: all }];
    }

    let mut layout = Layout::new(opts);
    for token in tokenize(spans) {
        layout.place(token);
    }
    layout.into_lines()
}

enum Token {
    /// A whitespace-free run that wraps as a unit.
    Word(StyledSpan),
    /// Collapsible space; dropped at line starts and ends.
    Space(Style),
    /// Code text placed exactly as written.
    Verbatim(StyledSpan),
    /// Forced line break (`\n` inside a span).
    Break,
}

fn tokenize(spans: &[StyledSpan]) -> Vec<Token> {
    let mut tokens = Vec::new();

    for span in spans {
        for (i, part) in span.text.split('\n').enumerate() {
            if i > 0 {
                tokens.push(Token::Break);
            }
            if part.is_empty() {
                continue;
            }
            if matches!(span.style, Style::CodeInline | Style::CodeBlock) {
                tokens.push(Token::Verbatim(StyledSpan::new(part, span.style)));
                continue;
            }

            if part.starts_with(|c: char| c.is_whitespace()) {
                tokens.push(Token::Space(span.style));
            }
            let mut words = part.split_whitespace().peekable();
            while let Some(word) = words.next() {
                tokens.push(Token::Word(StyledSpan::new(word, span.style)));
                if words.peek().is_some() {
                    tokens.push(Token::Space(span.style));
                }
            }
            if part.ends_with(|c: char| c.is_whitespace())
                && !part.chars().all(char::is_whitespace)
            {
                tokens.push(Token::Space(span.style));
            }
        }
    }

    tokens
}

struct Layout<'a> {
    opts: &'a WrapOptions,
    lines: Vec<StyledLine>,
    line: Vec<StyledSpan>,
    line_width: usize,
    /// Space waiting to be materialized before the next word.
    pending_space: Option<Style>,
}

impl<'a> Layout<'a> {
    fn new(opts: &'a WrapOptions) -> Self {
        Self {
            opts,
            lines: Vec::new(),
            line: Vec::new(),
            line_width: 0,
            pending_space: None,
        }
    }

    /// Content width of the line currently being filled.
    fn limit(&self) -> usize {
        let prefix = if self.lines.is_empty() {
            &self.opts.first_prefix
        } else {
            &self.opts.rest_prefix
        };
        let prefix_width: usize = prefix.iter().map(|s| s.text.width()).sum();
        self.opts.width.saturating_sub(prefix_width)
    }

    fn place(&mut self, token: Token) {
        match token {
            Token::Word(span) => self.place_word(span),
            Token::Space(style) => {
                if !self.line.is_empty() {
                    self.pending_space = Some(style);
                }
            }
            Token::Verbatim(span) => self.place_verbatim(span),
            Token::Break => self.newline(),
        }
    }

    fn place_word(&mut self, span: StyledSpan) {
        let word_width = span.text.width();
        let space_width = usize::from(self.pending_space.is_some());

        if self.line_width + space_width + word_width <= self.limit() {
            if let Some(style) = self.pending_space.take() {
                self.push_span(StyledSpan::new(" ", style));
            }
            self.push_span(span);
            return;
        }

        if !self.line.is_empty() {
            self.newline();
        }
        if word_width <= self.limit() {
            self.push_span(span);
        } else {
            self.place_chars(span);
        }
    }

    fn place_verbatim(&mut self, span: StyledSpan) {
        let span_width = span.text.width();
        if let Some(style) = self.pending_space.take() {
            if self.line_width < self.limit() {
                self.push_span(StyledSpan::new(" ", style));
            }
        }

        if self.line_width + span_width <= self.limit() {
            self.push_span(span);
            return;
        }

        // A fresh line may hold the whole run; otherwise split per character
        if !self.line.is_empty() && span_width <= self.rest_limit() {
            self.newline();
            self.push_span(span);
        } else {
            self.place_chars(span);
        }
    }

    /// Streams a span character by character, breaking wherever the line
    /// fills. Zero-width characters ride along with the preceding one.
    fn place_chars(&mut self, span: StyledSpan) {
        let mut run = String::new();
        let mut run_width = 0;

        for ch in span.text.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if ch_width > 0
                && self.line_width + run_width + ch_width > self.limit()
                && (self.line_width + run_width) > 0
            {
                if !run.is_empty() {
                    let text = std::mem::take(&mut run);
                    self.push_span(StyledSpan::new(text, span.style));
                    run_width = 0;
                }
                self.newline();
            }
            run.push(ch);
            run_width += ch_width;
        }

        if !run.is_empty() {
            self.push_span(StyledSpan::new(run, span.style));
        }
    }

    fn rest_limit(&self) -> usize {
        let prefix_width: usize = self.opts.rest_prefix.iter().map(|s| s.text.width()).sum();
        self.opts.width.saturating_sub(prefix_width)
    }

    fn push_span(&mut self, span: StyledSpan) {
        self.line_width += span.text.width();
        self.line.push(span);
    }

    fn newline(&mut self) {
        let prefix = if self.lines.is_empty() {
            &self.opts.first_prefix
        } else {
            &self.opts.rest_prefix
        };
        let mut spans = prefix.clone();
        spans.append(&mut self.line);
        self.lines.push(StyledLine { spans });
        self.line_width = 0;
        self.pending_space = None;
    }

    fn into_lines(mut self) -> Vec<StyledLine> {
        if !self.line.is_empty() {
            self.newline();
        }
        if self.lines.is_empty() {
            self.lines.push(StyledLine {
                spans: self.opts.first_prefix.clone(),
            });
        }
        self.lines
    }
}
