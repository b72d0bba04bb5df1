//! Tokens and source span tracking for the BTOR2 lexer.

use std::fmt;

/// A span in the source text, tracking byte offsets and line/column.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Start byte offset (inclusive).
    pub start: usize,
    /// End byte offset (exclusive).
    pub end: usize,
    /// Line number (1-indexed).
    pub line: u32,
    /// Column number (1-indexed, in characters not bytes).
    pub column: u32,
}

impl Span {
    /// Create a new span.
    pub fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Create a dummy span for generated instructions.
    pub fn dummy() -> Self {
        Self::default()
    }

    /// Merge two spans into one that covers both.
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: self.line.min(other.line),
            column: if self.line <= other.line {
                self.column
            } else {
                other.column
            },
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A whitespace-delimited word on a BTOR2 line.
#[derive(Clone, Debug, PartialEq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub span: Span,
}

impl<'a> Token<'a> {
    pub fn new(text: &'a str, span: Span) -> Self {
        Self { text, span }
    }
}

/// All tokens of one non-empty source line, comments stripped.
#[derive(Clone, Debug)]
pub struct Line<'a> {
    /// Line number (1-indexed).
    pub number: u32,
    pub tokens: Vec<Token<'a>>,
}

impl Line<'_> {
    /// Span covering the whole line.
    pub fn span(&self) -> Span {
        match (self.tokens.first(), self.tokens.last()) {
            (Some(first), Some(last)) => first.span.merge(last.span),
            _ => Span::dummy(),
        }
    }

    /// Span just past the last token, used for "missing argument" errors.
    pub fn end_span(&self) -> Span {
        match self.tokens.last() {
            Some(last) => Span::new(
                last.span.end,
                last.span.end,
                self.number,
                last.span.column + last.text.chars().count() as u32,
            ),
            None => Span::dummy(),
        }
    }
}
