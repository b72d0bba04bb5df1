//! Lexer for BTOR2 text.
//!
//! BTOR2 is line oriented: every non-blank line is one instruction, and a
//! `;` starts a comment that runs to the end of the line. The lexer splits
//! each line into whitespace-delimited words with their source spans.

use crate::token::{Line, Span, Token};

/// Lexer for BTOR2 source text.
pub struct Lexer<'a> {
    source: &'a str,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source text.
    pub fn new(source: &'a str) -> Self {
        Self { source }
    }

    /// Split the source into lines of tokens, skipping blank and comment-only lines.
    pub fn lines(&self) -> Vec<Line<'a>> {
        let mut lines = Vec::new();
        let mut offset = 0;
        for (idx, raw) in self.source.split_inclusive('\n').enumerate() {
            let number = idx as u32 + 1;
            let tokens = tokenize_line(raw, offset, number);
            if !tokens.is_empty() {
                lines.push(Line { number, tokens });
            }
            offset += raw.len();
        }
        lines
    }
}

fn tokenize_line(raw: &str, offset: usize, line: u32) -> Vec<Token<'_>> {
    let code = match raw.find(';') {
        Some(pos) => &raw[..pos],
        None => raw,
    };

    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    for (pos, c) in code.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                tokens.push(make_token(code, s, pos, offset, line));
            }
        } else if start.is_none() {
            start = Some(pos);
        }
    }
    if let Some(s) = start {
        tokens.push(make_token(code, s, code.len(), offset, line));
    }
    tokens
}

fn make_token(code: &str, start: usize, end: usize, offset: usize, line: u32) -> Token<'_> {
    let column = code[..start].chars().count() as u32 + 1;
    Token::new(
        &code[start..end],
        Span::new(offset + start, offset + end, line, column),
    )
}
