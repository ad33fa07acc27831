// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Minimal SQL tokenizer.
//!
//! Only distinguishes what classification needs: bare words, quoted
//! identifiers, string literals, statement terminators, and single-character
//! symbols. Comments and whitespace are dropped. Anything inside a literal,
//! quoted identifier, or comment can never look like a keyword or a `;`.

/// A lexical token borrowed from the input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// Keyword, bare identifier, or number.
    Word(&'a str),
    /// `"ident"`, `` `ident` `` or `[ident]`, without the quotes.
    QuotedIdent(&'a str),
    /// `'...'` string literal. Contents are irrelevant to classification.
    Literal,
    /// `;`
    Terminator,
    /// Any other single character: `(`, `)`, `,`, `.`, `*`, `=`, ...
    Symbol(char),
}

impl<'a> Token<'a> {
    /// True if this is a bare word equal to `keyword`, ignoring ASCII case.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self, Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }

    /// The identifier text for bare words and quoted identifiers.
    pub fn ident(&self) -> Option<&'a str> {
        match *self {
            Token::Word(w) | Token::QuotedIdent(w) => Some(w),
            _ => None,
        }
    }
}

/// Tokenize `sql`. Unterminated comments and quotes swallow the rest of the input.
pub fn tokenize(sql: &str) -> Vec<Token<'_>> {
    let bytes = sql.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b if b.is_ascii_whitespace() => i += 1,
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                i = find_byte(bytes, i + 2, b'\n').map_or(bytes.len(), |p| p + 1);
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = find_seq(bytes, i + 2, b"*/").map_or(bytes.len(), |p| p + 2);
            }
            b'\'' => {
                i = end_of_quoted(bytes, i + 1, b'\'');
                tokens.push(Token::Literal);
            }
            b'"' | b'`' => {
                let end = end_of_quoted(bytes, i + 1, b);
                let inner_end = if end > i + 1 && bytes[end - 1] == b { end - 1 } else { end };
                tokens.push(Token::QuotedIdent(&sql[i + 1..inner_end]));
                i = end;
            }
            b'[' => {
                let close = find_byte(bytes, i + 1, b']');
                let inner_end = close.unwrap_or(bytes.len());
                tokens.push(Token::QuotedIdent(&sql[i + 1..inner_end]));
                i = close.map_or(bytes.len(), |p| p + 1);
            }
            b';' => {
                tokens.push(Token::Terminator);
                i += 1;
            }
            b if is_word_byte(b) => {
                let start = i;
                while i < bytes.len() && is_word_byte(bytes[i]) {
                    i += 1;
                }
                tokens.push(Token::Word(&sql[start..i]));
            }
            _ => {
                tokens.push(Token::Symbol(b as char));
                i += 1;
            }
        }
    }

    tokens
}

/// Splits tokens at terminators, dropping empty statements.
pub fn split_statements<'t, 'a>(tokens: &'t [Token<'a>]) -> Vec<&'t [Token<'a>]> {
    tokens
        .split(|t| *t == Token::Terminator)
        .filter(|segment| !segment.is_empty())
        .collect()
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes[from.min(bytes.len())..]
        .iter()
        .position(|&b| b == needle)
        .map(|p| p + from)
}

fn find_seq(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    let from = from.min(bytes.len());
    bytes[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

/// Returns the index just past the closing quote, honoring doubled-quote escapes.
fn end_of_quoted(bytes: &[u8], mut i: usize, quote: u8) -> usize {
    while i < bytes.len() {
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    bytes.len()
}
