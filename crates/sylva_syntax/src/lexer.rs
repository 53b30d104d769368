//! Lexical analyzer for Sylva script text.
//!
//! Converts source text into [`Token`]s, skipping whitespace and `//` / `/* */`
//! comments. Errors are reported to the [`DiagnosticSink`] and produce
//! [`SylvaToken::Error`] tokens so the parser can keep going.

use crate::token::{lookup_directive, lookup_keyword, SylvaToken, Token};
use sylva_diagnostics::code::codes;
use sylva_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use sylva_source::{FileId, Span};

/// Lexes the given source text into a vector of tokens ending with [`SylvaToken::Eof`].
pub fn lex(source: &str, file: FileId, sink: &DiagnosticSink) -> Vec<Token> {
    let mut lexer = Lexer {
        source: source.as_bytes(),
        pos: 0,
        file,
        sink,
    };
    lexer.lex_all()
}

struct Lexer<'a> {
    source: &'a [u8],
    pos: usize,
    file: FileId,
    sink: &'a DiagnosticSink,
}

impl Lexer<'_> {
    fn lex_all(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            if self.pos >= self.source.len() {
                tokens.push(Token {
                    kind: SylvaToken::Eof,
                    span: Span::new(self.file, self.pos as u32, self.pos as u32),
                });
                break;
            }
            tokens.push(self.next_token());
        }
        tokens
    }

    fn peek(&self) -> u8 {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        self.source.get(self.pos + offset).copied().unwrap_or(0)
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(self.file, start as u32, self.pos as u32)
    }

    fn token(&self, kind: SylvaToken, start: usize) -> Token {
        Token {
            kind,
            span: self.span_from(start),
        }
    }

    fn error(&self, code: DiagnosticCode, msg: impl Into<String>, span: Span) {
        self.sink.emit(Diagnostic::error(code, msg, span));
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.pos < self.source.len() && self.source[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.peek() == b'/' && self.peek_at(1) == b'/' {
                while self.pos < self.source.len() && self.source[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }
            if self.peek() == b'/' && self.peek_at(1) == b'*' {
                let start = self.pos;
                self.pos += 2;
                loop {
                    if self.pos >= self.source.len() {
                        self.error(
                            codes::INVALID_TOKEN,
                            "unterminated block comment",
                            self.span_from(start),
                        );
                        break;
                    }
                    if self.source[self.pos] == b'*' && self.peek_at(1) == b'/' {
                        self.pos += 2;
                        break;
                    }
                    self.pos += 1;
                }
                continue;
            }
            break;
        }
    }

    fn next_token(&mut self) -> Token {
        let start = self.pos;
        let b = self.peek();

        if is_ident_start(b) {
            self.eat_ident_chars();
            let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap_or("");
            let kind = lookup_keyword(text).unwrap_or(SylvaToken::Identifier);
            return self.token(kind, start);
        }

        match b {
            b'#' => self.lex_directive(start),
            b'"' => self.lex_string(start),
            b'{' => self.single(SylvaToken::LeftBrace, start),
            b'}' => self.single(SylvaToken::RightBrace, start),
            b';' => self.single(SylvaToken::Semicolon, start),
            b',' => self.single(SylvaToken::Comma, start),
            b'.' => self.single(SylvaToken::Dot, start),
            _ => {
                // Consume a whole UTF-8 sequence so spans stay on char boundaries.
                self.pos += utf8_len(b);
                self.pos = self.pos.min(self.source.len());
                let span = self.span_from(start);
                let text = String::from_utf8_lossy(&self.source[start..self.pos]).into_owned();
                self.error(
                    codes::INVALID_TOKEN,
                    format!("unexpected character '{text}'"),
                    span,
                );
                self.token(SylvaToken::Error, start)
            }
        }
    }

    fn single(&mut self, kind: SylvaToken, start: usize) -> Token {
        self.pos += 1;
        self.token(kind, start)
    }

    fn eat_ident_chars(&mut self) {
        while self.pos < self.source.len() && is_ident_char(self.source[self.pos]) {
            self.pos += 1;
        }
    }

    fn lex_directive(&mut self, start: usize) -> Token {
        self.pos += 1;
        let name_start = self.pos;
        self.eat_ident_chars();
        let name = std::str::from_utf8(&self.source[name_start..self.pos]).unwrap_or("");
        match lookup_directive(name) {
            Some(kind) => self.token(kind, start),
            None => {
                self.error(
                    codes::UNKNOWN_DIRECTIVE,
                    format!("unknown directive '#{name}'"),
                    self.span_from(start),
                );
                self.token(SylvaToken::Error, start)
            }
        }
    }

    fn lex_string(&mut self, start: usize) -> Token {
        self.pos += 1;
        loop {
            match self.peek() {
                0 if self.pos >= self.source.len() => break,
                b'\n' => break,
                b'\\' => self.pos = (self.pos + 2).min(self.source.len()),
                b'"' => {
                    self.pos += 1;
                    return self.token(SylvaToken::StringLiteral, start);
                }
                _ => self.pos += 1,
            }
        }
        self.error(
            codes::INVALID_TOKEN,
            "unterminated string literal",
            self.span_from(start),
        );
        self.token(SylvaToken::Error, start)
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn utf8_len(lead: u8) -> usize {
    match lead {
        0xF0..=0xFF => 4,
        0xE0..=0xEF => 3,
        0xC0..=0xDF => 2,
        _ => 1,
    }
}

/// Returns the value of a string literal token's text, with quotes removed and
/// `\"` / `\\` / `\n` / `\t` escapes applied.
pub fn unescape_string(literal: &str) -> String {
    let inner = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(literal);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
