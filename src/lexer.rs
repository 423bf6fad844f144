//! Byte stream -> token sequence (spec.md §4.1).
//!
//! The lexer never recovers from a malformed token: an unterminated string
//! or block comment aborts immediately with the position of the opening
//! delimiter (spec.md §4.1, §7).

use codemap::{File, Span};
use peekmore::{PeekMore, PeekMoreIterator};
use std::str::CharIndices;

use crate::common::{CompareOp, QuoteKind};
use crate::error::{LessError, LessResult};
use crate::token::{Token, TokenKind};

pub struct Lexer<'a> {
    file: &'a File,
    source: &'a str,
    chars: PeekMoreIterator<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(file: &'a File) -> Lexer<'a> {
        let source = file.source();
        Lexer {
            file,
            source,
            chars: source.char_indices().peekmore(),
        }
    }

    pub fn tokenize(mut self) -> LessResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            match self.next_token()? {
                Some(tok) => {
                    let is_eof = tok.kind == TokenKind::Eof;
                    tokens.push(tok);
                    if is_eof {
                        break;
                    }
                }
                None => continue,
            }
        }
        Ok(tokens)
    }

    fn span(&self, lo: usize, hi: usize) -> Span {
        self.file.span.subspan(lo as u64, hi as u64)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn peek_nth_char(&mut self, n: usize) -> Option<char> {
        self.chars.peek_nth(n).map(|&(_, c)| c)
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        self.chars.next()
    }

    /// Consumes exactly one token, or `None` if whitespace/EOF-adjacent
    /// bookkeeping produced nothing visible (caller loops again).
    fn next_token(&mut self) -> LessResult<Option<Token>> {
        let (start, c) = match self.bump() {
            Some(pair) => pair,
            None => {
                let eof_span = self.span(self.source.len(), self.source.len());
                return Ok(Some(Token::new(TokenKind::Eof, "", eof_span)));
            }
        };

        match c {
            ' ' | '\t' | '\r' => {
                self.skip_whitespace_non_newline();
                Ok(None)
            }
            '\n' => {
                self.skip_whitespace();
                Ok(Some(Token::new(TokenKind::Newline, "\n", self.span(start, start + 1))))
            }
            '/' if self.peek_char() == Some('/') => {
                self.bump();
                let content_start = self.pos();
                while let Some(ch) = self.peek_char() {
                    if ch == '\n' {
                        break;
                    }
                    self.bump();
                }
                let content_end = self.pos();
                let lexeme = self.source[content_start..content_end].to_string();
                Ok(Some(Token::new(
                    TokenKind::Comment { is_block: false },
                    lexeme,
                    self.span(start, content_end),
                )))
            }
            '/' if self.peek_char() == Some('*') => {
                self.bump();
                let content_start = self.pos();
                loop {
                    match self.bump() {
                        Some((_, '*')) if self.peek_char() == Some('/') => {
                            let content_end = self.pos() - 1;
                            self.bump();
                            let lexeme = self.source[content_start..content_end].to_string();
                            return Ok(Some(Token::new(
                                TokenKind::Comment { is_block: true },
                                lexeme,
                                self.span(start, self.pos()),
                            )));
                        }
                        Some(_) => continue,
                        None => {
                            return Err(LessError::lex(
                                "unterminated block comment",
                                self.span(start, start + 2),
                            ))
                        }
                    }
                }
            }
            '/' => Ok(Some(Token::new(TokenKind::Symbol('/'), "/", self.span(start, start + 1)))),

            '"' => self.read_string(start, QuoteKind::Double),
            '\'' => self.read_string(start, QuoteKind::Single),

            '@' if self.peek_char() == Some('{') => {
                self.bump();
                Ok(Some(Token::new(
                    TokenKind::InterpolationOpen,
                    "@{",
                    self.span(start, self.pos()),
                )))
            }
            '@' => {
                let name_start = self.pos();
                self.read_ident_chars();
                let name_end = self.pos();
                let lexeme = self.source[name_start..name_end].to_string();
                if lexeme.is_empty() {
                    return Err(LessError::lex("expected identifier after '@'", self.span(start, self.pos())));
                }
                Ok(Some(Token::new(TokenKind::AtKeyword, lexeme, self.span(start, name_end))))
            }

            '#' if self.peek_char() == Some('{') => {
                self.bump();
                Ok(Some(Token::new(
                    TokenKind::InterpolationOpen,
                    "#{",
                    self.span(start, self.pos()),
                )))
            }
            '#' => {
                if let Some(len) = self.peek_hex_run() {
                    let hex_start = self.pos();
                    for _ in 0..len {
                        self.bump();
                    }
                    let hex_end = self.pos();
                    let lexeme = self.source[hex_start..hex_end].to_string();
                    Ok(Some(Token::new(TokenKind::Color, lexeme, self.span(start, hex_end))))
                } else {
                    Ok(Some(Token::new(TokenKind::Symbol('#'), "#", self.span(start, start + 1))))
                }
            }

            '-' if matches!(self.peek_char(), Some(d) if d.is_ascii_digit()) => {
                self.read_number(start, true)
            }
            '.' if matches!(self.peek_char(), Some(d) if d.is_ascii_digit()) => {
                self.read_number(start, false)
            }
            d if d.is_ascii_digit() => self.read_number_from(start),

            c if c == '_' || c.is_alphabetic() || c == '\\' => self.read_ident(start),

            '=' => Ok(Some(Token::new(
                TokenKind::Comparison(CompareOp::Eq),
                "=",
                self.span(start, start + 1),
            ))),
            '!' if self.peek_char() == Some('=') => {
                self.bump();
                Ok(Some(Token::new(
                    TokenKind::Comparison(CompareOp::Ne),
                    "!=",
                    self.span(start, self.pos()),
                )))
            }
            '<' if self.peek_char() == Some('=') => {
                self.bump();
                Ok(Some(Token::new(
                    TokenKind::Comparison(CompareOp::Le),
                    "<=",
                    self.span(start, self.pos()),
                )))
            }
            '<' => Ok(Some(Token::new(
                TokenKind::Comparison(CompareOp::Lt),
                "<",
                self.span(start, start + 1),
            ))),
            '>' if self.peek_char() == Some('=') => {
                self.bump();
                Ok(Some(Token::new(
                    TokenKind::Comparison(CompareOp::Ge),
                    ">=",
                    self.span(start, self.pos()),
                )))
            }

            c @ ('{' | '}' | '(' | ')' | ':' | ';' | ',' | '.' | '&' | '>' | '+' | '~' | '*'
            | '!' | '[' | ']' | '%') => Ok(Some(Token::new(
                TokenKind::Symbol(c),
                c.to_string(),
                self.span(start, start + 1),
            ))),

            other => Ok(Some(Token::new(
                TokenKind::Symbol(other),
                other.to_string(),
                self.span(start, start + 1),
            ))),
        }
    }

    fn pos(&mut self) -> usize {
        match self.chars.peek() {
            Some(&(idx, _)) => idx,
            None => self.source.len(),
        }
    }

    fn skip_whitespace_non_newline(&mut self) {
        while let Some(c) = self.peek_char() {
            if c == ' ' || c == '\t' || c == '\r' {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn read_string(&mut self, start: usize, quote: QuoteKind) -> LessResult<Option<Token>> {
        let quote_char = quote.quote_char().unwrap();
        let content_start = self.pos();
        let mut buf = String::new();
        loop {
            match self.bump() {
                Some((_, c)) if c == quote_char => {
                    return Ok(Some(Token::new(
                        TokenKind::Str(quote),
                        buf,
                        self.span(start, self.pos()),
                    )));
                }
                Some((_, '\\')) => {
                    buf.push('\\');
                    if let Some((_, next)) = self.bump() {
                        buf.push(next);
                    }
                }
                Some((_, '\n')) => {
                    return Err(LessError::lex(
                        "unterminated string (newline in string literal)",
                        self.span(start, self.pos()),
                    ));
                }
                Some((_, c)) => buf.push(c),
                None => {
                    return Err(LessError::lex(
                        "unterminated string",
                        self.span(start, content_start),
                    ));
                }
            }
        }
    }

    fn read_ident_chars(&mut self) -> String {
        let start = self.pos();
        loop {
            match self.peek_char() {
                Some(c) if c.is_alphanumeric() || c == '_' || c == '-' => {
                    self.bump();
                }
                Some('\\') => {
                    self.bump();
                    self.bump();
                }
                _ => break,
            }
        }
        let end = self.pos();
        self.source[start..end].to_string()
    }

    fn read_ident(&mut self, start: usize) -> LessResult<Option<Token>> {
        while let Some(c) = self.peek_char() {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                self.bump();
            } else if c == '\\' {
                self.bump();
                self.bump();
            } else {
                break;
            }
        }
        let end = self.pos();
        let lexeme = self.source[start..end].to_string();
        Ok(Some(Token::new(TokenKind::Ident, lexeme, self.span(start, end))))
    }

    fn read_number_from(&mut self, start: usize) -> LessResult<Option<Token>> {
        self.read_number(start, false)
    }

    /// `had_sign` indicates the leading `-` was already consumed by the
    /// caller and should be included in the numeric lexeme.
    fn read_number(&mut self, start: usize, _had_sign: bool) -> LessResult<Option<Token>> {
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.bump();
            } else {
                break;
            }
        }
        if self.peek_char() == Some('.') && matches!(self.peek_nth_char(1), Some(d) if d.is_ascii_digit())
        {
            self.bump();
            while let Some(c) = self.peek_char() {
                if c.is_ascii_digit() {
                    self.bump();
                } else {
                    break;
                }
            }
        }
        let numeric_end = self.pos();

        if self.peek_char() == Some('%') {
            self.bump();
            let end = self.pos();
            let lexeme = self.source[start..end].to_string();
            return Ok(Some(Token::new(TokenKind::Percentage, lexeme, self.span(start, end))));
        }

        if matches!(self.peek_char(), Some(c) if c.is_alphabetic()) {
            while let Some(c) = self.peek_char() {
                if c.is_alphabetic() {
                    self.bump();
                } else {
                    break;
                }
            }
            let end = self.pos();
            let lexeme = self.source[start..end].to_string();
            return Ok(Some(Token::new(TokenKind::Dimension, lexeme, self.span(start, end))));
        }

        let lexeme = self.source[start..numeric_end].to_string();
        Ok(Some(Token::new(TokenKind::Number, lexeme, self.span(start, numeric_end))))
    }

    /// Looks ahead (without consuming) for a run of 3, 4, 6, or 8 hex digits
    /// that is *not* itself followed by an identifier-continuation
    /// character -- the rule spec.md §4.1 gives for disambiguating a color
    /// literal from `#` as an id-selector marker.
    fn peek_hex_run(&mut self) -> Option<usize> {
        let mut n = 0;
        while matches!(self.peek_nth_char(n), Some(c) if c.is_ascii_hexdigit()) {
            n += 1;
            if n > 8 {
                break;
            }
        }
        if !matches!(n, 3 | 4 | 6 | 8) {
            return None;
        }
        match self.peek_nth_char(n) {
            Some(c) if c.is_alphanumeric() || c == '_' || c == '-' => None,
            _ => Some(n),
        }
    }
}

pub fn lex(file: &File) -> LessResult<Vec<Token>> {
    Lexer::new(file).tokenize()
}
