//! Comment stripping, balanced splitting and the definition tokenizer.

use std::iter::Peekable;
use std::str::CharIndices;

/// Remove `/* */`, `--` and `#` comments.
///
/// Quoted strings are not taken into account: a comment marker inside a
/// string literal is stripped like any other.
pub fn strip_comments(sql: &str) -> String {
    let sql = strip_block_comments(sql);
    let sql = strip_line_comments(&sql, "--");
    strip_line_comments(&sql, "#")
}

fn strip_block_comments(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut rest = sql;

    while let Some(start) = rest.find("/*") {
        let Some(len) = rest[start + 2..].find("*/") else {
            break;
        };
        out.push_str(&rest[..start]);
        rest = &rest[start + 2 + len + 2..];
    }

    out.push_str(rest);
    out
}

fn strip_line_comments(sql: &str, marker: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut rest = sql;

    while let Some(start) = rest.find(marker) {
        out.push_str(&rest[..start]);
        // keep the newline itself
        rest = match rest[start..].find('\n') {
            Some(nl) => &rest[start + nl..],
            None => "",
        };
    }

    out.push_str(rest);
    out
}

fn is_quote(c: char) -> bool {
    matches!(c, '\'' | '"' | '`')
}

/// Split `input` on `delimiter`, ignoring delimiters nested in parentheses
/// or quotes. Segments are trimmed and empty ones dropped.
pub fn split_top_level(input: &str, delimiter: char) -> Vec<String> {
    let mut items = Vec::new();
    let mut buffer = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in input.chars() {
        if let Some(q) = quote {
            buffer.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            c if is_quote(c) => {
                quote = Some(c);
                buffer.push(c);
            }
            '(' => {
                depth += 1;
                buffer.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                buffer.push(c);
            }
            c if c == delimiter && depth == 0 => {
                let item = buffer.trim();
                if !item.is_empty() {
                    items.push(item.to_string());
                }
                buffer.clear();
            }
            _ => buffer.push(c),
        }
    }

    let tail = buffer.trim();
    if !tail.is_empty() {
        items.push(tail.to_string());
    }

    items
}

/// Tokens of a single table-body definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Bare word: keyword, identifier, number.
    Word(String),
    /// Backtick or double-quoted identifier, quotes removed.
    Quoted(String),
    /// Single-quoted string literal, quotes removed.
    Str(String),
    LParen,
    RParen,
    Comma,
    Dot,
    Other(char),
}

/// A token and its byte range in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub start: usize,
    pub end: usize,
}

impl Spanned {
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(&self.token, Token::Word(w) if w.eq_ignore_ascii_case(keyword))
    }
}

pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn offset(&mut self) -> usize {
        self.chars.peek().map_or(self.input.len(), |&(i, _)| i)
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|&(_, c)| c.is_whitespace()).is_some() {}
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some((_, c)) = self
            .chars
            .next_if(|&(_, c)| c.is_alphanumeric() || c == '_' || c == '$')
        {
            word.push(c);
        }
        word
    }

    /// Read up to the closing `quote`. A doubled quote or a backslash
    /// escapes the next character. Unterminated text runs to the end.
    fn read_quoted(&mut self, quote: char) -> String {
        let mut s = String::new();
        while let Some((_, c)) = self.chars.next() {
            if c == quote {
                if self.chars.next_if(|&(_, n)| n == quote).is_some() {
                    s.push(quote);
                    continue;
                }
                break;
            }
            if c == '\\' {
                if let Some((_, escaped)) = self.chars.next() {
                    s.push(escaped);
                }
                continue;
            }
            s.push(c);
        }
        s
    }

    pub fn next_token(&mut self) -> Option<Spanned> {
        self.skip_whitespace();

        let &(start, c) = self.chars.peek()?;
        let token = match c {
            '(' | ')' | ',' | '.' => {
                self.chars.next();
                match c {
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    ',' => Token::Comma,
                    _ => Token::Dot,
                }
            }
            '`' | '"' => {
                self.chars.next();
                Token::Quoted(self.read_quoted(c))
            }
            '\'' => {
                self.chars.next();
                Token::Str(self.read_quoted(c))
            }
            c if c.is_alphanumeric() || c == '_' || c == '$' => Token::Word(self.read_word()),
            _ => {
                self.chars.next();
                Token::Other(c)
            }
        };

        let end = self.offset();
        Some(Spanned { token, start, end })
    }

    pub fn tokenize(mut self) -> Vec<Spanned> {
        let mut tokens = Vec::new();
        while let Some(tok) = self.next_token() {
            tokens.push(tok);
        }
        tokens
    }
}
