//! SQL lexer producing spanned tokens over comment-free DDL text.

use std::iter::Peekable;
use std::str::CharIndices;

/// SQL token kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Keywords
    Create,
    Alter,
    Add,
    Table,
    Only,
    If,
    Not,
    Exists,
    Null,
    Primary,
    Key,
    Foreign,
    References,
    Unique,
    Default,
    Check,
    Constraint,
    Index,
    On,
    Delete,
    Update,
    Generated,
    Identity,
    AutoIncrement,

    // Identifiers and literals
    Ident(String),
    Str(String),
    Num(String),

    // Symbols
    LParen,
    RParen,
    Comma,
    Semicolon,
    Dot,

    Eof,
}

/// A token and the byte range it covers in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    /// Identifier value, or the keyword spelled as written.
    pub fn word<'s>(&'s self, src: &'s str) -> Option<&'s str> {
        match &self.kind {
            TokenKind::Ident(s) => Some(s),
            TokenKind::Str(_)
            | TokenKind::Num(_)
            | TokenKind::LParen
            | TokenKind::RParen
            | TokenKind::Comma
            | TokenKind::Semicolon
            | TokenKind::Dot
            | TokenKind::Eof => None,
            _ => src.get(self.start..self.end),
        }
    }

    /// True for an unquoted or quoted identifier equal to `word`, ignoring case.
    pub fn is_word(&self, word: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(s) if s.eq_ignore_ascii_case(word))
    }
}

/// SQL lexer.
pub struct Lexer<'a> {
    src: &'a str,
    chars: Peekable<CharIndices<'a>>,
    current: Option<(usize, char)>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        let mut chars = src.char_indices().peekable();
        let current = chars.next();
        Self {
            src,
            chars,
            current,
        }
    }

    fn advance(&mut self) {
        self.current = self.chars.next();
    }

    fn current_char(&self) -> Option<char> {
        self.current.map(|(_, c)| c)
    }

    fn offset(&self) -> usize {
        self.current.map_or(self.src.len(), |(i, _)| i)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn read_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.current_char() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                ident.push(c);
                self.advance();
            } else {
                break;
            }
        }
        ident
    }

    fn read_quoted_identifier(&mut self, close: char) -> String {
        self.advance(); // skip opening quote
        let mut ident = String::new();
        while let Some(c) = self.current_char() {
            if c == close {
                // Doubled quote is an escaped quote
                if self.peek() == Some(close) && close != ']' {
                    ident.push(c);
                    self.advance();
                    self.advance();
                } else {
                    self.advance();
                    break;
                }
            } else {
                ident.push(c);
                self.advance();
            }
        }
        ident
    }

    fn read_string(&mut self) -> String {
        self.advance(); // skip opening quote
        let mut s = String::new();
        while let Some(c) = self.current_char() {
            if c == '\'' {
                if self.peek() == Some('\'') {
                    s.push(c);
                    self.advance();
                    self.advance();
                } else {
                    self.advance();
                    break;
                }
            } else if c == '\\' {
                self.advance();
                if let Some(escaped) = self.current_char() {
                    s.push(escaped);
                    self.advance();
                }
            } else {
                s.push(c);
                self.advance();
            }
        }
        s
    }

    fn read_number(&mut self) -> String {
        let mut num = String::new();
        let mut has_dot = false;

        if self.current_char() == Some('-') {
            num.push('-');
            self.advance();
        }

        while let Some(c) = self.current_char() {
            if c.is_ascii_digit() {
                num.push(c);
                self.advance();
            } else if c == '.' && !has_dot {
                has_dot = true;
                num.push(c);
                self.advance();
            } else {
                break;
            }
        }
        num
    }

    fn keyword_or_ident(s: &str) -> TokenKind {
        match s.to_ascii_uppercase().as_str() {
            "CREATE" => TokenKind::Create,
            "ALTER" => TokenKind::Alter,
            "ADD" => TokenKind::Add,
            "TABLE" => TokenKind::Table,
            "ONLY" => TokenKind::Only,
            "IF" => TokenKind::If,
            "NOT" => TokenKind::Not,
            "EXISTS" => TokenKind::Exists,
            "NULL" => TokenKind::Null,
            "PRIMARY" => TokenKind::Primary,
            "KEY" => TokenKind::Key,
            "FOREIGN" => TokenKind::Foreign,
            "REFERENCES" => TokenKind::References,
            "UNIQUE" => TokenKind::Unique,
            "DEFAULT" => TokenKind::Default,
            "CHECK" => TokenKind::Check,
            "CONSTRAINT" => TokenKind::Constraint,
            "INDEX" => TokenKind::Index,
            "ON" => TokenKind::On,
            "DELETE" => TokenKind::Delete,
            "UPDATE" => TokenKind::Update,
            "GENERATED" => TokenKind::Generated,
            "IDENTITY" => TokenKind::Identity,
            "AUTO_INCREMENT" | "AUTOINCREMENT" => TokenKind::AutoIncrement,
            _ => TokenKind::Ident(s.to_string()),
        }
    }

    fn starts_token(&mut self, c: char) -> bool {
        match c {
            '(' | ')' | ',' | ';' | '.' | '"' | '`' | '[' | '\'' | '_' => true,
            '-' => self.peek().is_some_and(|n| n.is_ascii_digit()),
            c => c.is_alphanumeric(),
        }
    }

    /// Skip whitespace and operator characters, which carry no structure here.
    fn skip_trivia(&mut self) {
        while let Some(c) = self.current_char() {
            if c.is_whitespace() || !self.starts_token(c) {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn next_kind(&mut self) -> TokenKind {
        match self.current_char() {
            None => TokenKind::Eof,
            Some('(') => {
                self.advance();
                TokenKind::LParen
            }
            Some(')') => {
                self.advance();
                TokenKind::RParen
            }
            Some(',') => {
                self.advance();
                TokenKind::Comma
            }
            Some(';') => {
                self.advance();
                TokenKind::Semicolon
            }
            Some('.') => {
                self.advance();
                TokenKind::Dot
            }
            Some('"') => TokenKind::Ident(self.read_quoted_identifier('"')),
            Some('`') => TokenKind::Ident(self.read_quoted_identifier('`')),
            // SQL Server style [identifier]
            Some('[') => TokenKind::Ident(self.read_quoted_identifier(']')),
            Some('\'') => TokenKind::Str(self.read_string()),
            Some(c) if c == '-' || c.is_ascii_digit() => TokenKind::Num(self.read_number()),
            Some(_) => {
                let ident = self.read_identifier();
                Self::keyword_or_ident(&ident)
            }
        }
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_trivia();
        let start = self.offset();
        let kind = self.next_kind();
        Token {
            kind,
            start,
            end: self.offset(),
        }
    }

    /// Collect all tokens, ending with `Eof`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }
}

pub fn tokenize(src: &str) -> Vec<Token> {
    Lexer::new(src).tokenize()
}
