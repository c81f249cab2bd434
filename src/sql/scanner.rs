//! Quote-aware character scanning over raw DDL text.
//!
//! Everything structural in the extractor (finding a table body, splitting
//! it on commas, bounding a CHECK or DEFAULT expression) goes through
//! [`Cursor`], a small state machine that tracks string literals and
//! parenthesis depth so that delimiters inside `'...'` or `"..."` are never
//! taken for structure.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanState {
    #[default]
    Normal,
    InSingleQuote,
    InDoubleQuote,
}

/// What a character meant to the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Open,
    Close,
    Comma,
    Semicolon,
    Whitespace,
    /// Any other character, including everything inside a literal.
    Other,
}

#[derive(Debug, Clone, Default)]
pub struct Cursor {
    state: ScanState,
    depth: i32,
    escaped: bool,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start already inside one open parenthesis.
    pub fn nested() -> Self {
        Self {
            depth: 1,
            ..Self::default()
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn in_literal(&self) -> bool {
        self.state != ScanState::Normal
    }

    pub fn feed(&mut self, ch: char) -> Event {
        match self.state {
            ScanState::Normal => match ch {
                '\'' => {
                    self.state = ScanState::InSingleQuote;
                    Event::Other
                }
                '"' => {
                    self.state = ScanState::InDoubleQuote;
                    Event::Other
                }
                '(' => {
                    self.depth += 1;
                    Event::Open
                }
                ')' => {
                    self.depth -= 1;
                    Event::Close
                }
                ',' => Event::Comma,
                ';' => Event::Semicolon,
                c if c.is_whitespace() => Event::Whitespace,
                _ => Event::Other,
            },
            ScanState::InSingleQuote | ScanState::InDoubleQuote => {
                let quote = if self.state == ScanState::InSingleQuote {
                    '\''
                } else {
                    '"'
                };
                if self.escaped {
                    self.escaped = false;
                } else if ch == '\\' {
                    self.escaped = true;
                } else if ch == quote {
                    self.state = ScanState::Normal;
                }
                Event::Other
            }
        }
    }
}

/// Remove `/* ... */` and `-- ...` comments, leaving string literals intact.
///
/// Block comments become a single space and line comments keep their
/// terminating newline so that surrounding words never fuse together.
pub fn strip_comments(sql: &str) -> String {
    let text = sql.replace("\r\n", "\n");
    let mut out = String::with_capacity(text.len());
    let mut cursor = Cursor::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if cursor.in_literal() {
            cursor.feed(c);
            out.push(c);
            continue;
        }
        let next = chars.peek().copied();
        match (c, next) {
            ('-', Some('-')) => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    prev = skipped;
                }
                out.push(' ');
            }
            _ => {
                cursor.feed(c);
                out.push(c);
            }
        }
    }

    out
}

/// Byte offset of the `)` closing a group whose body starts at `start`.
///
/// `start` is the offset just past the opening parenthesis. Returns `None`
/// when the text ends before depth returns to zero.
pub fn find_closing_paren(text: &str, start: usize) -> Option<usize> {
    let mut cursor = Cursor::nested();
    for (offset, c) in text.get(start..)?.char_indices() {
        if cursor.feed(c) == Event::Close && cursor.depth() == 0 {
            return Some(start + offset);
        }
    }
    None
}

/// Raw text of the balanced group opening at `open`, including both parens.
pub fn balanced_group(text: &str, open: usize) -> Option<&str> {
    if !text.get(open..)?.starts_with('(') {
        return None;
    }
    let close = find_closing_paren(text, open + 1)?;
    Some(&text[open..=close])
}

/// Split on commas at parenthesis depth zero, outside string literals.
///
/// Segments are returned untrimmed; a trailing blank segment is dropped.
pub fn split_top_level(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut cursor = Cursor::new();
    let mut start = 0;

    for (offset, c) in body.char_indices() {
        if cursor.feed(c) == Event::Comma && cursor.depth() == 0 {
            parts.push(&body[start..offset]);
            start = offset + 1;
        }
    }

    let tail = &body[start..];
    if !tail.trim().is_empty() {
        parts.push(tail);
    }
    parts
}

/// Offset of the `;` ending the statement that starts at `start`, or the
/// end of the text.
pub fn statement_end(text: &str, start: usize) -> usize {
    let mut cursor = Cursor::new();
    for (offset, c) in text[start..].char_indices() {
        if cursor.feed(c) == Event::Semicolon && cursor.depth() <= 0 {
            return start + offset;
        }
    }
    text.len()
}

/// Capture one expression starting at `start`: everything up to the first
/// whitespace or comma at depth zero outside a literal. Parenthesised parts
/// and quoted parts are taken whole.
///
/// Returns the captured text and the offset just past it.
pub fn capture_expression(text: &str, start: usize) -> (&str, usize) {
    let rest = &text[start..];
    let skipped = rest.len() - rest.trim_start().len();
    let begin = start + skipped;

    let mut cursor = Cursor::new();
    let mut end = text.len();
    for (offset, c) in text[begin..].char_indices() {
        let event = cursor.feed(c);
        if cursor.depth() < 0 {
            end = begin + offset;
            break;
        }
        if cursor.depth() == 0
            && !cursor.in_literal()
            && matches!(event, Event::Whitespace | Event::Comma)
        {
            end = begin + offset;
            break;
        }
    }

    (&text[begin..end], end)
}
