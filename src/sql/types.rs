//! Column type recognition.
//!
//! Types are matched against an ordered vocabulary of word sequences so that
//! multi-word names (`DOUBLE PRECISION`, `TIMESTAMP WITH TIME ZONE`) are taken
//! whole before the generic single-word fallback gets a chance to split them.

/// One vocabulary entry: the words to match and the name they normalise to.
struct TypeRule {
    words: &'static [&'static str],
    name: &'static str,
}

const fn rule(words: &'static [&'static str], name: &'static str) -> TypeRule {
    TypeRule { words, name }
}

/// Multi-word types first; longer sequences before their prefixes.
const VOCABULARY: &[TypeRule] = &[
    rule(&["TIMESTAMP", "WITHOUT", "TIME", "ZONE"], "TIMESTAMP WITHOUT TIME ZONE"),
    rule(&["TIMESTAMP", "WITH", "TIME", "ZONE"], "TIMESTAMP WITH TIME ZONE"),
    rule(&["TIME", "WITHOUT", "TIME", "ZONE"], "TIME WITHOUT TIME ZONE"),
    rule(&["TIME", "WITH", "TIME", "ZONE"], "TIME WITH TIME ZONE"),
    rule(&["DOUBLE", "PRECISION"], "DOUBLE PRECISION"),
    rule(&["CHARACTER", "VARYING"], "CHARACTER VARYING"),
    rule(&["NATIONAL", "CHARACTER", "VARYING"], "NATIONAL CHARACTER VARYING"),
    rule(&["NATIONAL", "CHARACTER"], "NATIONAL CHARACTER"),
    rule(&["BIT", "VARYING"], "BIT VARYING"),
    rule(&["LONG", "VARCHAR"], "LONG VARCHAR"),
    rule(&["BIGSERIAL"], "BIGSERIAL"),
    rule(&["SMALLSERIAL"], "SMALLSERIAL"),
    rule(&["SERIAL"], "SERIAL"),
    rule(&["SERIAL2"], "SERIAL2"),
    rule(&["SERIAL4"], "SERIAL4"),
    rule(&["SERIAL8"], "SERIAL8"),
    rule(&["BIGINT"], "BIGINT"),
    rule(&["SMALLINT"], "SMALLINT"),
    rule(&["TINYINT"], "TINYINT"),
    rule(&["MEDIUMINT"], "MEDIUMINT"),
    rule(&["INTEGER"], "INTEGER"),
    rule(&["INT"], "INT"),
    rule(&["INT2"], "INT2"),
    rule(&["INT4"], "INT4"),
    rule(&["INT8"], "INT8"),
    rule(&["REAL"], "REAL"),
    rule(&["FLOAT"], "FLOAT"),
    rule(&["NUMERIC"], "NUMERIC"),
    rule(&["DECIMAL"], "DECIMAL"),
    rule(&["MONEY"], "MONEY"),
    rule(&["BOOLEAN"], "BOOLEAN"),
    rule(&["BOOL"], "BOOL"),
    rule(&["BIT"], "BIT"),
    rule(&["VARBIT"], "VARBIT"),
    rule(&["UUID"], "UUID"),
    rule(&["TEXT"], "TEXT"),
    rule(&["CITEXT"], "CITEXT"),
    rule(&["VARCHAR"], "VARCHAR"),
    rule(&["NVARCHAR"], "NVARCHAR"),
    rule(&["CHARACTER"], "CHARACTER"),
    rule(&["CHAR"], "CHAR"),
    rule(&["NCHAR"], "NCHAR"),
    rule(&["BYTEA"], "BYTEA"),
    rule(&["BLOB"], "BLOB"),
    rule(&["CLOB"], "CLOB"),
    rule(&["TINYTEXT"], "TINYTEXT"),
    rule(&["MEDIUMTEXT"], "MEDIUMTEXT"),
    rule(&["LONGTEXT"], "LONGTEXT"),
    rule(&["DATETIME"], "DATETIME"),
    rule(&["DATE"], "DATE"),
    rule(&["TIMESTAMPTZ"], "TIMESTAMPTZ"),
    rule(&["TIMESTAMP"], "TIMESTAMP"),
    rule(&["TIMETZ"], "TIMETZ"),
    rule(&["TIME"], "TIME"),
    rule(&["INTERVAL"], "INTERVAL"),
    rule(&["INET"], "INET"),
    rule(&["CIDR"], "CIDR"),
    rule(&["MACADDR"], "MACADDR"),
    rule(&["JSONB"], "JSONB"),
    rule(&["JSON"], "JSON"),
    rule(&["XML"], "XML"),
    rule(&["POINT"], "POINT"),
    rule(&["LINE"], "LINE"),
    rule(&["LSEG"], "LSEG"),
    rule(&["BOX"], "BOX"),
    rule(&["PATH"], "PATH"),
    rule(&["POLYGON"], "POLYGON"),
    rule(&["CIRCLE"], "CIRCLE"),
    rule(&["TSQUERY"], "TSQUERY"),
    rule(&["TSVECTOR"], "TSVECTOR"),
    rule(&["ENUM"], "ENUM"),
    rule(&["SET"], "SET"),
    rule(&["GEOMETRY"], "GEOMETRY"),
    rule(&["GEOGRAPHY"], "GEOGRAPHY"),
    rule(&["HSTORE"], "HSTORE"),
    rule(&["ARRAY"], "ARRAY"),
    rule(&["OID"], "OID"),
    rule(&["REGCLASS"], "REGCLASS"),
];

/// Words that begin a column modifier rather than a type.
const MODIFIER_WORDS: &[&str] = &[
    "PRIMARY",
    "NOT",
    "NULL",
    "UNIQUE",
    "DEFAULT",
    "CHECK",
    "REFERENCES",
    "CONSTRAINT",
    "GENERATED",
    "AUTO_INCREMENT",
    "AUTOINCREMENT",
    "IDENTITY",
];

/// A recognised column type and how much text it consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedType {
    /// Uppercased type string with size and array modifiers.
    pub name: String,
    /// Byte length of the input consumed, including leading whitespace.
    pub consumed: usize,
}

impl MatchedType {
    /// SERIAL-family types imply an auto-increment, not-null column.
    pub fn is_serial(&self) -> bool {
        self.name.contains("SERIAL")
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn skip_ws(text: &str, pos: usize) -> usize {
    let rest = &text[pos..];
    pos + (rest.len() - rest.trim_start().len())
}

/// Match `word` at `pos` (case-insensitive, whole word). Returns the end offset.
fn match_word(text: &str, pos: usize, word: &str) -> Option<usize> {
    let end = pos + word.len();
    let candidate = text.get(pos..end)?;
    if !candidate.eq_ignore_ascii_case(word) {
        return None;
    }
    match text[end..].chars().next() {
        Some(c) if is_word_char(c) => None,
        _ => Some(end),
    }
}

fn match_rule(text: &str, start: usize, rule: &TypeRule) -> Option<usize> {
    let mut pos = start;
    for (i, word) in rule.words.iter().enumerate() {
        if i > 0 {
            let next = skip_ws(text, pos);
            if next == pos {
                return None;
            }
            pos = next;
        }
        pos = match_word(text, pos, word)?;
    }
    Some(pos)
}

/// Generic `word` or `schema.word` fallback.
fn match_generic_word(text: &str, start: usize) -> Option<usize> {
    let mut end = start;
    let mut chars = text[start..].char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if is_word_char(c) {
            end = start + i + c.len_utf8();
        } else if c == '.' && end > start && chars.peek().is_some_and(|&(_, n)| is_word_char(n)) {
            end = start + i + 1;
        } else {
            break;
        }
    }
    (end > start).then_some(end)
}

/// Parenthesised arguments directly after a type name, e.g. `(10, 2)`.
fn match_args(text: &str, pos: usize) -> Option<(&str, usize)> {
    let open = skip_ws(text, pos);
    if !text[open..].starts_with('(') {
        return None;
    }
    let close = super::scanner::find_closing_paren(text, open + 1)?;
    Some((&text[open..=close], close + 1))
}

/// Array suffixes: `[]`, `[3]`, repeated.
fn match_array_suffixes(text: &str, mut pos: usize, out: &mut String) -> usize {
    loop {
        let open = skip_ws(text, pos);
        if !text[open..].starts_with('[') {
            return pos;
        }
        let Some(close_rel) = text[open..].find(']') else {
            return pos;
        };
        let inner = text[open + 1..open + close_rel].trim();
        if !inner.chars().all(|c| c.is_ascii_digit()) {
            return pos;
        }
        out.push('[');
        out.push_str(inner);
        out.push(']');
        pos = open + close_rel + 1;
    }
}

/// Recognise the column type at the start of `text`.
///
/// Tries the vocabulary in order, then a generic `word(args)?[]*`, then
/// falls back to the next whitespace-delimited token. Returns `None` when
/// the text is empty or starts with a modifier keyword.
pub fn match_type(text: &str) -> Option<MatchedType> {
    let start = skip_ws(text, 0);
    if start == text.len() {
        return None;
    }

    let matched = VOCABULARY
        .iter()
        .find_map(|rule| match_rule(text, start, rule).map(|end| (rule.name.to_string(), end)))
        .or_else(|| {
            match_generic_word(text, start).map(|end| (text[start..end].to_ascii_uppercase(), end))
        });

    let Some((base, end)) = matched else {
        let token_end = text[start..]
            .find(char::is_whitespace)
            .map_or(text.len(), |i| start + i);
        return Some(MatchedType {
            name: text[start..token_end].to_uppercase(),
            consumed: token_end,
        });
    };

    if MODIFIER_WORDS.iter().any(|w| base.eq_ignore_ascii_case(w)) {
        return None;
    }

    let mut name = base;
    let mut end = end;
    if let Some((args, after)) = match_args(text, end) {
        name.push_str(&args.to_uppercase());
        end = after;
    }
    end = match_array_suffixes(text, end, &mut name);

    Some(MatchedType {
        name,
        consumed: end,
    })
}
