//! DDL extraction: CREATE TABLE bodies and ALTER TABLE ... ADD CONSTRAINT.

use std::collections::HashSet;

use tracing::{debug, info};

use super::lexer::{Token, TokenKind, tokenize};
use super::scanner::{
    balanced_group, capture_expression, find_closing_paren, split_top_level, statement_end,
    strip_comments,
};
use super::types::match_type;
use crate::model::{Column, Constraint, ForeignKeyRef, Relationship, Schema, Table};

/// Column referenced when `REFERENCES table` names no column list.
const IMPLICIT_REFERENCED_COLUMN: &str = "id";

/// Extract tables and relationships from free-form DDL text.
///
/// Best effort: fragments that cannot be understood are skipped, never
/// reported. Empty or unrecognised input yields an empty schema.
pub fn extract(sql: &str) -> Schema {
    let cleaned = strip_comments(sql);
    let mut parser = Parser::new(&cleaned);

    let mut tables: Vec<Table> = Vec::new();
    let mut relationships = Vec::new();
    let mut alters = Vec::new();

    while !parser.at_eof() {
        match parser.kind() {
            TokenKind::Create => {
                if let Some((table, table_relationships)) = parser.parse_create_table() {
                    if tables.iter().any(|t| t.name.eq_ignore_ascii_case(&table.name)) {
                        debug!(table = %table.name, "skipping duplicate CREATE TABLE");
                    } else {
                        tables.push(table);
                        relationships.extend(table_relationships);
                    }
                }
            }
            TokenKind::Alter => {
                if let Some(alter) = parser.parse_alter_table() {
                    alters.push(alter);
                }
            }
            _ => parser.advance(),
        }
    }

    // Out-of-body constraints apply once every table exists
    for alter in alters {
        let mut p = Parser::new(alter.body);
        let Some(constraint) = p.parse_table_constraint() else {
            debug!(table = %alter.table, "skipping unrecognised ALTER TABLE clause");
            continue;
        };
        let table = tables
            .iter_mut()
            .find(|t| t.name.eq_ignore_ascii_case(&alter.table));
        if table.is_none() {
            debug!(table = %alter.table, "ALTER TABLE targets an unknown table");
        }
        apply_constraint(table, &alter.table, constraint, &mut relationships);
    }

    let relationships = dedup_relationships(relationships);

    info!(
        tables = tables.len(),
        relationships = relationships.len(),
        "extracted schema"
    );

    Schema {
        tables,
        relationships,
    }
}

/// Keep the first of each semantically identical relationship.
fn dedup_relationships(relationships: Vec<Relationship>) -> Vec<Relationship> {
    let mut seen = HashSet::new();
    relationships
        .into_iter()
        .filter(|r| seen.insert(r.dedup_key()))
        .collect()
}

/// An `ALTER TABLE name ADD ...` clause awaiting application.
struct AlterStatement<'a> {
    table: String,
    body: &'a str,
}

/// Target of a `REFERENCES` clause.
#[derive(Debug)]
struct Reference {
    table: String,
    columns: Vec<String>,
    on_delete: Option<String>,
    on_update: Option<String>,
}

/// Token cursor over one piece of comment-free DDL text.
struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            tokens: tokenize(src),
            pos: 0,
        }
    }

    fn current(&self) -> &Token {
        // tokenize always ends with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn at_eof(&self) -> bool {
        self.kind() == &TokenKind::Eof
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.current().is_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Identifier or keyword used as a name.
    fn name(&mut self) -> Option<String> {
        let name = self.current().word(self.src)?.to_string();
        self.advance();
        Some(name)
    }

    /// Skip every token that starts before `offset`.
    fn skip_to(&mut self, offset: usize) {
        while !self.at_eof() && self.current().start < offset {
            self.advance();
        }
    }

    /// Skip a parenthesised group at the cursor, if any.
    fn skip_group(&mut self) {
        if self.kind() != &TokenKind::LParen {
            return;
        }
        let start = self.current().end;
        match find_closing_paren(self.src, start) {
            Some(close) => self.skip_to(close + 1),
            None => self.skip_to(self.src.len()),
        }
    }

    /// `name` or `schema.name`.
    fn qualified_name(&mut self) -> Option<(Option<String>, String)> {
        let first = self.name()?;
        if self.eat(&TokenKind::Dot) {
            let second = self.name()?;
            Some((Some(first), second))
        } else {
            Some((None, first))
        }
    }

    /// `( a, b, c )`. Only the first word of each element counts, so sort
    /// orders and MySQL prefix lengths are dropped.
    fn column_list(&mut self) -> Vec<String> {
        let mut columns = Vec::new();
        if !self.eat(&TokenKind::LParen) {
            return columns;
        }

        let mut expect_name = true;
        loop {
            match self.kind() {
                TokenKind::RParen => {
                    self.advance();
                    break;
                }
                TokenKind::Comma => {
                    expect_name = true;
                    self.advance();
                }
                TokenKind::LParen => self.skip_group(),
                TokenKind::Eof => break,
                _ => {
                    if expect_name {
                        if let Some(name) = self.current().word(self.src) {
                            columns.push(name.to_string());
                            expect_name = false;
                        }
                    }
                    self.advance();
                }
            }
        }

        columns
    }

    /// `CREATE TABLE [IF NOT EXISTS] [schema.]name ( ... )`.
    ///
    /// On return the cursor is past the table body, or just past the
    /// keyword that failed to match.
    /// Returns the table with the relationships its body declares.
    fn parse_create_table(&mut self) -> Option<(Table, Vec<Relationship>)> {
        self.advance(); // CREATE

        while ["TEMP", "TEMPORARY", "UNLOGGED", "GLOBAL", "LOCAL"]
            .iter()
            .any(|w| self.current().is_word(w))
        {
            self.advance();
        }

        if !self.eat(&TokenKind::Table) {
            return None;
        }

        if self.eat(&TokenKind::If) {
            self.eat(&TokenKind::Not);
            self.eat(&TokenKind::Exists);
        }

        let (schema, name) = self.qualified_name()?;

        if self.kind() != &TokenKind::LParen {
            return None;
        }
        let body_start = self.current().end;
        self.advance();

        let Some(body_end) = find_closing_paren(self.src, body_start) else {
            debug!(table = %name, "dropping CREATE TABLE with unbalanced body");
            return None;
        };
        self.skip_to(body_end + 1);

        let body = &self.src[body_start..body_end];
        Some(parse_table_body(name, schema, body))
    }

    /// `ALTER TABLE [ONLY] [IF EXISTS] [schema.]name ADD ...`.
    fn parse_alter_table(&mut self) -> Option<AlterStatement<'a>> {
        self.advance(); // ALTER

        if !self.eat(&TokenKind::Table) {
            return None;
        }
        self.eat(&TokenKind::Only);
        if self.eat(&TokenKind::If) {
            self.eat(&TokenKind::Exists);
        }
        self.eat(&TokenKind::Only);

        let (_, table) = self.qualified_name()?;

        if self.kind() != &TokenKind::Add {
            return None;
        }
        let src = self.src;
        let start = self.current().end;
        let end = statement_end(src, start);
        self.skip_to(end);

        Some(AlterStatement {
            table,
            body: &src[start..end],
        })
    }

    /// `REFERENCES [schema.]table [(cols)] [ON DELETE ...] [ON UPDATE ...]`,
    /// with the cursor just past `REFERENCES`.
    fn parse_reference(&mut self) -> Option<Reference> {
        let (_, table) = self.qualified_name()?;

        let mut columns = self.column_list();
        if columns.is_empty() {
            columns.push(IMPLICIT_REFERENCED_COLUMN.to_string());
        }

        let mut on_delete = None;
        let mut on_update = None;
        while self.kind() == &TokenKind::On {
            self.advance();
            let is_delete = match self.kind() {
                TokenKind::Delete => true,
                TokenKind::Update => false,
                _ => break,
            };
            self.advance();
            let action = self.referential_action();
            if is_delete {
                on_delete = action;
            } else {
                on_update = action;
            }
        }

        Some(Reference {
            table,
            columns,
            on_delete,
            on_update,
        })
    }

    /// CASCADE, RESTRICT, SET NULL, SET DEFAULT or NO ACTION.
    fn referential_action(&mut self) -> Option<String> {
        if self.eat_word("CASCADE") {
            return Some("CASCADE".to_string());
        }
        if self.eat_word("RESTRICT") {
            return Some("RESTRICT".to_string());
        }
        if self.eat_word("SET") {
            if self.eat(&TokenKind::Null) {
                return Some("SET NULL".to_string());
            }
            if self.eat(&TokenKind::Default) {
                return Some("SET DEFAULT".to_string());
            }
            return None;
        }
        if self.eat_word("NO") {
            self.eat_word("ACTION");
            return Some("NO ACTION".to_string());
        }
        None
    }

    /// Table-level constraint, optionally prefixed by `CONSTRAINT name`.
    fn parse_table_constraint(&mut self) -> Option<Constraint> {
        let name = if self.eat(&TokenKind::Constraint) {
            match self.kind() {
                TokenKind::Primary | TokenKind::Unique | TokenKind::Foreign | TokenKind::Check => {
                    None
                }
                _ => self.name(),
            }
        } else {
            None
        };

        match self.kind() {
            TokenKind::Primary => {
                self.advance();
                self.eat(&TokenKind::Key);
                let columns = self.column_list();
                (!columns.is_empty()).then_some(Constraint::PrimaryKey { name, columns })
            }
            TokenKind::Unique => {
                self.advance();
                if !self.eat(&TokenKind::Key) {
                    self.eat(&TokenKind::Index);
                }
                // MySQL index name
                if self.kind() != &TokenKind::LParen {
                    self.advance();
                }
                let columns = self.column_list();
                (!columns.is_empty()).then_some(Constraint::Unique { name, columns })
            }
            TokenKind::Foreign => {
                self.advance();
                self.eat(&TokenKind::Key);
                if self.kind() != &TokenKind::LParen {
                    self.advance();
                }
                let columns = self.column_list();
                if columns.is_empty() || !self.eat(&TokenKind::References) {
                    return None;
                }
                let reference = self.parse_reference()?;
                Some(Constraint::ForeignKey {
                    name,
                    columns,
                    ref_table: reference.table,
                    ref_columns: reference.columns,
                    on_delete: reference.on_delete,
                    on_update: reference.on_update,
                })
            }
            TokenKind::Check => {
                self.advance();
                if self.kind() != &TokenKind::LParen {
                    return None;
                }
                let expression = balanced_group(self.src, self.current().start)?.to_string();
                Some(Constraint::Check { name, expression })
            }
            _ => None,
        }
    }

    /// `GENERATED {ALWAYS | BY DEFAULT} AS IDENTITY [(...)]` or
    /// `GENERATED ALWAYS AS (expr) [STORED]`. True for identity columns.
    fn parse_generated(&mut self) -> bool {
        self.advance(); // GENERATED
        if !self.eat_word("ALWAYS") && self.eat_word("BY") {
            self.eat(&TokenKind::Default);
        }
        self.eat_word("AS");
        if self.eat(&TokenKind::Identity) {
            self.skip_group();
            return true;
        }
        self.skip_group();
        false
    }
}

/// How a top-level body segment should be read.
#[derive(Debug, PartialEq, Eq)]
enum Segment {
    Column,
    Constraint,
    /// MySQL `KEY` / `INDEX` definitions.
    Index,
}

fn classify_segment(segment: &str) -> Segment {
    let tokens = tokenize(segment);
    let mut kinds = tokens.iter().map(|t| &t.kind);
    let mut first = kinds.next();
    if first == Some(&TokenKind::Constraint) {
        // CONSTRAINT name <kind>
        first = kinds.nth(1);
    }
    match first {
        Some(TokenKind::Primary | TokenKind::Foreign | TokenKind::Unique | TokenKind::Check) => {
            Segment::Constraint
        }
        Some(TokenKind::Index | TokenKind::Key) => Segment::Index,
        Some(TokenKind::Ident(word))
            if ["FULLTEXT", "SPATIAL"]
                .iter()
                .any(|w| word.eq_ignore_ascii_case(w)) =>
        {
            Segment::Index
        }
        _ => Segment::Column,
    }
}

fn parse_table_body(
    name: String,
    schema: Option<String>,
    body: &str,
) -> (Table, Vec<Relationship>) {
    let mut table = Table::new(name, schema);
    let mut relationships = Vec::new();
    let mut constraints = Vec::new();

    for segment in split_top_level(body) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        match classify_segment(segment) {
            Segment::Column => {
                let Some((column, reference)) = parse_column(segment, &table.name) else {
                    debug!(table = %table.name, segment, "skipping unparseable column");
                    continue;
                };
                if table.column(&column.name).is_some() {
                    debug!(table = %table.name, column = %column.name, "skipping duplicate column");
                    continue;
                }
                table.columns.push(column);
                relationships.extend(reference);
            }
            Segment::Constraint => {
                match Parser::new(segment).parse_table_constraint() {
                    Some(constraint) => constraints.push(constraint),
                    None => debug!(table = %table.name, segment, "skipping unparseable constraint"),
                }
            }
            Segment::Index => {}
        }
    }

    // Columns first so constraints can reach all of them
    let table_name = table.name.clone();
    for constraint in constraints {
        apply_constraint(Some(&mut table), &table_name, constraint, &mut relationships);
    }

    (table, relationships)
}

/// Parse one column definition, with the relationship an inline
/// `REFERENCES` implies. Returns `None` when the segment has no name.
fn parse_column(segment: &str, table_name: &str) -> Option<(Column, Option<Relationship>)> {
    let mut p = Parser::new(segment);
    let name_end = p.current().end;
    let name = p.name()?;

    let rest = &segment[name_end..];
    let matched = match_type(rest);
    let modifiers_start = name_end + matched.as_ref().map_or(0, |m| m.consumed);

    let mut column = Column {
        name,
        data_type: matched.as_ref().map(|m| m.name.clone()).unwrap_or_default(),
        is_auto_increment: matched.as_ref().is_some_and(|m| m.is_serial()),
        ..Column::default()
    };

    let src = &segment[modifiers_start..];
    let mut p = Parser::new(src);
    let mut not_null = false;
    let mut relationship = None;

    while !p.at_eof() {
        match p.kind() {
            TokenKind::Primary => {
                p.advance();
                p.eat(&TokenKind::Key);
                column.is_primary_key = true;
            }
            TokenKind::Not => {
                p.advance();
                if p.eat(&TokenKind::Null) {
                    not_null = true;
                }
            }
            TokenKind::Unique => {
                p.advance();
                p.eat(&TokenKind::Key);
                column.is_unique = true;
            }
            TokenKind::Default => {
                let (expr, end) = capture_expression(src, p.current().end);
                if !expr.is_empty() {
                    column.default_value = Some(expr.to_string());
                }
                p.advance();
                p.skip_to(end);
            }
            TokenKind::Check => {
                p.advance();
                if p.kind() == &TokenKind::LParen {
                    let open = p.current().start;
                    if let Some(group) = balanced_group(src, open) {
                        column.check_expression = Some(group.to_string());
                        p.skip_to(open + group.len());
                    } else {
                        p.skip_to(src.len());
                    }
                }
            }
            TokenKind::References => {
                p.advance();
                if let Some(reference) = p.parse_reference() {
                    let target_column = reference.columns[0].clone();
                    relationship = Some(Relationship::new(
                        format!("fk_{}_{}", table_name, column.name),
                        table_name,
                        vec![column.name.clone()],
                        &reference.table,
                        vec![target_column.clone()],
                    ));
                    column.foreign_key = Some(ForeignKeyRef {
                        table: reference.table,
                        column: target_column,
                    });
                }
            }
            TokenKind::AutoIncrement => {
                p.advance();
                column.is_auto_increment = true;
            }
            TokenKind::Identity => {
                p.advance();
                p.skip_group();
                column.is_auto_increment = true;
            }
            TokenKind::Generated => {
                if p.parse_generated() {
                    column.is_auto_increment = true;
                }
            }
            TokenKind::Constraint => {
                // Inline constraint name
                p.advance();
                if matches!(p.kind(), TokenKind::Ident(_)) {
                    p.advance();
                }
            }
            // Explicit NULL is the default and never clears an implied NOT NULL
            _ => p.advance(),
        }
    }

    column.is_not_null = not_null || column.is_primary_key || column.is_auto_increment;
    Some((column, relationship))
}

/// Apply a table-level constraint to its table (when known) and emit the
/// relationship a foreign key implies.
fn apply_constraint(
    mut table: Option<&mut Table>,
    table_name: &str,
    constraint: Constraint,
    relationships: &mut Vec<Relationship>,
) {
    match &constraint {
        Constraint::PrimaryKey { columns, .. } => {
            if let Some(table) = table.as_deref_mut() {
                for column in table.columns_named_mut(columns) {
                    column.is_primary_key = true;
                    column.is_not_null = true;
                }
            }
        }
        Constraint::Unique { columns, .. } => {
            if let Some(table) = table.as_deref_mut() {
                for column in table.columns_named_mut(columns) {
                    column.is_unique = true;
                }
            }
        }
        Constraint::ForeignKey {
            name,
            columns,
            ref_table,
            ref_columns,
            ..
        } => {
            let target_column = ref_columns
                .first()
                .cloned()
                .unwrap_or_else(|| IMPLICIT_REFERENCED_COLUMN.to_string());
            if let Some(table) = table.as_deref_mut() {
                for column in table.columns_named_mut(columns) {
                    column.foreign_key = Some(ForeignKeyRef {
                        table: ref_table.clone(),
                        column: target_column.clone(),
                    });
                }
            }
            let rel_name = name
                .clone()
                .unwrap_or_else(|| format!("fk_{}_{}", table_name, columns.join("_")));
            relationships.push(Relationship::new(
                rel_name,
                table_name,
                columns.clone(),
                ref_table,
                ref_columns.clone(),
            ));
        }
        Constraint::Check { .. } => {}
    }

    if let Some(table) = table {
        table.constraints.push(constraint);
    }
}
