//! Relational model recovered from DDL text.

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    pub tables: Vec<Table>,
    pub relationships: Vec<Relationship>,
}

impl Schema {
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Case-insensitive table lookup.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub name: String,
    pub schema: Option<String>,
    /// Declaration order is preserved.
    pub columns: Vec<Column>,
    pub constraints: Vec<Constraint>,
}

impl Table {
    pub fn new(name: impl Into<String>, schema: Option<String>) -> Self {
        Self {
            name: name.into(),
            schema,
            columns: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Columns named in `names`, matched case-insensitively.
    pub(crate) fn columns_named_mut<'a>(
        &'a mut self,
        names: &'a [String],
    ) -> impl Iterator<Item = &'a mut Column> + 'a {
        self.columns
            .iter_mut()
            .filter(move |c| names.iter().any(|n| n.eq_ignore_ascii_case(&c.name)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    /// Uppercased type, including size and array modifiers.
    #[serde(rename = "type")]
    pub data_type: String,
    pub is_primary_key: bool,
    pub is_unique: bool,
    pub is_not_null: bool,
    pub is_auto_increment: bool,
    pub default_value: Option<String>,
    pub check_expression: Option<String>,
    pub foreign_key: Option<ForeignKeyRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKeyRef {
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Constraint {
    #[serde(rename = "PK")]
    PrimaryKey {
        name: Option<String>,
        columns: Vec<String>,
    },
    Unique {
        name: Option<String>,
        columns: Vec<String>,
    },
    #[serde(rename = "FK", rename_all = "camelCase")]
    ForeignKey {
        name: Option<String>,
        columns: Vec<String>,
        ref_table: String,
        ref_columns: Vec<String>,
        on_delete: Option<String>,
        on_update: Option<String>,
    },
    Check {
        name: Option<String>,
        expression: String,
    },
}

impl Constraint {
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::PrimaryKey { name, .. }
            | Self::Unique { name, .. }
            | Self::ForeignKey { name, .. }
            | Self::Check { name, .. } => name.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    pub table: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RelationshipKind {
    #[serde(rename = "many-to-one")]
    ManyToOne,
    #[serde(rename = "many-to-many")]
    ManyToMany,
}

impl RelationshipKind {
    /// Composite references are tagged many-to-many.
    pub fn for_columns(count: usize) -> Self {
        if count > 1 {
            Self::ManyToMany
        } else {
            Self::ManyToOne
        }
    }
}

/// Directed edge from the referencing table to the referenced one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relationship {
    pub name: String,
    pub from: Endpoint,
    pub to: Endpoint,
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
}

impl Relationship {
    pub fn new(
        name: impl Into<String>,
        from_table: &str,
        from_columns: Vec<String>,
        to_table: &str,
        to_columns: Vec<String>,
    ) -> Self {
        let kind = RelationshipKind::for_columns(from_columns.len());
        Self {
            name: name.into(),
            from: Endpoint {
                table: from_table.to_string(),
                columns: from_columns,
            },
            to: Endpoint {
                table: to_table.to_string(),
                columns: to_columns,
            },
            kind,
        }
    }

    pub fn is_self_reference(&self) -> bool {
        self.from.table.eq_ignore_ascii_case(&self.to.table)
    }

    /// Identity used for deduplication.
    pub fn dedup_key(&self) -> String {
        format!(
            "{}.{}->{}.{}",
            self.from.table,
            self.from.columns.join(","),
            self.to.table,
            self.to.columns.join(",")
        )
        .to_ascii_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_column_count() {
        assert_eq!(RelationshipKind::for_columns(1), RelationshipKind::ManyToOne);
        assert_eq!(RelationshipKind::for_columns(2), RelationshipKind::ManyToMany);
    }

    #[test]
    fn test_dedup_key_ignores_case() {
        let a = Relationship::new(
            "a",
            "Orders",
            vec!["Customer_Id".into()],
            "customers",
            vec!["id".into()],
        );
        let b = Relationship::new(
            "b",
            "orders",
            vec!["customer_id".into()],
            "CUSTOMERS",
            vec!["ID".into()],
        );
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_dedup_key_folds_ascii_only() {
        // Same folding as table and column lookups.
        let a = Relationship::new("a", "Äpfel", vec!["x".into()], "b", vec!["id".into()]);
        let b = Relationship::new("b", "äpfel", vec!["x".into()], "b", vec!["id".into()]);
        assert!(!a.from.table.eq_ignore_ascii_case(&b.from.table));
        assert_ne!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_column_serializes_with_type_key() {
        let col = Column {
            name: "id".into(),
            data_type: "INT".into(),
            is_primary_key: true,
            ..Default::default()
        };
        let json = serde_json::to_value(&col).unwrap();
        assert_eq!(json["type"], "INT");
        assert_eq!(json["isPrimaryKey"], true);
        assert!(json["foreignKey"].is_null());
    }

    #[test]
    fn test_relationship_serializes_kind_tag() {
        let cols = vec!["x".to_string(), "y".to_string()];
        let rel = Relationship::new("fk", "a", cols.clone(), "b", cols);
        let json = serde_json::to_value(&rel).unwrap();
        assert_eq!(json["type"], "many-to-many");
        assert_eq!(json["from"]["table"], "a");
    }
}
