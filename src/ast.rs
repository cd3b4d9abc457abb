//! Relational schema model recovered from `CREATE TABLE` statements.

use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schema {
    pub tables: Vec<Table>,
    /// Diagnostics for definitions that could not be understood.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub name: String,
    /// Declaration order is preserved; renderers depend on it.
    pub columns: Vec<Column>,
    pub primary_keys: BTreeSet<String>,
    pub foreign_keys: Vec<ForeignKey>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    pub declared_type: String,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    /// Local columns, positionally matched with `ref_columns`.
    pub columns: Vec<String>,
    pub ref_table: String,
    pub ref_columns: Vec<String>,
    pub constraint_name: Option<String>,
}

impl Schema {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_keys: BTreeSet::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Declared spelling of column `name`. Column names compare without
    /// regard to ASCII case, as MySQL does.
    pub fn declared_column(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(|c| c.name.as_str())
    }

    pub fn is_primary(&self, column: &str) -> bool {
        self.primary_keys.contains(column)
    }

    /// Union of the local columns of every foreign key on this table.
    pub fn foreign_key_columns(&self) -> BTreeSet<&str> {
        self.foreign_keys
            .iter()
            .flat_map(|fk| fk.columns.iter().map(String::as_str))
            .collect()
    }
}

impl ForeignKey {
    pub fn column_set(&self) -> BTreeSet<&str> {
        self.columns.iter().map(String::as_str).collect()
    }
}
