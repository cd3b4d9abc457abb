//! Relationship classification shared by the diagram renderers.

use crate::ast::{ForeignKey, Table};
use std::collections::{BTreeSet, HashSet};

/// The foreign key's columns are a non-empty subset of the table's primary
/// key: the child cannot exist without its parent.
pub fn is_identifying(table: &Table, fk: &ForeignKey) -> bool {
    !fk.columns.is_empty() && fk.columns.iter().all(|c| table.is_primary(c))
}

/// The foreign key's columns are exactly the table's primary key, so each
/// parent row has at most one child row.
pub fn is_unique_by_pk(table: &Table, fk: &ForeignKey) -> bool {
    let cols = fk.column_set();
    !cols.is_empty()
        && cols.len() == table.primary_keys.len()
        && cols.iter().all(|c| table.is_primary(c))
}

/// Two-foreign-key junction table whose primary key is made of the foreign
/// key columns and which links two distinct tables of the schema.
pub fn is_associative(table: &Table, known_tables: &HashSet<&str>) -> bool {
    if table.foreign_keys.len() != 2 {
        return false;
    }

    let fk_cols = table.foreign_key_columns();
    if fk_cols.is_empty() || table.primary_keys.is_empty() {
        return false;
    }

    let pk: BTreeSet<&str> = table.primary_keys.iter().map(String::as_str).collect();
    if !pk.is_subset(&fk_cols) || pk.intersection(&fk_cols).count() < 2 {
        return false;
    }

    let targets: BTreeSet<&str> = table
        .foreign_keys
        .iter()
        .map(|fk| fk.ref_table.as_str())
        .collect();
    targets.len() == 2 && targets.iter().all(|t| known_tables.contains(t))
}

/// Names of all associative tables in `tables`.
pub fn associative_tables(tables: &[Table]) -> HashSet<&str> {
    let known: HashSet<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    tables
        .iter()
        .filter(|t| is_associative(t, &known))
        .map(|t| t.name.as_str())
        .collect()
}
