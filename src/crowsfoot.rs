//! Crow's-foot notation as Mermaid `erDiagram` source.

use crate::analysis::is_identifying;
use crate::ast::Table;
use crate::ident::IdRegistry;
use crate::sql::diagram_type;
use std::collections::HashMap;

/// Render every table as an entity and every resolvable foreign key as a
/// relationship line. Foreign keys to unknown tables are skipped.
pub fn render_crows_foot(tables: &[Table]) -> String {
    let mut ids = IdRegistry::new();
    let mut entity_names: HashMap<&str, String> = HashMap::new();
    for table in tables {
        let name = ids.entity_name(&table.name);
        entity_names.entry(table.name.as_str()).or_insert(name);
    }

    let mut out = String::from("erDiagram");

    for table in tables {
        let fk_columns = table.foreign_key_columns();
        out.push_str(&format!("\n    {} {{", entity_names[table.name.as_str()]));

        for column in &table.columns {
            out.push_str(&format!(
                "\n        {} {}",
                diagram_type(&column.declared_type),
                column.name
            ));
            if table.is_primary(&column.name) {
                out.push_str(" PK");
            }
            if fk_columns.contains(column.name.as_str()) {
                out.push_str(" FK");
            }
        }

        out.push_str("\n    }");
    }

    for table in tables {
        let child = &entity_names[table.name.as_str()];
        for fk in &table.foreign_keys {
            let Some(parent) = entity_names.get(fk.ref_table.as_str()) else {
                continue;
            };
            let child_end = if is_identifying(table, fk) { "||" } else { "o{" };
            out.push_str(&format!(
                "\n    {} ||--{} {} : \"{} -> {}\"",
                parent,
                child_end,
                child,
                relation_label(&fk.ref_columns.join(", ")),
                relation_label(&fk.columns.join(", "))
            ));
        }
    }

    out
}

/// Relationship labels are double-quoted; Mermaid spells an embedded quote
/// as an entity code.
fn relation_label(text: &str) -> String {
    text.replace('"', "#quot;")
}
