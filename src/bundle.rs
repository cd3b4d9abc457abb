//! All diagram renderings for one SQL input, as served to the front end.

use crate::chen::{build_chen_graph, render_graph, ChenGraph};
use crate::crowsfoot::render_crows_foot;
use crate::sql::parse_schema;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    #[error("SQL input is empty")]
    EmptyInput,
    #[error("no CREATE TABLE statement recognized; expected MySQL table DDL")]
    NoTables,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramBundle {
    /// Same as `mermaid_crow`; kept for older front ends.
    pub mermaid: String,
    pub mermaid_crow: String,
    pub mermaid_chen: String,
    pub chen_model: ChenGraph,
    pub table_count: usize,
    pub warnings: Vec<String>,
}

/// Parse `sql` and render every diagram.
///
/// Blank input and input without any recognizable table are errors here,
/// unlike in [`parse_schema`].
pub fn generate(sql: &str) -> Result<DiagramBundle, GenerateError> {
    let sql = sql.trim();
    if sql.is_empty() {
        return Err(GenerateError::EmptyInput);
    }

    let schema = parse_schema(sql);
    if schema.tables.is_empty() {
        return Err(GenerateError::NoTables);
    }

    let crow = render_crows_foot(&schema.tables);
    let chen_model = build_chen_graph(&schema.tables);
    let mermaid_chen = render_graph(&chen_model);

    tracing::debug!(
        tables = schema.tables.len(),
        warnings = schema.warnings.len(),
        "generated diagrams"
    );

    Ok(DiagramBundle {
        mermaid: crow.clone(),
        mermaid_crow: crow,
        mermaid_chen,
        chen_model,
        table_count: schema.tables.len(),
        warnings: schema.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chen::render_chen_text;

    const SQL: &str = "
        CREATE TABLE users (id INT NOT NULL, name VARCHAR(50), PRIMARY KEY (id));
        CREATE TABLE orders (
            id INT NOT NULL,
            user_id INT,
            PRIMARY KEY (id),
            FOREIGN KEY (user_id) REFERENCES users(id),
            FOOBAR weird syntax
        );";

    #[test]
    fn test_generate_bundle() {
        let bundle = generate(SQL).unwrap();
        assert_eq!(bundle.table_count, 2);
        assert_eq!(bundle.mermaid, bundle.mermaid_crow);
        assert!(bundle.mermaid_crow.contains("users ||--o{ orders"));
        assert_eq!(bundle.chen_model.entities.len(), 2);
        assert_eq!(bundle.warnings.len(), 1);
    }

    #[test]
    fn test_bundle_text_matches_standalone_render() {
        let bundle = generate(SQL).unwrap();
        assert_eq!(bundle.mermaid_chen, render_chen_text(&parse_schema(SQL).tables));
    }

    #[test]
    fn test_bundle_json_keys() {
        let json = serde_json::to_value(generate(SQL).unwrap()).unwrap();
        for key in ["mermaid", "mermaidCrow", "mermaidChen", "chenModel", "tableCount", "warnings"] {
            assert!(json.get(key).is_some(), "missing {}", key);
        }
        assert_eq!(json["tableCount"], 2);
    }

    #[test]
    fn test_generate_rejects_blank_and_tableless_input() {
        assert_eq!(generate("  \n\t"), Err(GenerateError::EmptyInput));
        assert_eq!(generate("SELECT 1;"), Err(GenerateError::NoTables));
    }
}
