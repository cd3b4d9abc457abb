//! Chen notation: the entity/relationship/attribute graph and its Mermaid
//! flowchart rendering.
//!
//! The text renderer draws the graph produced by [`build_chen_graph`], so
//! both outputs always agree on classification, cardinality and ids.

use crate::analysis::{associative_tables, is_unique_by_pk};
use crate::ast::{ForeignKey, Table};
use crate::ident::IdRegistry;
use serde::Serialize;
use std::collections::HashMap;

const CLASS_DEFS: &[&str] = &[
    "classDef entity fill:#ffffff,stroke:#111111,stroke-width:2px,color:#111111;",
    "classDef relationship fill:#ffffff,stroke:#111111,stroke-width:2px,color:#111111;",
    "classDef attribute fill:#ffffff,stroke:#111111,stroke-width:1.6px,color:#111111;",
    "classDef pk stroke:#111111,stroke-width:3px;",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChenGraph {
    pub entities: Vec<ChenEntity>,
    pub relationships: Vec<ChenRelationship>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChenEntity {
    pub id: String,
    pub name: String,
    pub attributes: Vec<ChenAttribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChenAttribute {
    pub id: String,
    pub name: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChenRelationship {
    pub id: String,
    pub name: String,
    pub endpoints: Vec<Endpoint>,
    /// Only associative tables carry attributes of their own.
    pub attributes: Vec<ChenAttribute>,
    #[serde(skip)]
    pub kind: RelationshipKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipKind {
    /// From a single foreign key: endpoints are `[parent, child]`.
    ForeignKey,
    /// From a junction table: one endpoint per linked entity.
    Associative,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub entity_id: String,
    pub cardinality: Cardinality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Cardinality {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "N")]
    Many,
}

impl Cardinality {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::One => "1",
            Self::Many => "N",
        }
    }

    fn of(table: &Table, fk: &ForeignKey) -> Self {
        if is_unique_by_pk(table, fk) {
            Self::One
        } else {
            Self::Many
        }
    }
}

/// Build the Chen graph for `tables`.
///
/// Associative tables become relationships instead of entities; foreign
/// keys whose parent is not an entity are skipped.
pub fn build_chen_graph(tables: &[Table]) -> ChenGraph {
    let assoc = associative_tables(tables);
    let mut ids = IdRegistry::new();
    let mut entity_ids: HashMap<&str, String> = HashMap::new();
    let mut graph = ChenGraph::default();

    for table in tables.iter().filter(|t| !assoc.contains(t.name.as_str())) {
        let id = ids.node_id("E", &table.name);
        entity_ids.insert(table.name.as_str(), id.clone());

        let attributes = table
            .columns
            .iter()
            .map(|column| ChenAttribute {
                id: ids.node_id("A", &format!("{}_{}", table.name, column.name)),
                name: column.name.clone(),
                is_primary: table.is_primary(&column.name),
            })
            .collect();

        graph.entities.push(ChenEntity {
            id,
            name: table.name.clone(),
            attributes,
        });
    }

    for table in tables.iter().filter(|t| !assoc.contains(t.name.as_str())) {
        let child = &entity_ids[table.name.as_str()];

        for (index, fk) in table.foreign_keys.iter().enumerate() {
            let Some(parent) = entity_ids.get(fk.ref_table.as_str()) else {
                continue;
            };

            let name = fk
                .constraint_name
                .clone()
                .unwrap_or_else(|| format!("{}_{}_{}", table.name, fk.ref_table, index + 1));

            graph.relationships.push(ChenRelationship {
                id: ids.node_id("R", &name),
                name,
                endpoints: vec![
                    Endpoint {
                        entity_id: parent.clone(),
                        cardinality: Cardinality::One,
                    },
                    Endpoint {
                        entity_id: child.clone(),
                        cardinality: Cardinality::of(table, fk),
                    },
                ],
                attributes: Vec::new(),
                kind: RelationshipKind::ForeignKey,
            });
        }
    }

    for table in tables.iter().filter(|t| assoc.contains(t.name.as_str())) {
        let id = ids.node_id("R_ASSOC", &table.name);
        let fk_columns = table.foreign_key_columns();

        let endpoints: Vec<Endpoint> = table
            .foreign_keys
            .iter()
            .filter_map(|fk| {
                entity_ids.get(fk.ref_table.as_str()).map(|parent| Endpoint {
                    entity_id: parent.clone(),
                    cardinality: Cardinality::of(table, fk),
                })
            })
            .collect();

        let attributes = table
            .columns
            .iter()
            .filter(|column| !fk_columns.contains(column.name.as_str()))
            .map(|column| ChenAttribute {
                id: ids.node_id("A_ASSOC", &format!("{}_{}", table.name, column.name)),
                name: column.name.clone(),
                is_primary: table.is_primary(&column.name),
            })
            .collect();

        // a junction pointing at another junction has no entity to attach to
        if endpoints.len() < 2 {
            tracing::debug!(table = %table.name, "associative table without two entity endpoints");
            continue;
        }

        graph.relationships.push(ChenRelationship {
            id,
            name: table.name.clone(),
            endpoints,
            attributes,
            kind: RelationshipKind::Associative,
        });
    }

    graph
}

/// Chen diagram as Mermaid `flowchart LR` source.
pub fn render_chen_text(tables: &[Table]) -> String {
    render_graph(&build_chen_graph(tables))
}

fn label(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

fn push_attribute(out: &mut Vec<String>, owner: &str, attr: &ChenAttribute) {
    let text = if attr.is_primary {
        format!("{} (PK)", attr.name)
    } else {
        attr.name.clone()
    };
    let class = if attr.is_primary { "attribute,pk" } else { "attribute" };
    out.push(format!("    {}([\"{}\"])", attr.id, label(&text)));
    out.push(format!("    class {} {};", attr.id, class));
    out.push(format!("    {} --- {}", owner, attr.id));
}

/// Render a built graph.
pub fn render_graph(graph: &ChenGraph) -> String {
    let mut lines = vec!["flowchart LR".to_string()];
    lines.extend(CLASS_DEFS.iter().map(|def| format!("    {}", def)));

    for entity in &graph.entities {
        lines.push(format!("    {}[\"{}\"]", entity.id, label(&entity.name)));
        lines.push(format!("    class {} entity;", entity.id));
    }

    for entity in &graph.entities {
        for attr in &entity.attributes {
            push_attribute(&mut lines, &entity.id, attr);
        }
    }

    for rel in &graph.relationships {
        lines.push(format!("    {}{{\"{}\"}}", rel.id, label(&rel.name)));
        lines.push(format!("    class {} relationship;", rel.id));

        match (rel.kind, rel.endpoints.as_slice()) {
            (RelationshipKind::ForeignKey, [parent, child]) => {
                lines.push(format!(
                    "    {} ---|{}| {}",
                    parent.entity_id,
                    parent.cardinality.as_str(),
                    rel.id
                ));
                lines.push(format!(
                    "    {} ---|{}| {}",
                    rel.id,
                    child.cardinality.as_str(),
                    child.entity_id
                ));
            }
            _ => {
                for end in &rel.endpoints {
                    lines.push(format!(
                        "    {} ---|{}| {}",
                        end.entity_id,
                        end.cardinality.as_str(),
                        rel.id
                    ));
                }
            }
        }

        for attr in &rel.attributes {
            push_attribute(&mut lines, &rel.id, attr);
        }
    }

    lines.join("\n")
}
