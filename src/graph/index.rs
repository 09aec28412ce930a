//! Adjacency index
//!
//! Reverse-lookup maps derived from the node and edge sets so that highlight
//! queries are O(1) per hop. The index is never edited by hand: it is rebuilt
//! whenever nodes or edges are replaced and on every import.

use crate::models::{EntityNode, RelationshipEdge};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// entity → edges, column → owning entity, column → edges
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphIndex {
    #[serde(default)]
    pub entity_to_edges: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub column_to_entity: BTreeMap<String, String>,
    #[serde(default)]
    pub column_to_edges: BTreeMap<String, Vec<String>>,
}

impl GraphIndex {
    /// Edge ids touching an entity, one entry per role.
    pub fn edges_of_entity(&self, entity_id: &str) -> &[String] {
        self.entity_to_edges
            .get(entity_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn owner_of_column(&self, column_id: &str) -> Option<&str> {
        self.column_to_entity.get(column_id).map(String::as_str)
    }

    pub fn edges_of_column(&self, column_id: &str) -> &[String] {
        self.column_to_edges
            .get(column_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Build the index from the current nodes and edges.
///
/// A self-referencing edge is appended once per role, so it shows up twice
/// under its entity. Callers that display the result dedupe on their side.
pub fn build_index(
    nodes: &BTreeMap<String, EntityNode>,
    edges: &BTreeMap<String, RelationshipEdge>,
) -> GraphIndex {
    let mut index = GraphIndex::default();

    for node in nodes.values() {
        for column in &node.columns {
            index
                .column_to_entity
                .insert(column.id.clone(), node.id.clone());
        }
    }

    for edge in edges.values() {
        index
            .entity_to_edges
            .entry(edge.source_entity_id.clone())
            .or_default()
            .push(edge.id.clone());
        index
            .entity_to_edges
            .entry(edge.target_entity_id.clone())
            .or_default()
            .push(edge.id.clone());

        index
            .column_to_edges
            .entry(edge.source_column_id.clone())
            .or_default()
            .push(edge.id.clone());
        index
            .column_to_edges
            .entry(edge.target_column_id.clone())
            .or_default()
            .push(edge.id.clone());
    }

    tracing::trace!(
        entities = index.entity_to_edges.len(),
        columns = index.column_to_entity.len(),
        "Rebuilt adjacency index"
    );

    index
}
