//! One-hop highlight resolution
//!
//! Given a focused element, collect the nodes, edges and columns directly
//! related to it. Lookups go through the adjacency index only.

use crate::graph::GraphIndex;
use crate::models::{HighlightIds, HoverKind, RelationshipEdge};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

/// Element whose neighbourhood should be highlighted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Focus {
    pub kind: HoverKind,
    pub id: String,
}

impl Focus {
    pub fn entity(id: impl Into<String>) -> Self {
        Self { kind: HoverKind::Entity, id: id.into() }
    }

    pub fn edge(id: impl Into<String>) -> Self {
        Self { kind: HoverKind::Edge, id: id.into() }
    }

    pub fn column(id: impl Into<String>) -> Self {
        Self { kind: HoverKind::Column, id: id.into() }
    }
}

/// Ids to highlight, in first-encounter order without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightSet {
    pub node_ids: Vec<String>,
    pub edge_ids: Vec<String>,
    pub column_ids: Vec<String>,
}

/// Resolution failed because the focused element is unknown
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HighlightMiss {
    #[error("Column owner not found: {0}")]
    ColumnOwnerNotFound(String),

    #[error("Edge not found: {0}")]
    EdgeNotFound(String),
}

/// Insertion-ordered set of ids
#[derive(Default)]
struct OrderedIds {
    seen: HashSet<String>,
    ids: Vec<String>,
}

impl OrderedIds {
    fn with(id: &str) -> Self {
        let mut set = Self::default();
        set.push(id);
        set
    }

    fn push(&mut self, id: &str) {
        if self.seen.insert(id.to_string()) {
            self.ids.push(id.to_string());
        }
    }
}

#[derive(Default)]
struct Collector {
    nodes: OrderedIds,
    edges: OrderedIds,
    columns: OrderedIds,
}

impl Collector {
    fn add_edge(&mut self, edge: &RelationshipEdge) {
        self.edges.push(&edge.id);
        self.nodes.push(&edge.source_entity_id);
        self.nodes.push(&edge.target_entity_id);
        self.columns.push(&edge.source_column_id);
        self.columns.push(&edge.target_column_id);
    }

    fn add_edges<'a>(
        &mut self,
        edge_ids: impl IntoIterator<Item = &'a String>,
        edges: &BTreeMap<String, RelationshipEdge>,
    ) {
        // index entries without an edge record are stale, skip them
        for edge in edge_ids.into_iter().filter_map(|id| edges.get(id)) {
            self.add_edge(edge);
        }
    }

    fn finish(self) -> HighlightSet {
        HighlightSet {
            node_ids: self.nodes.ids,
            edge_ids: self.edges.ids,
            column_ids: self.columns.ids,
        }
    }
}

/// Resolve the one-hop neighbourhood of `focus`
pub fn resolve(
    index: &GraphIndex,
    edges: &BTreeMap<String, RelationshipEdge>,
    focus: &Focus,
) -> Result<HighlightSet, HighlightMiss> {
    let mut out = Collector::default();

    match focus.kind {
        HoverKind::Entity => {
            out.nodes = OrderedIds::with(&focus.id);
            out.add_edges(index.edges_of_entity(&focus.id), edges);
        }
        HoverKind::Edge => {
            let edge = edges
                .get(&focus.id)
                .ok_or_else(|| HighlightMiss::EdgeNotFound(focus.id.clone()))?;
            out.add_edge(edge);
        }
        HoverKind::Column => {
            let owner = index
                .owner_of_column(&focus.id)
                .ok_or_else(|| HighlightMiss::ColumnOwnerNotFound(focus.id.clone()))?;
            out.columns = OrderedIds::with(&focus.id);
            out.nodes = OrderedIds::with(owner);
            out.add_edges(index.edges_of_column(&focus.id), edges);
        }
    }

    Ok(out.finish())
}

/// Hand back `current` when `new` holds the same ids regardless of order
pub fn reuse_if_same(new: Vec<String>, current: &HighlightIds) -> HighlightIds {
    if same_elements(&new, current) {
        Arc::clone(current)
    } else {
        Arc::from(new)
    }
}

fn same_elements(a: &[String], b: &[String]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut a: Vec<&String> = a.iter().collect();
    let mut b: Vec<&String> = b.iter().collect();
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_index;
    use crate::models::{Column, EntityNode};
    use pretty_assertions::assert_eq;

    fn node(id: &str, cols: &[&str]) -> EntityNode {
        EntityNode {
            id: id.into(),
            name: id.to_lowercase(),
            columns: cols
                .iter()
                .map(|c| Column {
                    id: c.to_string(),
                    name: c.to_string(),
                    key: None,
                    is_foreign_key: false,
                })
                .collect(),
            ddl: String::new(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }

    fn edge(id: &str, src: (&str, &str), dst: (&str, &str)) -> RelationshipEdge {
        RelationshipEdge {
            id: id.into(),
            source_entity_id: src.0.into(),
            source_column_id: src.1.into(),
            target_entity_id: dst.0.into(),
            target_column_id: dst.1.into(),
            constraint_name: None,
        }
    }

    /// users <- posts <- comments, comments -> users
    fn fixture() -> (GraphIndex, BTreeMap<String, RelationshipEdge>) {
        let nodes: BTreeMap<_, _> = [
            node("U", &["u-id"]),
            node("P", &["p-id", "p-uid"]),
            node("C", &["c-id", "c-pid", "c-uid"]),
        ]
        .into_iter()
        .map(|n| (n.id.clone(), n))
        .collect();
        let edges: BTreeMap<_, _> = [
            edge("e1", ("P", "p-uid"), ("U", "u-id")),
            edge("e2", ("C", "c-pid"), ("P", "p-id")),
            edge("e3", ("C", "c-uid"), ("U", "u-id")),
        ]
        .into_iter()
        .map(|e| (e.id.clone(), e))
        .collect();
        (build_index(&nodes, &edges), edges)
    }

    #[test]
    fn test_entity_focus_is_one_hop() {
        let (index, edges) = fixture();
        let set = resolve(&index, &edges, &Focus::entity("U")).unwrap();
        assert_eq!(set.node_ids, vec!["U", "P", "C"]);
        assert_eq!(set.edge_ids, vec!["e1", "e3"]);
        assert_eq!(set.column_ids, vec!["p-uid", "u-id", "c-uid"]);

        // comments is reached through users but its other edge is not followed
        assert!(!set.edge_ids.contains(&"e2".to_string()));
    }

    #[test]
    fn test_isolated_entity_highlights_itself() {
        let (index, edges) = fixture();
        let set = resolve(&index, &edges, &Focus::entity("X")).unwrap();
        assert_eq!(set.node_ids, vec!["X"]);
        assert!(set.edge_ids.is_empty());
        assert!(set.column_ids.is_empty());
    }

    #[test]
    fn test_edge_focus() {
        let (index, edges) = fixture();
        let set = resolve(&index, &edges, &Focus::edge("e2")).unwrap();
        assert_eq!(set.edge_ids, vec!["e2"]);
        assert_eq!(set.node_ids, vec!["C", "P"]);
        assert_eq!(set.column_ids, vec!["c-pid", "p-id"]);

        assert_eq!(
            resolve(&index, &edges, &Focus::edge("nope")),
            Err(HighlightMiss::EdgeNotFound("nope".into()))
        );
    }

    #[test]
    fn test_column_focus() {
        let (index, edges) = fixture();
        let set = resolve(&index, &edges, &Focus::column("u-id")).unwrap();
        assert_eq!(set.column_ids, vec!["u-id", "p-uid", "c-uid"]);
        assert_eq!(set.node_ids, vec!["U", "P", "C"]);
        assert_eq!(set.edge_ids, vec!["e1", "e3"]);

        let set = resolve(&index, &edges, &Focus::column("c-id")).unwrap();
        assert_eq!(set.node_ids, vec!["C"]);
        assert_eq!(set.column_ids, vec!["c-id"]);
        assert!(set.edge_ids.is_empty());

        assert_eq!(
            resolve(&index, &edges, &Focus::column("ghost")),
            Err(HighlightMiss::ColumnOwnerNotFound("ghost".into()))
        );
    }

    #[test]
    fn test_stale_index_entry_is_skipped() {
        let (index, mut edges) = fixture();
        edges.remove("e3");
        let set = resolve(&index, &edges, &Focus::entity("U")).unwrap();
        assert_eq!(set.edge_ids, vec!["e1"]);
        assert_eq!(set.node_ids, vec!["U", "P"]);
    }

    #[test]
    fn test_reuse_if_same_keeps_pointer() {
        let current: HighlightIds = Arc::from(vec!["a".to_string(), "b".to_string()]);

        let reused = reuse_if_same(vec!["b".into(), "a".into()], &current);
        assert!(Arc::ptr_eq(&reused, &current));

        let fresh = reuse_if_same(vec!["a".into(), "c".into()], &current);
        assert!(!Arc::ptr_eq(&fresh, &current));
        assert_eq!(&*fresh, &["a".to_string(), "c".to_string()]);
    }
}
