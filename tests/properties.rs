//! Property tests over randomly generated schemas.

use proptest::prelude::*;
use schemaflow_diagram::graph::build_index;
use schemaflow_diagram::highlight::{resolve, Focus};
use schemaflow_diagram::models::{
    Column, ErDiagram, SchemaSnapshot, SnapshotEntity, SnapshotRelationship,
};
use schemaflow_diagram::reconcile::ReconciliationEngine;
use std::collections::HashSet;

/// Up to 8 uniquely named tables with 1..4 columns and a handful of foreign keys
fn arb_snapshot() -> impl Strategy<Value = SchemaSnapshot> {
    (1usize..8)
        .prop_flat_map(|tables| {
            (
                prop::collection::vec(1usize..4, tables),
                prop::collection::vec((0..tables, 0..tables, any::<bool>()), 0..10),
            )
        })
        .prop_map(|(column_counts, fks)| {
            let entities: Vec<SnapshotEntity> = column_counts
                .iter()
                .enumerate()
                .map(|(t, &count)| SnapshotEntity {
                    id: format!("e{t}"),
                    name: format!("table_{t}"),
                    columns: (0..count)
                        .map(|c| Column {
                            id: format!("e{t}-c{c}"),
                            name: format!("col_{c}"),
                            key: None,
                            is_foreign_key: false,
                        })
                        .collect(),
                    ddl: String::new(),
                })
                .collect();

            let relationships = fks
                .into_iter()
                .enumerate()
                .map(|(i, (from, to, named))| SnapshotRelationship {
                    id: format!("r{i}"),
                    from_entity_id: format!("e{from}"),
                    from_column_id: format!("e{from}-c0"),
                    to_entity_id: format!("e{to}"),
                    to_column_id: format!("e{to}-c0"),
                    constraint_name: named.then(|| format!("fk_{i}")),
                })
                .collect();

            SchemaSnapshot {
                entities,
                relationships,
                ..Default::default()
            }
        })
}

proptest! {
    #[test]
    fn reconcile_twice_is_idempotent(snap in arb_snapshot()) {
        let engine = ReconciliationEngine::default();
        let first = engine.reconcile(&ErDiagram::default(), &snap);
        let second = engine.reconcile(&first, &snap);

        prop_assert_eq!(&second.nodes, &first.nodes);
        prop_assert_eq!(&second.edges, &first.edges);
        prop_assert_eq!(second.history.len(), first.history.len() + 1);

        let summary = second.history.last().and_then(|e| e.summary.clone()).unwrap();
        prop_assert!(summary.is_noop());
    }

    #[test]
    fn names_are_unique_and_ids_stable(snap in arb_snapshot(), keep in prop::collection::vec(any::<bool>(), 8)) {
        let engine = ReconciliationEngine::default();
        let first = engine.reconcile(&ErDiagram::default(), &snap);

        let mut partial = snap.clone();
        let mut i = 0;
        partial.entities.retain(|_| { i += 1; keep[i - 1] });
        let second = engine.reconcile(&first, &partial);

        let names: HashSet<_> = second.nodes.values().map(|n| n.name.as_str()).collect();
        prop_assert_eq!(names.len(), second.nodes.len());

        for node in second.nodes.values() {
            let before = first.nodes.values().find(|n| n.name == node.name).unwrap();
            prop_assert_eq!(&node.id, &before.id);
            prop_assert_eq!((node.x, node.y), (before.x, before.y));
        }
    }

    #[test]
    fn edges_only_reference_live_nodes(snap in arb_snapshot(), drop in 0usize..8) {
        let engine = ReconciliationEngine::default();
        let first = engine.reconcile(&ErDiagram::default(), &snap);

        let mut partial = snap.clone();
        if drop < partial.entities.len() {
            partial.entities.remove(drop);
        }
        let second = engine.reconcile(&first, &partial);

        for edge in second.edges.values() {
            prop_assert!(second.nodes.contains_key(&edge.source_entity_id));
            prop_assert!(second.nodes.contains_key(&edge.target_entity_id));
        }
        for ids in second.index.entity_to_edges.values() {
            for id in ids {
                prop_assert!(second.edges.contains_key(id));
            }
        }
    }

    #[test]
    fn index_counts_every_edge_endpoint(snap in arb_snapshot()) {
        let out = ReconciliationEngine::default().reconcile(&ErDiagram::default(), &snap);
        let index = build_index(&out.nodes, &out.edges);
        prop_assert_eq!(&index, &out.index);

        let entries: usize = index.entity_to_edges.values().map(Vec::len).sum();
        prop_assert_eq!(entries, out.edges.len() * 2);

        for node in out.nodes.values() {
            for col in &node.columns {
                prop_assert_eq!(index.owner_of_column(&col.id), Some(node.id.as_str()));
            }
        }
    }

    #[test]
    fn entity_highlight_is_closed_over_one_hop(snap in arb_snapshot()) {
        let out = ReconciliationEngine::default().reconcile(&ErDiagram::default(), &snap);

        for id in out.nodes.keys() {
            let set = resolve(&out.index, &out.edges, &Focus::entity(id.as_str())).unwrap();
            prop_assert_eq!(set.node_ids.first(), Some(id));

            let unique: HashSet<_> = set.node_ids.iter().collect();
            prop_assert_eq!(unique.len(), set.node_ids.len());

            for edge_id in &set.edge_ids {
                let edge = &out.edges[edge_id];
                prop_assert!(edge.source_entity_id == *id || edge.target_entity_id == *id);
                prop_assert!(set.node_ids.contains(&edge.source_entity_id));
                prop_assert!(set.node_ids.contains(&edge.target_entity_id));
                prop_assert!(set.column_ids.contains(&edge.source_column_id));
                prop_assert!(set.column_ids.contains(&edge.target_column_id));
            }
        }
    }
}
