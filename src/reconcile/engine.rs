//! Reconciliation engine
//!
//! Folds a freshly captured schema snapshot into the diagram the user has
//! been editing. Tables are matched by name: a matched table keeps its id,
//! position and measured size while its columns and DDL are replaced. New
//! tables are placed on a grid, vanished tables are dropped together with
//! their layer entries, and one history entry records the net effect.

use crate::graph::build_index;
use crate::models::{
    DiagramUiState, EntityNode, EntryType, ErDiagram, HistoryEntry, LayerItemKind, LayerItemRef,
    RelationshipEdge, SchemaSnapshot, SnapshotEntity,
};
use crate::reconcile::diff::{ChangeLog, DiffEngine};
use crate::reconcile::layout::{GridPlacer, LayoutConfig};
use chrono::Utc;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Merges schema snapshots into diagram state
#[derive(Debug, Clone, Default)]
pub struct ReconciliationEngine {
    layout: LayoutConfig,
}

impl ReconciliationEngine {
    pub fn new(layout: LayoutConfig) -> Self {
        Self { layout }
    }

    /// Merge `snapshot` into `previous`, stamping the history entry with the current time
    pub fn reconcile(&self, previous: &ErDiagram, snapshot: &SchemaSnapshot) -> ErDiagram {
        self.reconcile_at(previous, snapshot, Utc::now().timestamp_millis())
    }

    /// Merge `snapshot` into `previous` with an explicit history timestamp (ms)
    pub fn reconcile_at(
        &self,
        previous: &ErDiagram,
        snapshot: &SchemaSnapshot,
        timestamp: i64,
    ) -> ErDiagram {
        let incremental = !previous.nodes.is_empty();
        let mut log = ChangeLog::default();

        // Name → previous node. Iteration is in id order, so the smallest id wins a shared name.
        let mut existing_by_name: HashMap<&str, &EntityNode> = HashMap::new();
        for node in previous.nodes.values() {
            existing_by_name.entry(node.name.as_str()).or_insert(node);
        }

        let entities = unique_by_name(&snapshot.entities);

        let reserved_ids: HashSet<&str> = entities
            .iter()
            .filter_map(|e| existing_by_name.get(e.name.as_str()))
            .map(|n| n.id.as_str())
            .collect();
        let new_count = entities.len() - reserved_ids.len();

        let mut placer = if incremental {
            GridPlacer::incremental(self.layout, previous.nodes.values(), new_count)
        } else {
            GridPlacer::initial(self.layout, snapshot.entities.len())
        };

        let mut nodes: BTreeMap<String, EntityNode> = BTreeMap::new();
        let mut node_id_by_name: HashMap<&str, String> = HashMap::new();

        for entity in &entities {
            let node = match existing_by_name.get(entity.name.as_str()) {
                Some(existing) => {
                    if incremental {
                        DiffEngine::diff_columns(
                            &entity.name,
                            &existing.columns,
                            &entity.columns,
                            &mut log,
                        );
                    }
                    EntityNode {
                        id: existing.id.clone(),
                        name: entity.name.clone(),
                        columns: entity.columns.clone(),
                        ddl: entity.ddl.clone(),
                        x: existing.x,
                        y: existing.y,
                        width: existing.width,
                        height: existing.height,
                    }
                }
                None => {
                    if incremental {
                        log.added_tables.push(entity.name.clone());
                    }
                    let (x, y) = placer.next_position();
                    // previous ids stay retired, even those of tables dropped by this merge
                    let id = if previous.nodes.contains_key(&entity.id)
                        || nodes.contains_key(&entity.id)
                        || entity.id.is_empty()
                    {
                        Uuid::new_v4().to_string()
                    } else {
                        entity.id.clone()
                    };
                    debug!(table = %entity.name, %id, x, y, "Placed new table");
                    EntityNode {
                        id,
                        name: entity.name.clone(),
                        columns: entity.columns.clone(),
                        ddl: entity.ddl.clone(),
                        x,
                        y,
                        width: 0.0,
                        height: 0.0,
                    }
                }
            };

            node_id_by_name.insert(entity.name.as_str(), node.id.clone());
            nodes.insert(node.id.clone(), node);
        }

        // Snapshot entity id → output node id, routed through the name so duplicates resolve too
        let node_id_by_entity: HashMap<&str, &str> = snapshot
            .entities
            .iter()
            .filter_map(|e| {
                node_id_by_name
                    .get(e.name.as_str())
                    .map(|id| (e.id.as_str(), id.as_str()))
            })
            .collect();

        let mut edges: BTreeMap<String, RelationshipEdge> = BTreeMap::new();
        for rel in &snapshot.relationships {
            let source = node_id_by_entity.get(rel.from_entity_id.as_str());
            let target = node_id_by_entity.get(rel.to_entity_id.as_str());
            let (Some(source), Some(target)) = (source, target) else {
                debug!(relationship = %rel.id, "Skipping relationship with unknown endpoint");
                continue;
            };
            edges.insert(
                rel.id.clone(),
                RelationshipEdge {
                    id: rel.id.clone(),
                    source_entity_id: source.to_string(),
                    target_entity_id: target.to_string(),
                    source_column_id: rel.from_column_id.clone(),
                    target_column_id: rel.to_column_id.clone(),
                    constraint_name: rel.constraint_name.clone(),
                },
            );
        }

        // Unmatched previous nodes, even when a new table happened to take over the id
        let removed_ids: HashSet<&str> = previous
            .nodes
            .keys()
            .map(String::as_str)
            .filter(|id| !reserved_ids.contains(id))
            .collect();

        if incremental {
            // a losing duplicate of a surviving name is dropped but not reported
            log.removed_tables = previous
                .nodes
                .values()
                .filter(|n| removed_ids.contains(n.id.as_str()))
                .filter(|n| !node_id_by_name.contains_key(n.name.as_str()))
                .map(|n| n.name.clone())
                .collect();

            DiffEngine::diff_relationships(&previous.nodes, &previous.edges, &nodes, &edges, &mut log);
        }

        let mut layer_order = previous.ui.layer_order.clone();
        layer_order
            .background_items
            .retain(|item| !is_removed_entity(item, &removed_ids));
        layer_order
            .foreground_items
            .retain(|item| !is_removed_entity(item, &removed_ids));

        let entry = build_history_entry(incremental, timestamp, snapshot, log);

        if let Some(summary) = &entry.summary {
            info!(
                entry_type = ?entry.entry_type,
                tables = nodes.len(),
                relationships = edges.len(),
                added_tables = summary.added_tables,
                removed_tables = summary.removed_tables,
                added_columns = summary.added_columns,
                removed_columns = summary.removed_columns,
                modified_columns = summary.modified_columns,
                added_relationships = summary.added_relationships,
                removed_relationships = summary.removed_relationships,
                "Reconciled schema snapshot from {} ({})",
                snapshot.source.database,
                snapshot.source.dialect
            );
        }

        let index = build_index(&nodes, &edges);
        let mut history = previous.history.clone();
        history.push(entry);

        ErDiagram {
            nodes,
            edges,
            rectangles: previous.rectangles.clone(),
            texts: previous.texts.clone(),
            index,
            history,
            ui: DiagramUiState {
                layer_order,
                ..previous.ui.without_transients()
            },
            loading: previous.loading,
        }
    }
}

/// Keep the first entity per name; later duplicates are ignored
fn unique_by_name(entities: &[SnapshotEntity]) -> Vec<&SnapshotEntity> {
    let mut seen: HashSet<&str> = HashSet::new();
    entities
        .iter()
        .filter(|e| {
            let first = seen.insert(e.name.as_str());
            if !first {
                warn!(table = %e.name, id = %e.id, "Duplicate table name in snapshot, ignoring later occurrence");
            }
            first
        })
        .collect()
}

fn is_removed_entity(item: &LayerItemRef, removed: &HashSet<&str>) -> bool {
    item.kind == LayerItemKind::Entity && removed.contains(item.id.as_str())
}

fn build_history_entry(
    incremental: bool,
    timestamp: i64,
    snapshot: &SchemaSnapshot,
    log: ChangeLog,
) -> HistoryEntry {
    let mut summary = log.summary();

    if incremental {
        HistoryEntry {
            timestamp,
            entry_type: EntryType::Incremental,
            summary: Some(summary),
            changes: log.into_changes(),
        }
    } else {
        summary.total_tables = Some(snapshot.entities.len());
        summary.total_columns = Some(snapshot.total_columns());
        summary.total_relationships = Some(snapshot.relationships.len());
        HistoryEntry {
            timestamp,
            entry_type: EntryType::Initial,
            summary: Some(summary),
            changes: None,
        }
    }
}
