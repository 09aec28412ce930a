//! Change detection between the previous diagram and a new snapshot
//!
//! Columns are compared by name inside a matched table. Relationships are
//! compared by identity key: the constraint name when there is one, else the
//! structural signature `table.column->table.column`.

use crate::models::{
    Column, ColumnChanges, ColumnModification, ColumnRef, ColumnSnapshot, EntityNode,
    HistoryChanges, HistorySummary, RelationshipChanges, RelationshipEdge, RelationshipRef,
    TableChanges,
};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Everything one reconciliation call detected
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeLog {
    pub added_tables: Vec<String>,
    pub removed_tables: Vec<String>,
    pub added_columns: Vec<ColumnRef>,
    pub removed_columns: Vec<ColumnRef>,
    pub modified_columns: Vec<ColumnModification>,
    pub added_relationships: Vec<RelationshipRef>,
    pub removed_relationships: Vec<RelationshipRef>,
}

impl ChangeLog {
    /// The seven delta counters
    pub fn summary(&self) -> HistorySummary {
        HistorySummary {
            added_tables: self.added_tables.len(),
            removed_tables: self.removed_tables.len(),
            added_columns: self.added_columns.len(),
            removed_columns: self.removed_columns.len(),
            modified_columns: self.modified_columns.len(),
            added_relationships: self.added_relationships.len(),
            removed_relationships: self.removed_relationships.len(),
            ..Default::default()
        }
    }

    /// Detailed lists grouped for the history entry; `None` when nothing changed
    pub fn into_changes(self) -> Option<HistoryChanges> {
        let mut changes = HistoryChanges::default();

        if !self.added_tables.is_empty() || !self.removed_tables.is_empty() {
            changes.tables = Some(TableChanges {
                added: self.added_tables,
                removed: self.removed_tables,
            });
        }

        if !self.added_columns.is_empty()
            || !self.removed_columns.is_empty()
            || !self.modified_columns.is_empty()
        {
            changes.columns = Some(ColumnChanges {
                added: self.added_columns,
                removed: self.removed_columns,
                modified: self.modified_columns,
            });
        }

        if !self.added_relationships.is_empty() || !self.removed_relationships.is_empty() {
            changes.relationships = Some(RelationshipChanges {
                added: self.added_relationships,
                removed: self.removed_relationships,
            });
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes)
        }
    }
}

/// Diff helpers used by the reconciliation engine
pub struct DiffEngine;

impl DiffEngine {
    /// Compare the columns of a matched table and record the differences
    pub fn diff_columns(table_name: &str, before: &[Column], after: &[Column], log: &mut ChangeLog) {
        let before_by_name: HashMap<&str, &Column> =
            before.iter().map(|c| (c.name.as_str(), c)).collect();
        let after_names: HashSet<&str> = after.iter().map(|c| c.name.as_str()).collect();

        for col in after {
            match before_by_name.get(col.name.as_str()) {
                None => log.added_columns.push(column_ref(table_name, &col.name)),
                Some(old) => {
                    if old.key != col.key || old.is_foreign_key != col.is_foreign_key {
                        log.modified_columns.push(ColumnModification {
                            table_name: table_name.to_string(),
                            column_name: col.name.clone(),
                            before: column_snapshot(old),
                            after: column_snapshot(col),
                        });
                    }
                }
            }
        }

        for col in before {
            if !after_names.contains(col.name.as_str()) {
                log.removed_columns.push(column_ref(table_name, &col.name));
            }
        }
    }

    /// Compare two edge sets by identity key and record added/removed relationships.
    ///
    /// Each side resolves names against its own node map.
    pub fn diff_relationships(
        before_nodes: &BTreeMap<String, EntityNode>,
        before_edges: &BTreeMap<String, RelationshipEdge>,
        after_nodes: &BTreeMap<String, EntityNode>,
        after_edges: &BTreeMap<String, RelationshipEdge>,
        log: &mut ChangeLog,
    ) {
        let before_keys: BTreeMap<String, RelationshipRef> = before_edges
            .values()
            .map(|e| (relationship_key(e, before_nodes), relationship_ref(e, before_nodes)))
            .collect();
        let after_keys: BTreeMap<String, RelationshipRef> = after_edges
            .values()
            .map(|e| (relationship_key(e, after_nodes), relationship_ref(e, after_nodes)))
            .collect();

        for (key, rel) in &after_keys {
            if !before_keys.contains_key(key) {
                log.added_relationships.push(rel.clone());
            }
        }

        for (key, rel) in &before_keys {
            if !after_keys.contains_key(key) {
                log.removed_relationships.push(rel.clone());
            }
        }
    }
}

/// Identity key of an edge: constraint name if non-empty, else structural signature
pub fn relationship_key(edge: &RelationshipEdge, nodes: &BTreeMap<String, EntityNode>) -> String {
    match edge.constraint_name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            let rel = relationship_ref(edge, nodes);
            structural_signature(&rel.from_table, &rel.from_column, &rel.to_table, &rel.to_column)
        }
    }
}

/// `sourceTable.sourceColumn->targetTable.targetColumn`
pub fn structural_signature(from_table: &str, from_column: &str, to_table: &str, to_column: &str) -> String {
    format!("{from_table}.{from_column}->{to_table}.{to_column}")
}

/// Describe an edge by table and column names. Unresolvable parts become empty strings.
pub fn relationship_ref(edge: &RelationshipEdge, nodes: &BTreeMap<String, EntityNode>) -> RelationshipRef {
    let source = nodes.get(&edge.source_entity_id);
    let target = nodes.get(&edge.target_entity_id);

    let name_of = |node: Option<&EntityNode>| node.map(|n| n.name.clone()).unwrap_or_default();
    let column_of = |node: Option<&EntityNode>, column_id: &str| {
        node.and_then(|n| n.column(column_id))
            .map(|c| c.name.clone())
            .unwrap_or_default()
    };

    RelationshipRef {
        constraint_name: edge.constraint_name.clone().filter(|n| !n.is_empty()),
        from_table: name_of(source),
        from_column: column_of(source, &edge.source_column_id),
        to_table: name_of(target),
        to_column: column_of(target, &edge.target_column_id),
    }
}

fn column_ref(table_name: &str, column_name: &str) -> ColumnRef {
    ColumnRef {
        table_name: table_name.to_string(),
        column_name: column_name.to_string(),
    }
}

fn column_snapshot(col: &Column) -> ColumnSnapshot {
    ColumnSnapshot {
        key: col.key,
        is_foreign_key: col.is_foreign_key,
    }
}
