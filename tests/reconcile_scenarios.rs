//! End-to-end reconciliation scenarios: first import, incremental merge,
//! removal and the history they leave behind.

use pretty_assertions::assert_eq;
use schemaflow_diagram::highlight::{resolve, Focus};
use schemaflow_diagram::models::{
    Column, ColumnKey, EntryType, ErDiagram, SchemaSnapshot, SnapshotEntity, SnapshotRelationship,
    SnapshotSource,
};
use schemaflow_diagram::reconcile::{LayoutConfig, ReconciliationEngine};

fn column(id: &str, name: &str, key: Option<ColumnKey>) -> Column {
    Column {
        id: id.into(),
        name: name.into(),
        key,
        is_foreign_key: key == Some(ColumnKey::Foreign),
    }
}

fn entity(id: &str, name: &str, columns: Vec<Column>) -> SnapshotEntity {
    SnapshotEntity {
        id: id.into(),
        name: name.into(),
        columns,
        ddl: format!("CREATE TABLE `{name}` (...)"),
    }
}

fn relationship(
    id: &str,
    from: (&str, &str),
    to: (&str, &str),
    constraint: &str,
) -> SnapshotRelationship {
    SnapshotRelationship {
        id: id.into(),
        from_entity_id: from.0.into(),
        from_column_id: from.1.into(),
        to_entity_id: to.0.into(),
        to_column_id: to.1.into(),
        constraint_name: Some(constraint.into()),
    }
}

/// users, posts.user_id -> users.id
fn blog() -> SchemaSnapshot {
    SchemaSnapshot {
        source: SnapshotSource {
            dialect: "mysql".into(),
            database: "blog".into(),
        },
        entities: vec![
            entity("E1", "users", vec![column("usersIdCol", "id", Some(ColumnKey::Primary))]),
            entity(
                "E2",
                "posts",
                vec![
                    column("postsIdCol", "id", Some(ColumnKey::Primary)),
                    column("postsUserIdCol", "user_id", Some(ColumnKey::Foreign)),
                ],
            ),
        ],
        relationships: vec![relationship(
            "R1",
            ("E2", "postsUserIdCol"),
            ("E1", "usersIdCol"),
            "posts_ibfk_1",
        )],
    }
}

/// blog plus comments.post_id -> posts.id
fn blog_with_comments() -> SchemaSnapshot {
    let mut snap = blog();
    snap.entities.push(entity(
        "E3",
        "comments",
        vec![
            column("commentsIdCol", "id", Some(ColumnKey::Primary)),
            column("commentsPostIdCol", "post_id", Some(ColumnKey::Foreign)),
        ],
    ));
    snap.relationships.push(relationship(
        "R2",
        ("E3", "commentsPostIdCol"),
        ("E2", "postsIdCol"),
        "comments_ibfk_1",
    ));
    snap
}

#[test]
fn first_import_builds_initial_history() {
    let engine = ReconciliationEngine::default();
    let out = engine.reconcile(&ErDiagram::default(), &blog());

    assert_eq!(out.nodes.len(), 2);
    assert_eq!(out.edges.len(), 1);
    assert_eq!(out.history.len(), 1);

    let entry = &out.history[0];
    assert_eq!(entry.entry_type, EntryType::Initial);
    let summary = entry.summary.as_ref().unwrap();
    assert_eq!(summary.total_tables, Some(2));
    assert_eq!(summary.total_columns, Some(3));
    assert_eq!(summary.total_relationships, Some(1));
    assert!(entry.changes.is_none());
}

#[test]
fn incremental_merge_keeps_layout_and_places_new_table_to_the_right() {
    let engine = ReconciliationEngine::default();
    let first = engine.reconcile(&ErDiagram::default(), &blog());
    let second = engine.reconcile(&first, &blog_with_comments());

    assert_eq!(second.history.len(), 2);
    assert_eq!(second.history[0], first.history[0]);

    let entry = &second.history[1];
    assert_eq!(entry.entry_type, EntryType::Incremental);
    let summary = entry.summary.as_ref().unwrap();
    assert_eq!(summary.added_tables, 1);
    assert_eq!(summary.added_relationships, 1);
    assert_eq!(summary.total_tables, None);

    let changes = entry.changes.as_ref().unwrap();
    assert_eq!(changes.tables.as_ref().unwrap().added, vec!["comments".to_string()]);
    assert!(changes.columns.is_none());

    for (id, before) in &first.nodes {
        let after = &second.nodes[id];
        assert_eq!((after.x, after.y), (before.x, before.y), "{} moved", before.name);
    }

    let max_x = first.nodes.values().map(|n| n.x).fold(f64::MIN, f64::max);
    let comments = second.nodes.values().find(|n| n.name == "comments").unwrap();
    assert!(comments.x >= max_x + LayoutConfig::default().horizontal_spacing);
}

#[test]
fn identical_snapshot_is_a_noop_apart_from_history() {
    let engine = ReconciliationEngine::default();
    let first = engine.reconcile(&ErDiagram::default(), &blog());
    let second = engine.reconcile(&first, &blog());

    assert_eq!(second.nodes, first.nodes);
    assert_eq!(second.edges, first.edges);
    assert_eq!(second.index, first.index);

    let entry = second.history.last().unwrap();
    assert!(entry.summary.as_ref().unwrap().is_noop());
    assert!(entry.changes.is_none());
}

#[test]
fn dropped_table_takes_its_relationships_with_it() {
    let engine = ReconciliationEngine::default();
    let full = engine.reconcile(&ErDiagram::default(), &blog_with_comments());

    let mut snap = blog_with_comments();
    snap.entities.retain(|e| e.name != "posts");

    let out = engine.reconcile(&full, &snap);
    assert!(out.nodes.values().all(|n| n.name != "posts"));
    // both relationships touched posts and are gone
    assert!(out.edges.is_empty());
    assert!(out.index.entity_to_edges.is_empty());

    let changes = out.history[1].changes.as_ref().unwrap();
    assert_eq!(changes.tables.as_ref().unwrap().removed, vec!["posts".to_string()]);
    let removed: Vec<_> = changes
        .relationships
        .as_ref()
        .unwrap()
        .removed
        .iter()
        .filter_map(|r| r.constraint_name.clone())
        .collect();
    assert_eq!(removed, vec!["comments_ibfk_1".to_string(), "posts_ibfk_1".to_string()]);
}

#[test]
fn column_changes_are_reported_per_table() {
    let engine = ReconciliationEngine::default();
    let first = engine.reconcile(&ErDiagram::default(), &blog());

    let mut snap = blog();
    let posts = &mut snap.entities[1];
    posts.columns.push(column("postsTitleCol", "title", None));
    posts.columns[1].key = None;
    posts.columns[1].is_foreign_key = false;

    let out = engine.reconcile(&first, &snap);
    let columns = out.history[1].changes.as_ref().unwrap().columns.clone().unwrap();
    assert_eq!(columns.added.len(), 1);
    assert_eq!(columns.added[0].column_name, "title");
    assert_eq!(columns.modified.len(), 1);
    assert_eq!(columns.modified[0].column_name, "user_id");
    assert_eq!(columns.modified[0].before.key, Some(ColumnKey::Foreign));
    assert_eq!(columns.modified[0].after.key, None);
}

#[test]
fn merged_diagram_supports_one_hop_highlight() {
    let engine = ReconciliationEngine::default();
    let out = engine.reconcile(&ErDiagram::default(), &blog_with_comments());

    let set = resolve(&out.index, &out.edges, &Focus::entity("E2")).unwrap();
    assert_eq!(set.node_ids, vec!["E2", "E1", "E3"]);
    assert_eq!(set.edge_ids, vec!["R1", "R2"]);
    assert!(set.column_ids.contains(&"usersIdCol".to_string()));
    assert!(set.column_ids.contains(&"commentsPostIdCol".to_string()));
}

#[test]
fn history_serializes_with_camel_case_wire_names() {
    let engine = ReconciliationEngine::default();
    let first = engine.reconcile_at(&ErDiagram::default(), &blog(), 1_700_000_000_000);
    let second = engine.reconcile_at(&first, &blog_with_comments(), 1_700_000_060_000);

    let json = serde_json::to_value(&second.history).unwrap();
    assert_eq!(json[0]["entryType"], "initial");
    assert_eq!(json[0]["summary"]["totalTables"], 2);
    assert!(json[0].get("changes").is_none());
    assert_eq!(json[1]["timestamp"], 1_700_000_060_000_i64);
    assert_eq!(json[1]["summary"]["addedTables"], 1);
    assert_eq!(json[1]["changes"]["tables"]["added"][0], "comments");
    assert_eq!(
        json[1]["changes"]["relationships"]["added"][0]["constraintName"],
        "comments_ibfk_1"
    );
}
