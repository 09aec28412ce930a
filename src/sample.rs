//! Built-in sample schema
//!
//! A small project-management database used to demo the diagram without a
//! live connection. Ids are freshly generated on every call, the same way an
//! introspection run would hand them out.

use crate::models::{
    Column, ColumnKey, SchemaSnapshot, SnapshotEntity, SnapshotRelationship, SnapshotSource,
};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone, Copy)]
enum Key {
    Plain,
    Primary,
    Foreign,
    /// Part of a composite primary key that also references another table
    PrimaryForeign,
}

use Key::*;

const TABLES: &[(&str, &[(&str, Key)])] = &[
    (
        "users",
        &[
            ("id", Primary),
            ("username", Plain),
            ("email", Plain),
            ("password_hash", Plain),
            ("first_name", Plain),
            ("last_name", Plain),
            ("avatar_url", Plain),
            ("is_active", Plain),
            ("last_login", Plain),
            ("created_at", Plain),
            ("updated_at", Plain),
        ],
    ),
    (
        "user_profiles",
        &[
            ("id", Primary),
            ("user_id", Foreign),
            ("bio", Plain),
            ("phone", Plain),
            ("website", Plain),
            ("location", Plain),
            ("birth_date", Plain),
            ("privacy_level", Plain),
        ],
    ),
    (
        "roles",
        &[
            ("id", Primary),
            ("name", Plain),
            ("description", Plain),
            ("is_active", Plain),
        ],
    ),
    (
        "user_roles",
        &[
            ("user_id", PrimaryForeign),
            ("role_id", PrimaryForeign),
            ("assigned_at", Plain),
            ("assigned_by", Foreign),
        ],
    ),
    (
        "organizations",
        &[
            ("id", Primary),
            ("name", Plain),
            ("description", Plain),
            ("website", Plain),
            ("logo_url", Plain),
            ("created_by", Foreign),
            ("created_at", Plain),
        ],
    ),
    (
        "teams",
        &[
            ("id", Primary),
            ("organization_id", Foreign),
            ("name", Plain),
            ("description", Plain),
            ("team_lead_id", Foreign),
            ("created_at", Plain),
        ],
    ),
    (
        "team_members",
        &[
            ("team_id", PrimaryForeign),
            ("user_id", PrimaryForeign),
            ("role", Plain),
            ("joined_at", Plain),
        ],
    ),
    (
        "projects",
        &[
            ("id", Primary),
            ("organization_id", Foreign),
            ("name", Plain),
            ("description", Plain),
            ("status", Plain),
            ("priority", Plain),
            ("start_date", Plain),
            ("end_date", Plain),
            ("budget", Plain),
            ("created_by", Foreign),
            ("created_at", Plain),
        ],
    ),
    (
        "project_teams",
        &[
            ("project_id", PrimaryForeign),
            ("team_id", PrimaryForeign),
            ("assigned_at", Plain),
        ],
    ),
    (
        "tasks",
        &[
            ("id", Primary),
            ("project_id", Foreign),
            ("title", Plain),
            ("description", Plain),
            ("status", Plain),
            ("priority", Plain),
            ("estimated_hours", Plain),
            ("actual_hours", Plain),
            ("due_date", Plain),
            ("assigned_to", Foreign),
            ("created_by", Foreign),
            ("created_at", Plain),
            ("updated_at", Plain),
        ],
    ),
    (
        "task_dependencies",
        &[
            ("task_id", PrimaryForeign),
            ("depends_on_task_id", PrimaryForeign),
            ("created_at", Plain),
        ],
    ),
];

/// (constraint, from table, from column, to table, to column)
const FOREIGN_KEYS: &[(&str, &str, &str, &str, &str)] = &[
    ("user_profiles_ibfk_1", "user_profiles", "user_id", "users", "id"),
    ("user_roles_ibfk_1", "user_roles", "user_id", "users", "id"),
    ("user_roles_ibfk_2", "user_roles", "role_id", "roles", "id"),
    ("user_roles_ibfk_3", "user_roles", "assigned_by", "users", "id"),
    ("organizations_ibfk_1", "organizations", "created_by", "users", "id"),
    ("teams_ibfk_1", "teams", "organization_id", "organizations", "id"),
    ("teams_ibfk_2", "teams", "team_lead_id", "users", "id"),
    ("team_members_ibfk_1", "team_members", "team_id", "teams", "id"),
    ("team_members_ibfk_2", "team_members", "user_id", "users", "id"),
    ("projects_ibfk_1", "projects", "organization_id", "organizations", "id"),
    ("projects_ibfk_2", "projects", "created_by", "users", "id"),
    ("project_teams_ibfk_1", "project_teams", "project_id", "projects", "id"),
    ("project_teams_ibfk_2", "project_teams", "team_id", "teams", "id"),
    ("tasks_ibfk_1", "tasks", "project_id", "projects", "id"),
    ("tasks_ibfk_2", "tasks", "assigned_to", "users", "id"),
    ("tasks_ibfk_3", "tasks", "created_by", "users", "id"),
    ("task_dependencies_ibfk_1", "task_dependencies", "task_id", "tasks", "id"),
    ("task_dependencies_ibfk_2", "task_dependencies", "depends_on_task_id", "tasks", "id"),
];

/// Snapshot of the sample database
pub fn sample_snapshot() -> SchemaSnapshot {
    let mut column_ids: HashMap<(&str, &str), String> = HashMap::new();
    let mut entity_ids: HashMap<&str, String> = HashMap::new();

    let entities = TABLES
        .iter()
        .map(|&(table, columns)| {
            let id = Uuid::new_v4().to_string();
            entity_ids.insert(table, id.clone());

            let columns = columns
                .iter()
                .map(|&(name, key)| {
                    let column_id = Uuid::new_v4().to_string();
                    column_ids.insert((table, name), column_id.clone());
                    Column {
                        id: column_id,
                        name: name.to_string(),
                        key: match key {
                            Plain => None,
                            Primary | PrimaryForeign => Some(ColumnKey::Primary),
                            Foreign => Some(ColumnKey::Foreign),
                        },
                        is_foreign_key: matches!(key, Foreign | PrimaryForeign),
                    }
                })
                .collect();

            SnapshotEntity {
                id,
                name: table.to_string(),
                columns,
                ddl: create_table_ddl(table),
            }
        })
        .collect();

    let relationships = FOREIGN_KEYS
        .iter()
        .filter_map(|&(constraint, from_table, from_col, to_table, to_col)| {
            Some(SnapshotRelationship {
                id: Uuid::new_v4().to_string(),
                from_entity_id: entity_ids.get(from_table)?.clone(),
                from_column_id: column_ids.get(&(from_table, from_col))?.clone(),
                to_entity_id: entity_ids.get(to_table)?.clone(),
                to_column_id: column_ids.get(&(to_table, to_col))?.clone(),
                constraint_name: Some(constraint.to_string()),
            })
        })
        .collect();

    SchemaSnapshot {
        source: SnapshotSource {
            dialect: "mysql".to_string(),
            database: "erviewer".to_string(),
        },
        entities,
        relationships,
    }
}

fn create_table_ddl(table: &str) -> String {
    let columns = TABLES
        .iter()
        .find(|(name, _)| *name == table)
        .map(|(_, columns)| *columns)
        .unwrap_or_default();

    let mut lines: Vec<String> = columns.iter().map(|(name, _)| format!("    {name}")).collect();

    let primary: Vec<&str> = columns
        .iter()
        .filter(|(_, key)| matches!(key, Primary | PrimaryForeign))
        .map(|(name, _)| *name)
        .collect();
    if !primary.is_empty() {
        lines.push(format!("    PRIMARY KEY ({})", primary.join(", ")));
    }

    for (constraint, _, from_col, to_table, to_col) in
        FOREIGN_KEYS.iter().filter(|fk| fk.1 == table)
    {
        lines.push(format!(
            "    CONSTRAINT {constraint} FOREIGN KEY ({from_col}) REFERENCES {to_table}({to_col})"
        ));
    }

    format!("CREATE TABLE {table} (\n{}\n);", lines.join(",\n"))
}
