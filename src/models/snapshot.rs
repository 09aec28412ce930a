//! Schema snapshot input
//!
//! What the introspection collaborator hands over on every run. Ids inside a
//! snapshot are only meaningful within that snapshot; names are the stable key.

use crate::models::diagram::Column;
use serde::{Deserialize, Serialize};

/// Where the snapshot came from
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSource {
    #[serde(default)]
    pub dialect: String,
    #[serde(default)]
    pub database: String,
}

/// A table as introspected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEntity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub ddl: String,
}

/// A foreign key as introspected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRelationship {
    pub id: String,
    pub from_entity_id: String,
    pub from_column_id: String,
    pub to_entity_id: String,
    pub to_column_id: String,
    #[serde(default)]
    pub constraint_name: Option<String>,
}

/// Complete schema capture at a point in time
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSnapshot {
    #[serde(default)]
    pub source: SnapshotSource,
    #[serde(default)]
    pub entities: Vec<SnapshotEntity>,
    #[serde(default)]
    pub relationships: Vec<SnapshotRelationship>,
}

impl SchemaSnapshot {
    pub fn total_columns(&self) -> usize {
        self.entities.iter().map(|e| e.columns.len()).sum()
    }
}

/// Connection parameters of the last reverse-engineering run (never the password)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    #[serde(rename = "type")]
    pub dialect: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub database: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}
