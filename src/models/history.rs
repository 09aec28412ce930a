//! Reconciliation history
//!
//! One immutable audit record per reconciliation call.

use crate::models::diagram::ColumnKey;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Whether the entry came from the first merge or a later one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Initial,
    Incremental,
}

/// Delta counters, plus totals on the initial entry
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    #[serde(default)]
    pub added_tables: usize,
    #[serde(default)]
    pub removed_tables: usize,
    #[serde(default)]
    pub added_columns: usize,
    #[serde(default)]
    pub removed_columns: usize,
    #[serde(default)]
    pub modified_columns: usize,
    #[serde(default)]
    pub added_relationships: usize,
    #[serde(default)]
    pub removed_relationships: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tables: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_columns: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_relationships: Option<usize>,
}

impl HistorySummary {
    /// True when all seven delta counters are zero
    pub fn is_noop(&self) -> bool {
        self.added_tables == 0
            && self.removed_tables == 0
            && self.added_columns == 0
            && self.removed_columns == 0
            && self.modified_columns == 0
            && self.added_relationships == 0
            && self.removed_relationships == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnRef {
    pub table_name: String,
    pub column_name: String,
}

/// The two column fields whose change counts as a modification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSnapshot {
    pub key: Option<ColumnKey>,
    pub is_foreign_key: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnModification {
    pub table_name: String,
    pub column_name: String,
    pub before: ColumnSnapshot,
    pub after: ColumnSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_name: Option<String>,
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableChanges {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColumnChanges {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<ColumnRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<ColumnRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modified: Vec<ColumnModification>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RelationshipChanges {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<RelationshipRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub removed: Vec<RelationshipRef>,
}

/// Detailed change lists. Only groups with content are present.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HistoryChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tables: Option<TableChanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<ColumnChanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<RelationshipChanges>,
}

impl HistoryChanges {
    pub fn is_empty(&self) -> bool {
        self.tables.is_none() && self.columns.is_none() && self.relationships.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Milliseconds since the Unix epoch
    #[serde(deserialize_with = "millis_from_number")]
    pub timestamp: i64,
    pub entry_type: EntryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<HistorySummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<HistoryChanges>,
}

/// Any JSON number; fractional milliseconds are truncated
fn millis_from_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = f64::deserialize(deserializer)?;
    if !millis.is_finite() {
        return Err(D::Error::custom("timestamp must be a finite number"));
    }
    Ok(millis as i64)
}
