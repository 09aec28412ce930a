//! Diagram state models
//!
//! The editable ER diagram: entity nodes, relationship edges, user
//! annotations, the derived adjacency index and transient UI state.

use crate::graph::GraphIndex;
use crate::models::history::HistoryEntry;
use crate::models::snapshot::ConnectionInfo;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Format tag written into every exported file
pub const VIEW_MODEL_FORMAT: &str = "relavue-er";

/// Current export format version
pub const VIEW_MODEL_VERSION: u32 = 1;

/// Shared, immutable list of highlighted ids.
///
/// Actions hand back the existing `Arc` when the content is unchanged, so
/// consumers can skip work with `Arc::ptr_eq`.
pub type HighlightIds = Arc<[String]>;

/// Empty highlight list
pub fn empty_highlight() -> HighlightIds {
    Arc::from(Vec::<String>::new())
}

/// Column key marker as reported by introspection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKey {
    #[serde(rename = "PRI")]
    Primary,
    #[serde(rename = "FOREIGN")]
    Foreign,
}

/// A column owned by exactly one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub key: Option<ColumnKey>,
    #[serde(default)]
    pub is_foreign_key: bool,
}

/// An entity (table) placed on the canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityNode {
    pub id: String,
    /// Cross-snapshot matching key
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub ddl: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    /// 0 until measured by the renderer
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl EntityNode {
    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }
}

/// A foreign-key relationship between two entity columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipEdge {
    pub id: String,
    pub source_entity_id: String,
    pub target_entity_id: String,
    pub source_column_id: String,
    pub target_column_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_name: Option<String>,
}

/// User-drawn rectangle annotation. Styling fields are carried as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rectangle {
    pub id: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(flatten)]
    pub style: serde_json::Map<String, serde_json::Value>,
}

/// User-placed text annotation. Styling fields are carried as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBox {
    pub id: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub style: serde_json::Map<String, serde_json::Value>,
}

/// Kind of item that can be layered or selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerItemKind {
    Entity,
    Relation,
    Rectangle,
    Text,
}

/// Reference to a layered item
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerItemRef {
    pub kind: LayerItemKind,
    pub id: String,
}

impl LayerItemRef {
    pub fn new(kind: LayerItemKind, id: impl Into<String>) -> Self {
        Self { kind, id: id.into() }
    }

    pub fn entity(id: impl Into<String>) -> Self {
        Self::new(LayerItemKind::Entity, id)
    }
}

/// Which layer section an item lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerPosition {
    Background,
    Foreground,
}

/// Z-order of annotations and entities
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerOrder {
    #[serde(default)]
    pub background_items: Vec<LayerItemRef>,
    #[serde(default)]
    pub foreground_items: Vec<LayerItemRef>,
}

impl LayerOrder {
    pub fn items(&self, position: LayerPosition) -> &[LayerItemRef] {
        match position {
            LayerPosition::Background => &self.background_items,
            LayerPosition::Foreground => &self.foreground_items,
        }
    }

    pub fn items_mut(&mut self, position: LayerPosition) -> &mut Vec<LayerItemRef> {
        match position {
            LayerPosition::Background => &mut self.background_items,
            LayerPosition::Foreground => &mut self.foreground_items,
        }
    }
}

/// Kind of element under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HoverKind {
    Entity,
    Edge,
    Column,
}

/// Element currently under the pointer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoverTarget {
    #[serde(rename = "type")]
    pub kind: HoverKind,
    pub id: String,
}

/// Transient, per-diagram interaction state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramUiState {
    #[serde(default)]
    pub hover: Option<HoverTarget>,
    #[serde(default = "empty_highlight")]
    pub highlighted_node_ids: HighlightIds,
    #[serde(default = "empty_highlight")]
    pub highlighted_edge_ids: HighlightIds,
    #[serde(default = "empty_highlight")]
    pub highlighted_column_ids: HighlightIds,
    #[serde(default)]
    pub layer_order: LayerOrder,
    #[serde(default)]
    pub is_dragging_entity: bool,
    #[serde(default)]
    pub is_pan_mode_active: bool,
    #[serde(default)]
    pub is_locked: bool,
}

impl Default for DiagramUiState {
    fn default() -> Self {
        Self {
            hover: None,
            highlighted_node_ids: empty_highlight(),
            highlighted_edge_ids: empty_highlight(),
            highlighted_column_ids: empty_highlight(),
            layer_order: LayerOrder::default(),
            is_dragging_entity: false,
            is_pan_mode_active: false,
            is_locked: false,
        }
    }
}

impl DiagramUiState {
    /// Same state with every transient field reset; layer order and lock survive.
    pub fn without_transients(&self) -> Self {
        Self {
            layer_order: self.layer_order.clone(),
            is_locked: self.is_locked,
            ..Self::default()
        }
    }

    pub fn has_highlights(&self) -> bool {
        !self.highlighted_node_ids.is_empty()
            || !self.highlighted_edge_ids.is_empty()
            || !self.highlighted_column_ids.is_empty()
    }
}

/// The diagram subtree replaced wholesale by reconciliation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErDiagram {
    #[serde(default)]
    pub nodes: BTreeMap<String, EntityNode>,
    #[serde(default)]
    pub edges: BTreeMap<String, RelationshipEdge>,
    #[serde(default)]
    pub rectangles: BTreeMap<String, Rectangle>,
    #[serde(default)]
    pub texts: BTreeMap<String, TextBox>,
    #[serde(default)]
    pub index: GraphIndex,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub ui: DiagramUiState,
    #[serde(default)]
    pub loading: bool,
}

/// Application-wide UI state
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalUiState {
    #[serde(default)]
    pub selected_item: Option<LayerItemRef>,
}

/// Persisted user settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_database_connection: Option<ConnectionInfo>,
    /// Settings this crate does not interpret (locale, etc.)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Root state held by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    pub format: String,
    pub version: u32,
    pub er_diagram: ErDiagram,
    #[serde(default)]
    pub ui: GlobalUiState,
    #[serde(default)]
    pub settings: DiagramSettings,
}

impl Default for ViewModel {
    fn default() -> Self {
        Self {
            format: VIEW_MODEL_FORMAT.to_string(),
            version: VIEW_MODEL_VERSION,
            er_diagram: ErDiagram::default(),
            ui: GlobalUiState::default(),
            settings: DiagramSettings::default(),
        }
    }
}
