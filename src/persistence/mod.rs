//! Export and import of the view model
//!
//! Exported files carry the diagram, its history, the layer order and the
//! settings. Transient UI state is always reset, on the way out and on the
//! way in. Imports are validated on `format` and `version`, the adjacency
//! index is rebuilt rather than trusted, and malformed history entries are
//! dropped.

use crate::graph::build_index;
use crate::models::{
    DiagramSettings, DiagramUiState, EntityNode, EntryType, ErDiagram, GlobalUiState, HistoryEntry,
    LayerOrder, Rectangle, RelationshipEdge, TextBox, ViewModel, VIEW_MODEL_FORMAT,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Invalid JSON format")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Invalid format: expected 'relavue-er'")]
    InvalidFormat,

    #[error("Invalid version: must be >= 1")]
    InvalidVersion,

    #[error("Malformed field '{field}': {source}")]
    Malformed {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Copy of `vm` with transient state reset, ready to be written out
pub fn export_view_model(vm: &ViewModel) -> ViewModel {
    let diagram = &vm.er_diagram;
    ViewModel {
        format: vm.format.clone(),
        version: vm.version,
        er_diagram: ErDiagram {
            nodes: diagram.nodes.clone(),
            edges: diagram.edges.clone(),
            rectangles: diagram.rectangles.clone(),
            texts: diagram.texts.clone(),
            index: diagram.index.clone(),
            history: diagram.history.clone(),
            ui: DiagramUiState {
                is_locked: false,
                ..diagram.ui.without_transients()
            },
            loading: false,
        },
        ui: GlobalUiState::default(),
        settings: vm.settings.clone(),
    }
}

/// Pretty-printed export document
pub fn to_export_json(vm: &ViewModel) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&export_view_model(vm))
}

/// Parse and normalise an exported document
pub fn import_view_model(json: &str) -> Result<ViewModel, ImportError> {
    let data: Value = serde_json::from_str(json).map_err(ImportError::InvalidJson)?;
    let Value::Object(root) = data else {
        return Err(ImportError::InvalidFormat);
    };

    if root.get("format").and_then(Value::as_str) != Some(VIEW_MODEL_FORMAT) {
        return Err(ImportError::InvalidFormat);
    }

    let version = root
        .get("version")
        .and_then(Value::as_f64)
        .filter(|v| *v >= 1.0)
        .ok_or(ImportError::InvalidVersion)?;

    let empty = Map::new();
    let diagram = root
        .get("erDiagram")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let nodes: BTreeMap<String, EntityNode> = field(diagram, "nodes")?;
    let edges: BTreeMap<String, RelationshipEdge> = field(diagram, "edges")?;
    let rectangles: BTreeMap<String, Rectangle> = field(diagram, "rectangles")?;
    let texts: BTreeMap<String, TextBox> = field(diagram, "texts")?;
    let layer_order: LayerOrder = match diagram.get("ui").and_then(Value::as_object) {
        Some(ui) => field(ui, "layerOrder")?,
        None => LayerOrder::default(),
    };
    let settings: DiagramSettings = field(&root, "settings")?;
    let history = import_history(diagram.get("history"));

    let index = build_index(&nodes, &edges);

    info!(
        nodes = nodes.len(),
        edges = edges.len(),
        history = history.len(),
        "Imported view model"
    );

    Ok(ViewModel {
        format: VIEW_MODEL_FORMAT.to_string(),
        version: version as u32,
        er_diagram: ErDiagram {
            nodes,
            edges,
            rectangles,
            texts,
            index,
            history,
            ui: DiagramUiState {
                layer_order,
                ..DiagramUiState::default()
            },
            loading: false,
        },
        ui: GlobalUiState::default(),
        settings,
    })
}

/// Decode `name` from `obj`; missing or null yields the default
fn field<T>(obj: &Map<String, Value>, name: &'static str) -> Result<T, ImportError>
where
    T: DeserializeOwned + Default,
{
    match obj.get(name) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => T::deserialize(value).map_err(|source| ImportError::Malformed {
            field: name,
            source,
        }),
    }
}

/// Keep every entry with a numeric `timestamp` and a known `entryType`
fn import_history(raw: Option<&Value>) -> Vec<HistoryEntry> {
    let Some(Value::Array(entries)) = raw else {
        return Vec::new();
    };

    let kept: Vec<HistoryEntry> = entries.iter().filter_map(history_entry).collect();

    let dropped = entries.len() - kept.len();
    if dropped > 0 {
        warn!(dropped, kept = kept.len(), "Dropped malformed history entries on import");
    }
    kept
}

/// Rebuild one entry from a `{timestamp: number, entryType}` object.
///
/// Anything without that shape is dropped. A `summary` or `changes` value that
/// does not decode is left out while the entry itself is kept.
fn history_entry(raw: &Value) -> Option<HistoryEntry> {
    let obj = raw.as_object()?;
    let timestamp = obj.get("timestamp").and_then(Value::as_f64)?;
    let entry_type = match obj.get("entryType").and_then(Value::as_str)? {
        "initial" => EntryType::Initial,
        "incremental" => EntryType::Incremental,
        _ => return None,
    };

    Some(HistoryEntry {
        timestamp: timestamp as i64,
        entry_type,
        summary: lenient(obj, "summary"),
        changes: lenient(obj, "changes"),
    })
}

fn lenient<T: DeserializeOwned>(obj: &Map<String, Value>, name: &str) -> Option<T> {
    let value = obj.get(name).filter(|v| !v.is_null())?;
    match T::deserialize(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            debug!(field = name, error = %e, "Ignoring undecodable history detail");
            None
        }
    }
}
