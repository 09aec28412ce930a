//! Diagram data actions
//!
//! Snapshot merging plus the geometry updates reported by the renderer.

use crate::highlight;
use crate::models::{ConnectionInfo, SchemaSnapshot, ViewModel};
use crate::reconcile::ReconciliationEngine;
use crate::store::Transition;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// New position for one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

/// Measured size for one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NodeSize {
    pub id: String,
    #[validate(range(min = 0.0))]
    pub width: f64,
    #[validate(range(min = 0.0))]
    pub height: f64,
}

/// Reconcile `snapshot` into the diagram and remember the connection it came from
pub fn merge_snapshot(
    vm: &ViewModel,
    engine: &ReconciliationEngine,
    snapshot: &SchemaSnapshot,
    connection: Option<ConnectionInfo>,
) -> Transition<ViewModel> {
    let er_diagram = engine.reconcile(&vm.er_diagram, snapshot);

    let mut next = vm.clone();
    next.er_diagram = er_diagram;
    if connection.is_some() {
        next.settings.last_database_connection = connection;
    }
    highlight::refresh_selection(&mut next);
    Transition::Changed(next)
}

pub fn set_loading(vm: &ViewModel, loading: bool) -> Transition<ViewModel> {
    if vm.er_diagram.loading == loading {
        return Transition::Unchanged;
    }
    let mut next = vm.clone();
    next.er_diagram.loading = loading;
    Transition::Changed(next)
}

/// Move nodes; unknown ids are ignored
pub fn update_node_positions(vm: &ViewModel, positions: &[NodePosition]) -> Transition<ViewModel> {
    let dirty = positions.iter().any(|p| {
        vm.er_diagram
            .nodes
            .get(&p.id)
            .is_some_and(|n| n.x != p.x || n.y != p.y)
    });
    if !dirty {
        return Transition::Unchanged;
    }

    let mut next = vm.clone();
    for p in positions {
        if let Some(node) = next.er_diagram.nodes.get_mut(&p.id) {
            node.x = p.x;
            node.y = p.y;
        }
    }
    Transition::Changed(next)
}

/// Record measured sizes; unknown ids are ignored
pub fn update_node_sizes(vm: &ViewModel, sizes: &[NodeSize]) -> Transition<ViewModel> {
    let dirty = sizes.iter().any(|s| {
        vm.er_diagram
            .nodes
            .get(&s.id)
            .is_some_and(|n| n.width != s.width || n.height != s.height)
    });
    if !dirty {
        return Transition::Unchanged;
    }

    let mut next = vm.clone();
    for s in sizes {
        if let Some(node) = next.er_diagram.nodes.get_mut(&s.id) {
            node.width = s.width;
            node.height = s.height;
        }
    }
    Transition::Changed(next)
}
