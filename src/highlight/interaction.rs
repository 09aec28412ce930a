//! Pointer interaction actions
//!
//! Hover, selection, drag and pan transitions over the view model. Each
//! action is pure and reports [`Transition::Unchanged`] when the state would
//! stay the same, including when highlight lists only differ in order.

use crate::highlight::resolver::{resolve, reuse_if_same, Focus, HighlightSet};
use crate::models::{
    DiagramUiState, HighlightIds, HoverKind, HoverTarget, LayerItemKind, LayerItemRef, ViewModel,
};
use crate::store::Transition;
use std::sync::Arc;
use tracing::{debug, warn};

/// Where the pointer interaction currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    HoverNode,
    HoverEdge,
    HoverColumn,
    Selected(LayerItemKind),
}

/// Derive the interaction state from the view model
pub fn interaction_state(vm: &ViewModel) -> InteractionState {
    let selected = vm.ui.selected_item.as_ref().map(|item| item.kind);
    if selected == Some(LayerItemKind::Entity) {
        return InteractionState::Selected(LayerItemKind::Entity);
    }
    match (&vm.er_diagram.ui.hover, selected) {
        (Some(h), _) => match h.kind {
            HoverKind::Entity => InteractionState::HoverNode,
            HoverKind::Edge => InteractionState::HoverEdge,
            HoverKind::Column => InteractionState::HoverColumn,
        },
        (None, Some(kind)) => InteractionState::Selected(kind),
        (None, None) => InteractionState::Idle,
    }
}

pub fn hover_entity(vm: &ViewModel, entity_id: &str) -> Transition<ViewModel> {
    hover(vm, Focus::entity(entity_id))
}

pub fn hover_edge(vm: &ViewModel, edge_id: &str) -> Transition<ViewModel> {
    hover(vm, Focus::edge(edge_id))
}

pub fn hover_column(vm: &ViewModel, column_id: &str) -> Transition<ViewModel> {
    hover(vm, Focus::column(column_id))
}

/// Dispatch on the focus kind
pub fn hover(vm: &ViewModel, focus: Focus) -> Transition<ViewModel> {
    let ui = &vm.er_diagram.ui;
    if ui.is_pan_mode_active || ui.is_dragging_entity {
        return Transition::Unchanged;
    }
    if interaction_state(vm) == InteractionState::Selected(LayerItemKind::Entity) {
        return Transition::Unchanged;
    }

    let set = match resolve(&vm.er_diagram.index, &vm.er_diagram.edges, &focus) {
        Ok(set) => set,
        Err(miss) => {
            warn!("{}", miss);
            return Transition::Unchanged;
        }
    };

    let target = HoverTarget {
        kind: focus.kind,
        id: focus.id,
    };
    let (nodes, edges, columns) = reuse_all(set, ui);

    let same_hover = ui.hover.as_ref() == Some(&target);
    if same_hover && same_highlights(ui, &nodes, &edges, &columns) {
        return Transition::Unchanged;
    }

    let mut next = vm.clone();
    let next_ui = &mut next.er_diagram.ui;
    next_ui.hover = Some(target);
    next_ui.highlighted_node_ids = nodes;
    next_ui.highlighted_edge_ids = edges;
    next_ui.highlighted_column_ids = columns;
    Transition::Changed(next)
}

pub fn clear_hover(vm: &ViewModel) -> Transition<ViewModel> {
    let ui = &vm.er_diagram.ui;

    // a selected entity keeps its highlights
    if interaction_state(vm) == InteractionState::Selected(LayerItemKind::Entity) {
        if ui.hover.is_none() {
            return Transition::Unchanged;
        }
        let mut next = vm.clone();
        next.er_diagram.ui.hover = None;
        return Transition::Changed(next);
    }

    if ui.hover.is_none() && !ui.has_highlights() {
        return Transition::Unchanged;
    }

    let mut next = vm.clone();
    clear_pointer(&mut next.er_diagram.ui);
    Transition::Changed(next)
}

/// Select an item, or clear the selection with `None`.
///
/// Selecting an entity freezes its one-hop highlight until the selection changes.
pub fn select_item(vm: &ViewModel, item: Option<LayerItemRef>) -> Transition<ViewModel> {
    let ui = &vm.er_diagram.ui;
    let mut next_ui = ui.clone();

    match &item {
        Some(LayerItemRef {
            kind: LayerItemKind::Entity,
            id,
        }) => {
            let set = resolve(&vm.er_diagram.index, &vm.er_diagram.edges, &Focus::entity(id.as_str()))
                .unwrap_or_default();
            let (nodes, edges, columns) = reuse_all(set, ui);
            next_ui.highlighted_node_ids = nodes;
            next_ui.highlighted_edge_ids = edges;
            next_ui.highlighted_column_ids = columns;
        }
        _ => clear_pointer(&mut next_ui),
    }

    if vm.ui.selected_item == item
        && next_ui.hover == ui.hover
        && same_highlights(
            ui,
            &next_ui.highlighted_node_ids,
            &next_ui.highlighted_edge_ids,
            &next_ui.highlighted_column_ids,
        )
    {
        return Transition::Unchanged;
    }

    debug!(selected = ?item, "Selection changed");
    let mut next = vm.clone();
    next.ui.selected_item = item;
    next.er_diagram.ui = next_ui;
    Transition::Changed(next)
}

pub fn start_entity_drag(vm: &ViewModel) -> Transition<ViewModel> {
    if vm.er_diagram.ui.is_dragging_entity {
        return Transition::Unchanged;
    }
    let mut next = vm.clone();
    next.er_diagram.ui.is_dragging_entity = true;
    clear_pointer(&mut next.er_diagram.ui);
    Transition::Changed(next)
}

pub fn stop_entity_drag(vm: &ViewModel) -> Transition<ViewModel> {
    if !vm.er_diagram.ui.is_dragging_entity {
        return Transition::Unchanged;
    }
    let mut next = vm.clone();
    next.er_diagram.ui.is_dragging_entity = false;
    Transition::Changed(next)
}

pub fn set_pan_mode(vm: &ViewModel, active: bool) -> Transition<ViewModel> {
    if vm.er_diagram.ui.is_pan_mode_active == active {
        return Transition::Unchanged;
    }
    let mut next = vm.clone();
    next.er_diagram.ui.is_pan_mode_active = active;
    Transition::Changed(next)
}

/// Flip the canvas lock
pub fn toggle_lock(vm: &ViewModel) -> Transition<ViewModel> {
    let mut next = vm.clone();
    next.er_diagram.ui.is_locked = !vm.er_diagram.ui.is_locked;
    debug!(locked = next.er_diagram.ui.is_locked, "Lock toggled");
    Transition::Changed(next)
}

/// Bring the selection in line with a freshly merged diagram.
///
/// A selection whose item is gone is dropped. A surviving selected entity
/// gets its frozen one-hop highlight back.
pub fn refresh_selection(vm: &mut ViewModel) {
    let Some(item) = vm.ui.selected_item.as_ref() else {
        return;
    };
    let diagram = &vm.er_diagram;
    let exists = match item.kind {
        LayerItemKind::Entity => diagram.nodes.contains_key(&item.id),
        LayerItemKind::Relation => diagram.edges.contains_key(&item.id),
        LayerItemKind::Rectangle => diagram.rectangles.contains_key(&item.id),
        LayerItemKind::Text => diagram.texts.contains_key(&item.id),
    };

    if !exists {
        debug!(selected = ?item, "Selected item no longer exists, clearing selection");
        vm.ui.selected_item = None;
        clear_pointer(&mut vm.er_diagram.ui);
        return;
    }

    if item.kind == LayerItemKind::Entity {
        let set = resolve(&diagram.index, &diagram.edges, &Focus::entity(item.id.as_str()))
            .unwrap_or_default();
        let (nodes, edges, columns) = reuse_all(set, &diagram.ui);
        let ui = &mut vm.er_diagram.ui;
        ui.highlighted_node_ids = nodes;
        ui.highlighted_edge_ids = edges;
        ui.highlighted_column_ids = columns;
    }
}

fn reuse_all(set: HighlightSet, ui: &DiagramUiState) -> (HighlightIds, HighlightIds, HighlightIds) {
    (
        reuse_if_same(set.node_ids, &ui.highlighted_node_ids),
        reuse_if_same(set.edge_ids, &ui.highlighted_edge_ids),
        reuse_if_same(set.column_ids, &ui.highlighted_column_ids),
    )
}

fn same_highlights(
    ui: &DiagramUiState,
    nodes: &HighlightIds,
    edges: &HighlightIds,
    columns: &HighlightIds,
) -> bool {
    Arc::ptr_eq(nodes, &ui.highlighted_node_ids)
        && Arc::ptr_eq(edges, &ui.highlighted_edge_ids)
        && Arc::ptr_eq(columns, &ui.highlighted_column_ids)
}

fn clear_pointer(ui: &mut DiagramUiState) {
    ui.hover = None;
    ui.highlighted_node_ids = reuse_if_same(Vec::new(), &ui.highlighted_node_ids);
    ui.highlighted_edge_ids = reuse_if_same(Vec::new(), &ui.highlighted_edge_ids);
    ui.highlighted_column_ids = reuse_if_same(Vec::new(), &ui.highlighted_column_ids);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, EntityNode, ErDiagram, RelationshipEdge};
    use pretty_assertions::assert_eq;

    fn changed(t: Transition<ViewModel>) -> ViewModel {
        match t {
            Transition::Changed(vm) => vm,
            Transition::Unchanged => panic!("expected a change"),
        }
    }

    fn node(id: &str, col: &str) -> EntityNode {
        EntityNode {
            id: id.into(),
            name: id.into(),
            columns: vec![Column {
                id: col.into(),
                name: col.into(),
                key: None,
                is_foreign_key: false,
            }],
            ddl: String::new(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
        }
    }

    /// posts.user_id -> users.id
    fn vm() -> ViewModel {
        let mut diagram = ErDiagram::default();
        for n in [node("users", "u-id"), node("posts", "p-uid"), node("tags", "t-id")] {
            diagram.nodes.insert(n.id.clone(), n);
        }
        diagram.edges.insert(
            "fk".into(),
            RelationshipEdge {
                id: "fk".into(),
                source_entity_id: "posts".into(),
                target_entity_id: "users".into(),
                source_column_id: "p-uid".into(),
                target_column_id: "u-id".into(),
                constraint_name: None,
            },
        );
        diagram.index = crate::graph::build_index(&diagram.nodes, &diagram.edges);
        ViewModel {
            er_diagram: diagram,
            ..Default::default()
        }
    }

    #[test]
    fn test_hover_entity_highlights_neighbours() {
        let next = changed(hover_entity(&vm(), "users"));
        let ui = &next.er_diagram.ui;
        assert_eq!(ui.hover, Some(HoverTarget { kind: HoverKind::Entity, id: "users".into() }));
        assert_eq!(&*ui.highlighted_node_ids, &["users".to_string(), "posts".to_string()]);
        assert_eq!(&*ui.highlighted_edge_ids, &["fk".to_string()]);
        assert_eq!(interaction_state(&next), InteractionState::HoverNode);
    }

    #[test]
    fn test_repeated_hover_is_unchanged() {
        let once = changed(hover_entity(&vm(), "users"));
        assert_eq!(hover_entity(&once, "users"), Transition::Unchanged);
    }

    #[test]
    fn test_hover_switch_reuses_equal_lists() {
        // users and posts share the same neighbourhood in this fixture
        let on_users = changed(hover_entity(&vm(), "users"));
        let on_posts = changed(hover_entity(&on_users, "posts"));

        let a = &on_users.er_diagram.ui;
        let b = &on_posts.er_diagram.ui;
        assert!(Arc::ptr_eq(&a.highlighted_node_ids, &b.highlighted_node_ids));
        assert!(Arc::ptr_eq(&a.highlighted_edge_ids, &b.highlighted_edge_ids));
        assert_eq!(b.hover.as_ref().map(|h| h.id.as_str()), Some("posts"));
    }

    #[test]
    fn test_hover_ignored_while_panning_or_dragging() {
        let panning = changed(set_pan_mode(&vm(), true));
        assert_eq!(hover_entity(&panning, "users"), Transition::Unchanged);

        let dragging = changed(start_entity_drag(&vm()));
        assert_eq!(hover_column(&dragging, "u-id"), Transition::Unchanged);
    }

    #[test]
    fn test_hover_miss_is_unchanged() {
        assert_eq!(hover_edge(&vm(), "missing"), Transition::Unchanged);
        assert_eq!(hover_column(&vm(), "missing"), Transition::Unchanged);
    }

    #[test]
    fn test_selected_entity_freezes_highlights() {
        let selected = changed(select_item(&vm(), Some(LayerItemRef::entity("users"))));
        assert_eq!(
            interaction_state(&selected),
            InteractionState::Selected(LayerItemKind::Entity)
        );
        assert_eq!(selected.er_diagram.ui.highlighted_node_ids.len(), 2);

        assert_eq!(hover_entity(&selected, "tags"), Transition::Unchanged);

        let mut hovered = selected.clone();
        hovered.er_diagram.ui.hover = Some(HoverTarget { kind: HoverKind::Entity, id: "users".into() });
        let cleared = changed(clear_hover(&hovered));
        assert!(cleared.er_diagram.ui.hover.is_none());
        assert_eq!(cleared.er_diagram.ui.highlighted_node_ids.len(), 2);

        assert_eq!(clear_hover(&cleared), Transition::Unchanged);
    }

    #[test]
    fn test_selecting_non_entity_clears_highlights_and_hover() {
        let hovered = changed(hover_entity(&vm(), "users"));
        let next = changed(select_item(&hovered, Some(LayerItemRef::new(LayerItemKind::Rectangle, "r1"))));
        assert!(!next.er_diagram.ui.has_highlights());
        assert!(next.er_diagram.ui.hover.is_none());

        assert_eq!(
            select_item(&next, Some(LayerItemRef::new(LayerItemKind::Rectangle, "r1"))),
            Transition::Unchanged
        );
        assert!(changed(select_item(&next, None)).ui.selected_item.is_none());
    }

    #[test]
    fn test_reselecting_same_entity_is_unchanged() {
        let selected = changed(select_item(&vm(), Some(LayerItemRef::entity("users"))));
        assert_eq!(
            select_item(&selected, Some(LayerItemRef::entity("users"))),
            Transition::Unchanged
        );
    }

    #[test]
    fn test_clear_hover_when_idle_is_unchanged() {
        assert_eq!(clear_hover(&vm()), Transition::Unchanged);
        let hovered = changed(hover_edge(&vm(), "fk"));
        let cleared = changed(clear_hover(&hovered));
        assert!(!cleared.er_diagram.ui.has_highlights());
        assert_eq!(interaction_state(&cleared), InteractionState::Idle);
    }

    #[test]
    fn test_toggle_lock_flips_both_ways() {
        let locked = changed(toggle_lock(&vm()));
        assert!(locked.er_diagram.ui.is_locked);
        let unlocked = changed(toggle_lock(&locked));
        assert!(!unlocked.er_diagram.ui.is_locked);
    }

    #[test]
    fn test_refresh_selection_drops_vanished_entity() {
        let mut selected = changed(select_item(&vm(), Some(LayerItemRef::entity("tags"))));
        selected.er_diagram.nodes.remove("tags");
        refresh_selection(&mut selected);

        assert!(selected.ui.selected_item.is_none());
        assert!(!selected.er_diagram.ui.has_highlights());
        assert_eq!(interaction_state(&selected), InteractionState::Idle);
        assert!(hover_entity(&selected, "users").is_changed());
    }

    #[test]
    fn test_refresh_selection_restores_frozen_highlight() {
        let mut selected = changed(select_item(&vm(), Some(LayerItemRef::entity("users"))));
        selected.er_diagram.ui = selected.er_diagram.ui.without_transients();
        refresh_selection(&mut selected);

        assert_eq!(selected.ui.selected_item, Some(LayerItemRef::entity("users")));
        assert_eq!(&*selected.er_diagram.ui.highlighted_edge_ids, &["fk".to_string()]);
    }

    #[test]
    fn test_drag_and_pan_toggles() {
        let hovered = changed(hover_entity(&vm(), "users"));
        let dragging = changed(start_entity_drag(&hovered));
        assert!(dragging.er_diagram.ui.is_dragging_entity);
        assert!(!dragging.er_diagram.ui.has_highlights());
        assert_eq!(start_entity_drag(&dragging), Transition::Unchanged);

        let dropped = changed(stop_entity_drag(&dragging));
        assert_eq!(stop_entity_drag(&dropped), Transition::Unchanged);

        assert_eq!(set_pan_mode(&dropped, false), Transition::Unchanged);
    }
}
