//! Layer ordering actions
//!
//! Items live in either the background or the foreground section. Index 0 is
//! the top of its section.

use crate::models::{LayerItemRef, LayerOrder, LayerPosition, ViewModel};
use crate::store::Transition;

const BACKGROUND_BASE: i64 = -10_000;
const FOREGROUND_BASE: i64 = 10_000;

/// Move the item at `from` to `to` within one section
pub fn reorder_layer_items(
    vm: &ViewModel,
    position: LayerPosition,
    from: usize,
    to: usize,
) -> Transition<ViewModel> {
    let len = vm.er_diagram.ui.layer_order.items(position).len();
    if from == to || from >= len || to >= len {
        return Transition::Unchanged;
    }

    let mut next = vm.clone();
    let items = next.er_diagram.ui.layer_order.items_mut(position);
    let item = items.remove(from);
    items.insert(to, item);
    Transition::Changed(next)
}

/// Move an existing item into `position` at `index` (clamped to the section length)
pub fn move_layer_item(
    vm: &ViewModel,
    item: &LayerItemRef,
    position: LayerPosition,
    index: usize,
) -> Transition<ViewModel> {
    let Some(current) = locate(&vm.er_diagram.ui.layer_order, item) else {
        return Transition::Unchanged;
    };

    let mut next = vm.clone();
    let order = &mut next.er_diagram.ui.layer_order;
    let moved = order.items_mut(current.0).remove(current.1);

    let target = order.items_mut(position);
    let index = index.min(target.len());
    target.insert(index, moved);

    if next.er_diagram.ui.layer_order == vm.er_diagram.ui.layer_order {
        return Transition::Unchanged;
    }
    Transition::Changed(next)
}

/// Put a new item on top of `position`
pub fn add_layer_item(vm: &ViewModel, item: LayerItemRef, position: LayerPosition) -> Transition<ViewModel> {
    if vm.er_diagram.ui.layer_order.items(position).contains(&item) {
        return Transition::Unchanged;
    }

    let mut next = vm.clone();
    next.er_diagram.ui.layer_order.items_mut(position).insert(0, item);
    Transition::Changed(next)
}

/// Drop an item from whichever section holds it
pub fn remove_layer_item(vm: &ViewModel, item: &LayerItemRef) -> Transition<ViewModel> {
    let order = &vm.er_diagram.ui.layer_order;
    if !order.background_items.contains(item) && !order.foreground_items.contains(item) {
        return Transition::Unchanged;
    }

    let mut next = vm.clone();
    let order = &mut next.er_diagram.ui.layer_order;
    order.background_items.retain(|i| i != item);
    order.foreground_items.retain(|i| i != item);
    Transition::Changed(next)
}

/// Stacking value for the renderer; 0 for items in neither section
pub fn z_index(order: &LayerOrder, item: &LayerItemRef) -> i64 {
    let rank = |items: &[LayerItemRef]| {
        items
            .iter()
            .position(|i| i == item)
            .map(|idx| (items.len() - 1 - idx) as i64)
    };

    if let Some(r) = rank(&order.background_items) {
        BACKGROUND_BASE + r
    } else if let Some(r) = rank(&order.foreground_items) {
        FOREGROUND_BASE + r
    } else {
        0
    }
}

fn locate(order: &LayerOrder, item: &LayerItemRef) -> Option<(LayerPosition, usize)> {
    [LayerPosition::Background, LayerPosition::Foreground]
        .into_iter()
        .find_map(|pos| {
            order
                .items(pos)
                .iter()
                .position(|i| i == item)
                .map(|idx| (pos, idx))
        })
}
