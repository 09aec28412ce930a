//! View model actions
//!
//! Pure `&ViewModel -> Transition<ViewModel>` functions meant to be passed
//! to [`Store::dispatch`](crate::store::Store::dispatch). Pointer interaction
//! actions live in [`crate::highlight`].

pub mod data;
pub mod layer;

pub use data::{
    merge_snapshot, set_loading, update_node_positions, update_node_sizes, NodePosition, NodeSize,
};
pub use layer::{add_layer_item, move_layer_item, remove_layer_item, reorder_layer_items, z_index};
