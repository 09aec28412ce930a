//! Highlighting
//!
//! One-hop neighbourhood resolution and the pointer interaction actions
//! that decide when it runs.

pub mod interaction;
pub mod resolver;

pub use interaction::{
    clear_hover, hover, hover_column, hover_edge, hover_entity, interaction_state,
    refresh_selection, select_item, set_pan_mode, start_entity_drag, stop_entity_drag,
    toggle_lock, InteractionState,
};
pub use resolver::{resolve, reuse_if_same, Focus, HighlightMiss, HighlightSet};
