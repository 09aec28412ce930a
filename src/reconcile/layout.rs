//! Placement of entities that have no position yet
//!
//! First merge: a square-ish grid over every entity, anchored at the start
//! offset. Later merges: a grid of only the new entities, started one spacing
//! unit to the right of the right-most existing node so nothing overlaps the
//! user's layout.

use crate::models::EntityNode;
use serde::Deserialize;

/// Grid spacing and origin for automatic placement
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LayoutConfig {
    pub horizontal_spacing: f64,
    pub vertical_spacing: f64,
    pub start_x: f64,
    pub start_y: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            horizontal_spacing: 300.0,
            vertical_spacing: 200.0,
            start_x: 50.0,
            start_y: 50.0,
        }
    }
}

/// `ceil(sqrt(count))`, at least 1
pub fn grid_columns(count: usize) -> usize {
    if count == 0 {
        return 1;
    }
    ((count as f64).sqrt().ceil() as usize).max(1)
}

/// Hands out positions for new entities, one call per entity
#[derive(Debug, Clone)]
pub enum GridPlacer {
    /// Row-major grid from the start offset
    Initial {
        config: LayoutConfig,
        per_row: usize,
        placed: usize,
    },
    /// Grid to the right of the existing layout
    Incremental {
        config: LayoutConfig,
        per_row: usize,
        placed: usize,
        row_start_x: f64,
        current_x: f64,
        current_y: f64,
    },
}

impl GridPlacer {
    /// Placer for an empty canvas holding `total` entities
    pub fn initial(config: LayoutConfig, total: usize) -> Self {
        GridPlacer::Initial {
            config,
            per_row: grid_columns(total),
            placed: 0,
        }
    }

    /// Placer for `new_count` entities joining `existing` nodes
    pub fn incremental<'a>(
        config: LayoutConfig,
        existing: impl IntoIterator<Item = &'a EntityNode>,
        new_count: usize,
    ) -> Self {
        let (max_x, max_y) = existing.into_iter().fold(
            (config.start_x, config.start_y),
            |(mx, my), node| (mx.max(node.x), my.max(node.y)),
        );
        let row_start_x = max_x + config.horizontal_spacing;

        GridPlacer::Incremental {
            config,
            per_row: grid_columns(new_count),
            placed: 0,
            row_start_x,
            current_x: row_start_x,
            current_y: max_y,
        }
    }

    /// Position for the next new entity
    pub fn next_position(&mut self) -> (f64, f64) {
        match self {
            GridPlacer::Initial {
                config,
                per_row,
                placed,
            } => {
                let col = *placed % *per_row;
                let row = *placed / *per_row;
                *placed += 1;
                (
                    config.start_x + col as f64 * config.horizontal_spacing,
                    config.start_y + row as f64 * config.vertical_spacing,
                )
            }
            GridPlacer::Incremental {
                config,
                per_row,
                placed,
                row_start_x,
                current_x,
                current_y,
            } => {
                if *placed > 0 && *placed % *per_row == 0 {
                    *current_x = *row_start_x;
                    *current_y += config.vertical_spacing;
                }
                let position = (*current_x, *current_y);
                *current_x += config.horizontal_spacing;
                *placed += 1;
                position
            }
        }
    }
}
