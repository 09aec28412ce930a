//! Schema Reconciliation Module
//!
//! Merging repeated schema snapshots into a hand-edited diagram:
//! - Identity resolution by table name
//! - Column and relationship change detection
//! - Placement of newly discovered tables
//! - One history entry per merge

pub mod diff;
pub mod engine;
pub mod layout;

pub use diff::{ChangeLog, DiffEngine};
pub use engine::ReconciliationEngine;
pub use layout::{GridPlacer, LayoutConfig};
