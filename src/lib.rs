//! SchemaFlow Diagram - ER diagram reconciliation engine
//!
//! Folds repeated schema snapshots into a diagram the user keeps editing:
//! table identity survives by name, positions and sizes are preserved, new
//! tables are placed beside the existing layout and every merge leaves a
//! history entry. Around that core sit the adjacency index, one-hop
//! highlighting, a dispatch store and an axum API.

pub mod actions;
pub mod config;
pub mod error;
pub mod graph;
pub mod highlight;
pub mod models;
pub mod persistence;
pub mod reconcile;
pub mod routes;
pub mod sample;
pub mod state;
pub mod store;

pub use reconcile::ReconciliationEngine;
pub use store::{Store, Transition};
