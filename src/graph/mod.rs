//! Graph indexing
//!
//! Derived adjacency maps over the diagram's nodes and edges.

pub mod index;

pub use index::{build_index, GraphIndex};
