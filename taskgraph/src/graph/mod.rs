//! Validated dependency graph store
//!
//! This module holds the incrementally built graph and everything needed to
//! describe it:
//!
//! - Explicit dependency declaration between nodes, hard or soft
//! - Eager validation: unknown ids, duplicate ids and cycles are rejected
//!   at insertion time, leaving the graph unchanged
//! - Queries over direct and transitive dependencies
//! - Finding runnable nodes (whose hard dependencies are satisfied)
//! - DOT, structural and `petgraph` exports
//!
//! # Design Principles
//!
//! The adjacency representation stays private; callers only see abstract
//! operations (`add_node`, `add_edge`, `dependencies`, `runnable`, ...).
//! Order-sensitive results are always sorted, never taken from hash-map
//! iteration order.

mod dependency;
mod dependency_graph;
mod error;
mod export;
mod node_id;
mod shared;

pub use dependency::{Dependency, DependencyDeclaration, DependencyKind};
pub use dependency_graph::{DependencyGraph, GraphOptions, Node};
pub use error::{CyclePath, GraphError, GraphResult};
pub use export::{ExportEdge, GraphExport};
pub use node_id::NodeId;
pub use shared::SharedGraph;
