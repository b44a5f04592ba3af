//! Taskgraph: dependency ordering for task and event pipelines
//!
//! `taskgraph` decides *in what order* a set of declared tasks may run. It
//! validates dependency declarations as they arrive, then turns the result
//! into either a total order or a plan of parallel-safe batches. Running
//! the tasks is left to the caller.
//!
//! # Features
//!
//! - **Validated graph store**: unknown ids, duplicate ids and cycles are
//!   rejected at insertion time, without partial updates
//! - **Hard and soft dependencies**: both order nodes, only hard ones block
//! - **Topological sort**: Kahn's algorithm or iterative DFS, deterministic
//!   under any input order, with cycle reporting
//! - **Execution levels**: batches of mutually independent nodes
//! - **Exports**: Graphviz DOT, a serde-friendly structure, `petgraph`
//!
//! # Quick Start
//!
//! ```
//! use taskgraph::prelude::*;
//!
//! let mut graph = DependencyGraph::new();
//! graph.add_node("fetch_user")?;
//! graph.add_node("get_pricing")?;
//! graph.add_node_with_dependencies("validate", ["fetch_user", "get_pricing"], DependencyKind::Hard)?;
//! graph.add_node_with_dependencies("charge", ["validate"], DependencyKind::Hard)?;
//!
//! let order = graph.topological_sort(SortOptions::default())?.order;
//! assert_eq!(order, vec!["fetch_user", "get_pricing", "validate", "charge"]);
//!
//! let levels = graph.parallel_groups();
//! assert_eq!(levels[0].nodes, vec!["fetch_user", "get_pricing"]);
//! # Ok::<(), taskgraph::GraphError>(())
//! ```
//!
//! # Module Organization
//!
//! - [`graph`]: the validated store, its ids, errors and exports
//! - [`sort`]: standalone topological sort over a node-list snapshot
//! - [`levels`]: execution-level planning
//! - [`registration`]: adapter from `{entity, event}` registrations

pub mod graph;
pub mod levels;
pub mod registration;
pub mod sort;

pub use graph::{
    CyclePath, Dependency, DependencyDeclaration, DependencyGraph, DependencyKind, ExportEdge,
    GraphError, GraphExport, GraphOptions, GraphResult, Node, NodeId, SharedGraph,
};
pub use levels::{execution_levels, ExecutionLevel};
pub use registration::EventRegistration;
pub use sort::{topological_sort, SortAlgorithm, SortMetadata, SortNode, SortOptions, SortResult};

// Re-export dependencies used in public API
pub use serde; // Users deserialize declarations and options from their own config
pub use petgraph; // `to_petgraph` hands out a petgraph type

/// Prelude module for convenient glob imports
///
/// # Example
///
/// ```
/// use taskgraph::prelude::*;
/// ```
pub mod prelude {
    pub use crate::graph::{
        CyclePath, DependencyDeclaration, DependencyGraph, DependencyKind, GraphError,
        GraphOptions, GraphResult, NodeId, SharedGraph,
    };
    pub use crate::levels::{execution_levels, ExecutionLevel};
    pub use crate::registration::EventRegistration;
    pub use crate::sort::{topological_sort, SortAlgorithm, SortNode, SortOptions, SortResult};
}
