//! Standalone topological sort over a node-list snapshot
//!
//! The sorter takes a plain list of [`SortNode`]s, with no incremental
//! validation semantics, and computes an order under [`SortOptions`]:
//!
//! - [`SortAlgorithm::Kahn`]: in-degree peeling, smallest ready id first
//! - [`SortAlgorithm::Dfs`]: explicitly-stacked depth-first reverse postorder
//!
//! Both algorithms are deterministic: ids with no ordering constraint
//! between them come out in ascending lexicographic order, whatever the
//! order of the input list.
//!
//! # Example
//!
//! ```
//! use taskgraph::{topological_sort, SortNode, SortOptions};
//!
//! let nodes = vec![
//!     SortNode::new("c").with_dependencies(["b"]),
//!     SortNode::new("b").with_dependencies(["a"]),
//!     SortNode::new("a"),
//! ];
//!
//! let result = topological_sort(&nodes, SortOptions::default()).unwrap();
//! assert!(!result.has_cycle);
//! assert_eq!(result.order, vec!["a", "b", "c"]);
//! ```

mod dfs;
mod kahn;
mod options;
pub(crate) mod view;

pub use options::{SortAlgorithm, SortOptions};

use crate::graph::{CyclePath, GraphError, GraphResult};
use crate::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use view::DependencyView;

/// One entry of a sort input: an id and the ids it depends on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortNode {
    /// Node identifier
    pub id: NodeId,
    /// Ids that must come before this node
    #[serde(default)]
    pub dependencies: Vec<NodeId>,
}

impl SortNode {
    /// Creates a node with no dependencies
    pub fn new(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            dependencies: Vec::new(),
        }
    }

    /// Appends dependencies to the node
    pub fn with_dependencies<I, D>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<NodeId>,
    {
        self.dependencies
            .extend(dependencies.into_iter().map(Into::into));
        self
    }
}

/// Result of a topological sort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortResult {
    /// Topological order; partial (Kahn) or empty (DFS) when a cycle exists
    pub order: Vec<NodeId>,
    /// Whether the input contains a cycle
    pub has_cycle: bool,
    /// One discovered cycle, when `has_cycle` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_path: Option<CyclePath>,
    /// Diagnostics about the run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SortMetadata>,
}

/// Diagnostics reported alongside a sort result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortMetadata {
    /// Algorithm that produced the order
    pub algorithm: SortAlgorithm,
    /// Initial in-degree (distinct known dependencies) of every node
    pub in_degrees: BTreeMap<NodeId, usize>,
}

/// Output shared by both algorithms before it is turned into a `SortResult`
pub(crate) struct Outcome {
    pub(crate) order: Vec<NodeId>,
    pub(crate) cycle: Option<CyclePath>,
}

/// Computes a topological order of `nodes`
///
/// # Errors
///
/// - [`GraphError::DuplicateNode`] if two entries share an id
/// - [`GraphError::MissingDependency`] for an unknown dependency id when
///   `options.strict` is set
/// - [`GraphError::CycleDetected`] when `options.fail_on_cycle` is set and
///   the input contains a cycle
pub fn topological_sort(nodes: &[SortNode], options: SortOptions) -> GraphResult<SortResult> {
    let view = DependencyView::from_nodes(nodes, options.strict)?;
    sort_view(&view, options)
}

pub(crate) fn sort_view(view: &DependencyView, options: SortOptions) -> GraphResult<SortResult> {
    let outcome = match options.algorithm {
        SortAlgorithm::Kahn => kahn::sort(view),
        SortAlgorithm::Dfs => dfs::sort(view),
    };

    if let Some(path) = &outcome.cycle {
        debug!(algorithm = %options.algorithm, cycle = %path, "cycle detected during sort");
        if options.fail_on_cycle {
            return Err(GraphError::cycle(path.clone()));
        }
    } else {
        debug!(
            algorithm = %options.algorithm,
            nodes = outcome.order.len(),
            "topological sort complete"
        );
    }

    Ok(SortResult {
        has_cycle: outcome.cycle.is_some(),
        order: outcome.order,
        cycle_path: outcome.cycle,
        metadata: Some(SortMetadata {
            algorithm: options.algorithm,
            in_degrees: view.in_degrees(),
        }),
    })
}
