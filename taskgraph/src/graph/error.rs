//! Error types for graph operations
//!
//! This module hides error representation details and provides
//! a unified error type for the graph store, the standalone sorter and
//! the execution-level planner.

use crate::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;
use thiserror::Error;

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that can occur during graph operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GraphError {
    /// A cycle was detected in the dependency graph
    #[error("Cycle detected in dependency graph: {path}")]
    CycleDetected {
        /// Ordered cycle path, start id repeated at the end
        path: CyclePath,
    },

    /// A dependency references a non-existent node
    #[error("{}", missing_message(dependency, node.as_ref()))]
    MissingDependency {
        /// The id that could not be found
        dependency: NodeId,
        /// The node that referenced it (absent for direct queries)
        node: Option<NodeId>,
    },

    /// A node was added with a duplicate ID
    #[error("Duplicate node ID: {id}")]
    DuplicateNode {
        /// The duplicate node ID
        id: NodeId,
    },
}

fn missing_message(dependency: &NodeId, node: Option<&NodeId>) -> String {
    match node {
        Some(node) => format!("Dependency '{}' for node '{}' does not exist", dependency, node),
        None => format!("Node '{}' does not exist", dependency),
    }
}

impl GraphError {
    /// Creates a cycle detected error with the given path
    pub fn cycle(path: CyclePath) -> Self {
        Self::CycleDetected { path }
    }

    /// Creates a missing dependency error for `dependency` referenced by `node`
    pub fn missing_dependency(dependency: impl Into<NodeId>, node: impl Into<NodeId>) -> Self {
        Self::MissingDependency {
            dependency: dependency.into(),
            node: Some(node.into()),
        }
    }

    /// Creates a missing dependency error for a query on an unknown id
    pub fn unknown_node(id: impl Into<NodeId>) -> Self {
        Self::MissingDependency {
            dependency: id.into(),
            node: None,
        }
    }

    /// Creates a duplicate node error
    pub fn duplicate_node(id: impl Into<NodeId>) -> Self {
        Self::DuplicateNode { id: id.into() }
    }

    /// Returns the cycle path if this is a cycle error
    pub fn cycle_path(&self) -> Option<&CyclePath> {
        match self {
            Self::CycleDetected { path } => Some(path),
            _ => None,
        }
    }

    /// Returns true if this is a cycle error
    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::CycleDetected { .. })
    }

    /// Returns true if this is a missing dependency error
    pub fn is_missing_dependency(&self) -> bool {
        matches!(self, Self::MissingDependency { .. })
    }
}

/// The ordered list of ids forming a dependency cycle
///
/// The path follows edge direction (dependency before dependent) and
/// repeats its first id at the end, so a two-node cycle between `A` and
/// `B` reads `A -> B -> A` and a self-dependency reads `A -> A`.
///
/// Cycles are normalized to start at their lexicographically smallest id
/// so the same cycle is always reported the same way, whichever node the
/// detecting traversal reached first.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CyclePath(Vec<NodeId>);

impl CyclePath {
    /// Builds a path from the distinct members of a cycle, in edge order
    ///
    /// The members are rotated so the smallest id comes first, then the
    /// first id is repeated to close the loop.
    pub fn from_members(mut members: Vec<NodeId>) -> Self {
        if let Some(start) = members
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.cmp(b))
            .map(|(idx, _)| idx)
        {
            members.rotate_left(start);
            let first = members[0].clone();
            members.push(first);
        }
        Self(members)
    }

    /// Returns the ids along the path, including the repeated start
    pub fn nodes(&self) -> &[NodeId] {
        &self.0
    }

    /// Returns the distinct members of the cycle (without the repeated start)
    pub fn members(&self) -> &[NodeId] {
        match self.0.len() {
            0 => &[],
            n => &self.0[..n - 1],
        }
    }

    /// Consumes the path and returns the ids
    pub fn into_vec(self) -> Vec<NodeId> {
        self.0
    }
}

impl Deref for CyclePath {
    type Target = [NodeId];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for CyclePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{}", id)?;
        }
        Ok(())
    }
}

impl fmt::Debug for CyclePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CyclePath({})", self)
    }
}
