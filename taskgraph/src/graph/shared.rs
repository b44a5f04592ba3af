//! Thread-safe handle to a dependency graph
//!
//! Existence and cycle checks need a consistent view of the whole graph,
//! so mutations take the write lock (one writer at a time) and every query,
//! sort or level computation takes the read lock (many readers at once).
//!
//! A mutation either succeeds completely or leaves the graph untouched, so a
//! lock poisoned by a panicking holder still guards a valid graph and is
//! recovered rather than propagated.

use super::dependency::{DependencyDeclaration, DependencyKind};
use super::dependency_graph::{DependencyGraph, GraphOptions};
use super::error::{CyclePath, GraphResult};
use crate::levels::ExecutionLevel;
use crate::sort::{SortNode, SortOptions, SortResult};
use crate::NodeId;
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Cloneable, shareable handle to a [`DependencyGraph`]
///
/// Clones share the same underlying graph.
///
/// ```
/// use taskgraph::{DependencyKind, SharedGraph};
///
/// let graph = SharedGraph::default();
/// graph.add_node("fetch").unwrap();
///
/// let writer = graph.clone();
/// std::thread::spawn(move || {
///     writer
///         .add_node_with_dependencies("parse", ["fetch"], DependencyKind::Hard)
///         .unwrap();
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(graph.dependents("fetch").unwrap(), vec!["parse"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SharedGraph {
    inner: Arc<RwLock<DependencyGraph>>,
}

impl SharedGraph {
    /// Creates a handle to an empty graph with the given validation policy
    pub fn new(options: GraphOptions) -> Self {
        Self::from(DependencyGraph::with_options(options))
    }

    /// Acquires the read lock
    ///
    /// Writers are blocked for as long as the guard is held.
    pub fn read(&self) -> RwLockReadGuard<'_, DependencyGraph> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, DependencyGraph> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// See [`DependencyGraph::add_node`]
    pub fn add_node(&self, id: impl Into<NodeId>) -> GraphResult<()> {
        self.write().add_node(id)
    }

    /// See [`DependencyGraph::add_node_with_dependencies`]
    pub fn add_node_with_dependencies<I, D>(
        &self,
        id: impl Into<NodeId>,
        dependencies: I,
        kind: DependencyKind,
    ) -> GraphResult<()>
    where
        I: IntoIterator<Item = D>,
        D: Into<NodeId>,
    {
        self.write()
            .add_node_with_dependencies(id, dependencies, kind)
    }

    /// See [`DependencyGraph::add_declared_node`]
    pub fn add_declared_node(
        &self,
        id: impl Into<NodeId>,
        declaration: &DependencyDeclaration,
    ) -> GraphResult<()> {
        self.write().add_declared_node(id, declaration)
    }

    /// See [`DependencyGraph::add_edge`]
    pub fn add_edge(
        &self,
        from: impl Into<NodeId>,
        to: impl Into<NodeId>,
        kind: DependencyKind,
    ) -> GraphResult<()> {
        self.write().add_edge(from, to, kind)
    }

    /// Returns the number of nodes
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Returns true if the node exists
    pub fn contains(&self, id: &str) -> bool {
        self.read().contains(id)
    }

    /// Returns the direct dependencies of `id` in declaration order
    pub fn dependencies(&self, id: &str) -> GraphResult<Vec<NodeId>> {
        self.read().dependencies(id)
    }

    /// Returns every direct and transitive dependency of `id`, sorted
    pub fn all_dependencies(&self, id: &str) -> GraphResult<Vec<NodeId>> {
        self.read().all_dependencies(id)
    }

    /// Returns the nodes that directly depend on `id`, sorted
    pub fn dependents(&self, id: &str) -> GraphResult<Vec<NodeId>> {
        self.read().dependents(id)
    }

    /// Returns the nodes whose hard dependencies are all in `completed`
    pub fn runnable(&self, completed: &HashSet<NodeId>) -> Vec<NodeId> {
        self.read().runnable(completed)
    }

    /// Returns a cycle of the current graph, if any
    pub fn detect_cycles(&self) -> Option<CyclePath> {
        self.read().detect_cycles()
    }

    /// Returns the execution levels of the current graph
    pub fn parallel_groups(&self) -> Vec<ExecutionLevel> {
        self.read().parallel_groups()
    }

    /// Returns a topological order of the current graph
    pub fn topological_sort(&self, options: SortOptions) -> GraphResult<SortResult> {
        self.read().topological_sort(options)
    }

    /// Returns the current graph as a node-list snapshot sorted by id
    pub fn snapshot(&self) -> Vec<SortNode> {
        self.read().snapshot()
    }

    /// Returns the DOT rendering of the current graph
    pub fn to_dot(&self) -> String {
        self.read().to_dot()
    }
}

impl From<DependencyGraph> for SharedGraph {
    fn from(graph: DependencyGraph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }
}
