//! DependencyGraph - incrementally built, validated dependency store
//!
//! The graph only grows: nodes and edges are added through
//! [`DependencyGraph::add_node`] / [`DependencyGraph::add_edge`] (and their
//! variants), and every insertion is validated before anything changes.
//! A rejected call leaves the graph exactly as it was, so callers can retry
//! with a corrected declaration without inspecting partial state.
//!
//! # Design
//!
//! The graph uses a bidirectional adjacency list representation:
//! - `dependencies`: ids this node waits on, in declaration order, each
//!   tagged hard or soft
//! - `dependents`: nodes that name this node as a dependency
//!
//! Storage is a `HashMap`, so every list handed out to callers is sorted
//! explicitly before it is returned. The only exception is
//! [`DependencyGraph::dependencies`], which keeps declaration order.

use super::dependency::{Dependency, DependencyDeclaration, DependencyKind};
use super::error::{CyclePath, GraphError, GraphResult};
use crate::levels::{assign_levels, ExecutionLevel};
use crate::sort::view::DependencyView;
use crate::sort::{sort_view, SortNode, SortOptions, SortResult};
use crate::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use tracing::{debug, warn};

/// Validation policy of a [`DependencyGraph`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphOptions {
    /// Reject dependencies on ids that are not in the graph.
    ///
    /// When false, such dependencies are dropped with a warning.
    ///
    /// Default: true
    pub strict: bool,
}

impl GraphOptions {
    /// Unknown dependency ids fail the insertion.
    pub const STRICT: Self = Self { strict: true };

    /// Unknown dependency ids are dropped.
    pub const LENIENT: Self = Self { strict: false };
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self::STRICT
    }
}

/// A node in the dependency graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node
    id: NodeId,
    /// Nodes that must complete before this one (incoming edges)
    dependencies: Vec<Dependency>,
    /// Nodes that depend on this one (outgoing edges)
    dependents: Vec<NodeId>,
}

impl Node {
    fn new(id: NodeId, dependencies: Vec<Dependency>) -> Self {
        Self {
            id,
            dependencies,
            dependents: Vec::new(),
        }
    }

    /// Returns the node ID
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Returns the dependencies in declaration order
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Returns the in-degree (number of dependencies)
    pub fn in_degree(&self) -> usize {
        self.dependencies.len()
    }

    /// Returns the out-degree (number of dependents)
    pub fn out_degree(&self) -> usize {
        self.dependents.len()
    }

    fn dependency_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.dependencies.iter().map(Dependency::id)
    }

    fn dependency_mut(&mut self, id: &NodeId) -> Option<&mut Dependency> {
        self.dependencies.iter_mut().find(|dep| dep.id() == id)
    }
}

/// A directed acyclic graph of node dependencies
///
/// # Example
///
/// ```
/// use taskgraph::{DependencyGraph, DependencyKind};
///
/// let mut graph = DependencyGraph::new();
/// graph.add_node("fetch").unwrap();
/// graph.add_node_with_dependencies("parse", ["fetch"], DependencyKind::Hard).unwrap();
/// graph.add_node_with_dependencies("store", ["parse"], DependencyKind::Hard).unwrap();
///
/// // Closing the loop is rejected and the graph is left untouched
/// let err = graph.add_edge("store", "fetch", DependencyKind::Hard).unwrap_err();
/// assert_eq!(
///     err.to_string(),
///     "Cycle detected in dependency graph: fetch -> parse -> store -> fetch"
/// );
/// assert!(graph.dependencies("fetch").unwrap().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Map from node ID to node
    nodes: HashMap<NodeId, Node>,
    options: GraphOptions,
}

impl DependencyGraph {
    /// Creates a new empty strict graph
    pub fn new() -> Self {
        Self::with_options(GraphOptions::STRICT)
    }

    /// Creates a new empty graph with the given validation policy
    pub fn with_options(options: GraphOptions) -> Self {
        Self {
            nodes: HashMap::new(),
            options,
        }
    }

    /// Returns the validation policy
    pub fn options(&self) -> GraphOptions {
        self.options
    }

    /// Returns the number of nodes in the graph
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns true if the node exists in the graph
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Returns a reference to a node
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Returns all node IDs in ascending order
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Adds a node with no dependencies
    pub fn add_node(&mut self, id: impl Into<NodeId>) -> GraphResult<()> {
        self.insert_node(id.into(), Vec::new(), DependencyKind::Hard)
    }

    /// Adds a node depending on every id in `dependencies`
    ///
    /// Returns an error if:
    /// - A node with the same ID already exists
    /// - The node names itself as a dependency (a one-node cycle)
    /// - A dependency doesn't exist (strict graphs only)
    ///
    /// Nothing is inserted on error.
    pub fn add_node_with_dependencies<I, D>(
        &mut self,
        id: impl Into<NodeId>,
        dependencies: I,
        kind: DependencyKind,
    ) -> GraphResult<()>
    where
        I: IntoIterator<Item = D>,
        D: Into<NodeId>,
    {
        let dependencies = dependencies.into_iter().map(Into::into).collect();
        self.insert_node(id.into(), dependencies, kind)
    }

    /// Adds a node with the ids and classification of `declaration`
    pub fn add_declared_node(
        &mut self,
        id: impl Into<NodeId>,
        declaration: &DependencyDeclaration,
    ) -> GraphResult<()> {
        self.insert_node(id.into(), declaration.ids().to_vec(), declaration.kind())
    }

    fn insert_node(
        &mut self,
        id: NodeId,
        requested: Vec<NodeId>,
        kind: DependencyKind,
    ) -> GraphResult<()> {
        if self.nodes.contains_key(&id) {
            return Err(GraphError::duplicate_node(id));
        }

        if requested.contains(&id) {
            debug!(node = %id, "rejected self-dependency");
            return Err(GraphError::cycle(CyclePath::from_members(vec![id])));
        }

        let mut dependencies: Vec<Dependency> = Vec::with_capacity(requested.len());
        for dep in requested {
            if dependencies.iter().any(|existing| existing.id() == &dep) {
                continue;
            }
            if !self.nodes.contains_key(&dep) {
                if self.options.strict {
                    debug!(node = %id, dependency = %dep, "rejected unknown dependency");
                    return Err(GraphError::missing_dependency(dep, id));
                }
                warn!(node = %id, dependency = %dep, "dropping unknown dependency");
                continue;
            }
            dependencies.push(Dependency::new(dep, kind));
        }

        // A node that is not in the graph yet has no dependents, so past the
        // self-reference check it cannot close a cycle.
        for dep in &dependencies {
            if let Some(node) = self.nodes.get_mut(dep.id()) {
                node.dependents.push(id.clone());
            }
        }

        debug!(node = %id, dependencies = dependencies.len(), %kind, "added node");
        self.nodes.insert(id.clone(), Node::new(id, dependencies));
        Ok(())
    }

    /// Adds an edge: `to` depends on `from`
    ///
    /// This means `from` must complete before `to` can run.
    ///
    /// Returns an error if:
    /// - Either node doesn't exist
    /// - Adding this edge would create a cycle
    ///
    /// Re-adding an existing edge succeeds without a second entry; a hard
    /// declaration upgrades a soft one. On error, all prior nodes and edges
    /// are unchanged.
    pub fn add_edge(
        &mut self,
        from: impl Into<NodeId>,
        to: impl Into<NodeId>,
        kind: DependencyKind,
    ) -> GraphResult<()> {
        let from = from.into();
        let to = to.into();

        if !self.nodes.contains_key(&to) {
            return Err(GraphError::unknown_node(to));
        }
        if !self.nodes.contains_key(&from) {
            return Err(GraphError::missing_dependency(from, to));
        }
        if from == to {
            debug!(node = %from, "rejected self-dependency");
            return Err(GraphError::cycle(CyclePath::from_members(vec![from])));
        }

        if let Some(existing) = self
            .nodes
            .get_mut(&to)
            .and_then(|node| node.dependency_mut(&from))
        {
            existing.upgrade(kind);
            return Ok(());
        }

        // The new edge closes a cycle iff `from` is already reachable from `to`
        if let Some(members) = self.path_between(&to, &from) {
            let path = CyclePath::from_members(members);
            debug!(%from, %to, cycle = %path, "rejected edge that would create a cycle");
            return Err(GraphError::cycle(path));
        }

        if let Some(node) = self.nodes.get_mut(&to) {
            node.dependencies.push(Dependency::new(from.clone(), kind));
        }
        if let Some(node) = self.nodes.get_mut(&from) {
            node.dependents.push(to.clone());
        }

        debug!(%from, %to, %kind, "added edge");
        Ok(())
    }

    /// Shortest path `start -> ... -> goal` along dependency -> dependent edges
    ///
    /// Neighbours are expanded in ascending id order so the path found is
    /// the same on every call.
    fn path_between(&self, start: &NodeId, goal: &NodeId) -> Option<Vec<NodeId>> {
        let mut parents: HashMap<&NodeId, &NodeId> = HashMap::new();
        let mut seen: HashSet<&NodeId> = HashSet::from([start]);
        let mut queue: VecDeque<&NodeId> = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            if current == goal {
                let mut path = vec![current.clone()];
                let mut cursor = current;
                while let Some(parent) = parents.get(cursor) {
                    path.push((*parent).clone());
                    cursor = *parent;
                }
                path.reverse();
                return Some(path);
            }

            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            let mut next: Vec<&NodeId> = node.dependents.iter().collect();
            next.sort();
            for dependent in next {
                if seen.insert(dependent) {
                    parents.insert(dependent, current);
                    queue.push_back(dependent);
                }
            }
        }

        None
    }

    fn require(&self, id: &str) -> GraphResult<&Node> {
        self.nodes.get(id).ok_or_else(|| GraphError::unknown_node(id))
    }

    /// Returns the direct dependencies of `id` in declaration order
    pub fn dependencies(&self, id: &str) -> GraphResult<Vec<NodeId>> {
        Ok(self.require(id)?.dependency_ids().cloned().collect())
    }

    /// Returns every node `id` depends on, directly or transitively, sorted
    pub fn all_dependencies(&self, id: &str) -> GraphResult<Vec<NodeId>> {
        let root = self.require(id)?;
        let mut found: BTreeSet<&NodeId> = BTreeSet::new();
        let mut stack: Vec<&Node> = vec![root];

        while let Some(node) = stack.pop() {
            for dep in node.dependency_ids() {
                if found.insert(dep) {
                    if let Some(dep_node) = self.nodes.get(dep) {
                        stack.push(dep_node);
                    }
                }
            }
        }

        Ok(found.into_iter().cloned().collect())
    }

    /// Returns the nodes that directly depend on `id`, sorted
    pub fn dependents(&self, id: &str) -> GraphResult<Vec<NodeId>> {
        let mut dependents = self.require(id)?.dependents.clone();
        dependents.sort();
        Ok(dependents)
    }

    /// Returns the hard dependencies of `id` in declaration order
    pub fn hard_dependencies(&self, id: &str) -> GraphResult<Vec<NodeId>> {
        self.dependencies_of_kind(id, DependencyKind::Hard)
    }

    /// Returns the soft dependencies of `id` in declaration order
    pub fn soft_dependencies(&self, id: &str) -> GraphResult<Vec<NodeId>> {
        self.dependencies_of_kind(id, DependencyKind::Soft)
    }

    fn dependencies_of_kind(&self, id: &str, kind: DependencyKind) -> GraphResult<Vec<NodeId>> {
        Ok(self
            .require(id)?
            .dependencies
            .iter()
            .filter(|dep| dep.kind() == kind)
            .map(|dep| dep.id().clone())
            .collect())
    }

    /// Returns the classification of the edge `from -> to`, if it exists
    pub fn dependency_kind(&self, from: &str, to: &str) -> Option<DependencyKind> {
        self.nodes
            .get(to)?
            .dependencies
            .iter()
            .find(|dep| dep.id().as_str() == from)
            .map(Dependency::kind)
    }

    /// Returns nodes with no dependencies, sorted
    ///
    /// These are the nodes that can start immediately.
    pub fn root_nodes(&self) -> Vec<NodeId> {
        self.sorted_ids_where(|node| node.dependencies.is_empty())
    }

    /// Returns nodes with no dependents, sorted
    ///
    /// These are the terminal nodes of the graph.
    pub fn leaf_nodes(&self) -> Vec<NodeId> {
        self.sorted_ids_where(|node| node.dependents.is_empty())
    }

    fn sorted_ids_where(&self, predicate: impl Fn(&Node) -> bool) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|node| predicate(node))
            .map(|node| node.id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Returns the in-degree (number of dependencies) for a node
    pub fn in_degree(&self, id: &str) -> Option<usize> {
        self.nodes.get(id).map(Node::in_degree)
    }

    /// Returns the out-degree (number of dependents) for a node
    pub fn out_degree(&self, id: &str) -> Option<usize> {
        self.nodes.get(id).map(Node::out_degree)
    }

    /// Returns nodes that can run now given completed nodes, sorted
    ///
    /// A node is runnable when it has not completed and all of its *hard*
    /// dependencies have. Soft dependencies never hold a node back.
    pub fn runnable(&self, completed: &HashSet<NodeId>) -> Vec<NodeId> {
        self.sorted_ids_where(|node| {
            !completed.contains(&node.id)
                && node
                    .dependencies
                    .iter()
                    .filter(|dep| dep.kind().is_hard())
                    .all(|dep| completed.contains(dep.id()))
        })
    }

    /// Scans the whole graph for a cycle
    ///
    /// Insertions already reject cycles, so on a graph built through this
    /// API the result is always `None`.
    pub fn detect_cycles(&self) -> Option<CyclePath> {
        self.view().find_cycle()
    }

    /// Groups nodes into execution levels
    ///
    /// Level 0 holds exactly the nodes without dependencies; every other
    /// node sits one level above its deepest dependency. Ids are sorted
    /// within each level.
    pub fn parallel_groups(&self) -> Vec<ExecutionLevel> {
        assign_levels(&self.view())
    }

    /// Computes a topological order of the current graph
    ///
    /// `options.strict` has no effect here since every edge of the graph
    /// references an existing node.
    pub fn topological_sort(&self, options: SortOptions) -> GraphResult<SortResult> {
        sort_view(&self.view(), options)
    }

    /// Returns the graph as a node-list snapshot sorted by id
    pub fn snapshot(&self) -> Vec<SortNode> {
        self.node_ids()
            .into_iter()
            .map(|id| {
                let deps = self
                    .nodes
                    .get(&id)
                    .map(|node| node.dependency_ids().cloned().collect())
                    .unwrap_or_default();
                SortNode {
                    id,
                    dependencies: deps,
                }
            })
            .collect()
    }

    pub(crate) fn view(&self) -> DependencyView {
        DependencyView::from_pairs(
            self.nodes
                .iter()
                .map(|(id, node)| (id, node.dependency_ids())),
        )
    }
}
