//! Read-only dependency view shared by every algorithm in the crate
//!
//! The graph store, both sorters and the level planner all reduce their
//! input to a `DependencyView` before doing any work. Keeping adjacency in
//! ordered maps means every traversal visits ids in a fixed order, no
//! matter how the caller built the input.

use super::SortNode;
use crate::graph::{CyclePath, GraphError, GraphResult};
use crate::NodeId;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::warn;

static NO_NEIGHBOURS: BTreeSet<NodeId> = BTreeSet::new();

/// Bidirectional adjacency over a fixed node set
///
/// - `dependencies`: ids a node waits on (incoming edges)
/// - `dependents`: ids waiting on a node (outgoing edges)
///
/// Every node has an entry in both maps, possibly empty.
#[derive(Debug, Clone, Default)]
pub(crate) struct DependencyView {
    dependencies: BTreeMap<NodeId, BTreeSet<NodeId>>,
    dependents: BTreeMap<NodeId, BTreeSet<NodeId>>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Finished,
}

impl DependencyView {
    /// Builds a view from a node-list snapshot
    ///
    /// Fails on duplicate ids. Unknown dependency ids fail in strict mode
    /// and are dropped otherwise. Checks run in id order so the reported
    /// error does not depend on input order.
    pub(crate) fn from_nodes(nodes: &[SortNode], strict: bool) -> GraphResult<Self> {
        let mut declared: BTreeMap<&NodeId, &SortNode> = BTreeMap::new();
        for node in nodes {
            if declared.insert(&node.id, node).is_some() {
                return Err(GraphError::duplicate_node(node.id.clone()));
            }
        }

        let mut view = Self::default();
        for id in declared.keys() {
            view.insert_node((*id).clone());
        }

        for (id, node) in &declared {
            let mut deps: Vec<&NodeId> = node.dependencies.iter().collect();
            deps.sort();
            deps.dedup();
            for dep in deps {
                if !declared.contains_key(dep) {
                    if strict {
                        return Err(GraphError::missing_dependency(dep.clone(), (*id).clone()));
                    }
                    warn!(node = %id, dependency = %dep, "ignoring unknown dependency");
                    continue;
                }
                view.insert_edge(dep.clone(), (*id).clone());
            }
        }

        Ok(view)
    }

    /// Builds a view from `(node, dependencies)` pairs already known to be valid
    pub(crate) fn from_pairs<'a, I, D>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a NodeId, D)>,
        D: IntoIterator<Item = &'a NodeId>,
    {
        let mut view = Self::default();
        let mut edges = Vec::new();
        for (id, deps) in pairs {
            view.insert_node(id.clone());
            edges.extend(deps.into_iter().map(|dep| (dep.clone(), id.clone())));
        }
        for (from, to) in edges {
            view.insert_edge(from, to);
        }
        view
    }

    fn insert_node(&mut self, id: NodeId) {
        self.dependencies.entry(id.clone()).or_default();
        self.dependents.entry(id).or_default();
    }

    fn insert_edge(&mut self, from: NodeId, to: NodeId) {
        self.dependents.entry(from.clone()).or_default().insert(to.clone());
        self.dependencies.entry(to).or_default().insert(from);
    }

    /// Number of nodes in the view
    pub(crate) fn len(&self) -> usize {
        self.dependencies.len()
    }

    /// All ids in ascending order
    pub(crate) fn ids(&self) -> impl DoubleEndedIterator<Item = &NodeId> {
        self.dependencies.keys()
    }

    pub(crate) fn dependencies_of(&self, id: &NodeId) -> &BTreeSet<NodeId> {
        self.dependencies.get(id).unwrap_or(&NO_NEIGHBOURS)
    }

    pub(crate) fn dependents_of(&self, id: &NodeId) -> &BTreeSet<NodeId> {
        self.dependents.get(id).unwrap_or(&NO_NEIGHBOURS)
    }

    /// Number of distinct dependencies per node
    pub(crate) fn in_degrees(&self) -> BTreeMap<NodeId, usize> {
        self.dependencies
            .iter()
            .map(|(id, deps)| (id.clone(), deps.len()))
            .collect()
    }

    /// Returns the sub-view induced by `keep`
    pub(crate) fn restrict(&self, keep: &BTreeSet<&NodeId>) -> Self {
        Self::from_pairs(keep.iter().map(move |id| {
            let inner = self
                .dependencies_of(id)
                .iter()
                .filter(move |dep| keep.contains(dep));
            (*id, inner)
        }))
    }

    /// In-degree peeling that always releases the smallest ready id
    ///
    /// Returns the order reached and the ids left blocked. The blocked set
    /// is empty exactly when the view is acyclic.
    pub(crate) fn peel_smallest_first(&self) -> (Vec<NodeId>, BTreeSet<&NodeId>) {
        let mut remaining: HashMap<&NodeId, usize> = self
            .ids()
            .map(|id| (id, self.dependencies_of(id).len()))
            .collect();
        let mut ready: BTreeSet<&NodeId> = remaining
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut order = Vec::with_capacity(self.len());

        while let Some(node) = ready.pop_first() {
            order.push(node.clone());
            for dependent in self.dependents_of(node) {
                if let Some(degree) = remaining.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(dependent);
                    }
                }
            }
        }

        let blocked = remaining
            .into_iter()
            .filter(|(_, degree)| *degree > 0)
            .map(|(id, _)| id)
            .collect();
        (order, blocked)
    }

    /// Iterative depth-first traversal along dependency -> dependent edges
    ///
    /// Start nodes and neighbours are visited in descending id order, so the
    /// same cycle is found on every call.
    ///
    /// Returns the postorder when the view is acyclic, or the cycle closed
    /// by the first back edge found (the in-progress segment of the stack).
    pub(crate) fn depth_first(&self) -> Result<Vec<NodeId>, CyclePath> {
        type Frame<'a> = (
            &'a NodeId,
            std::iter::Rev<std::collections::btree_set::Iter<'a, NodeId>>,
        );

        let mut marks: HashMap<&NodeId, Mark> = HashMap::with_capacity(self.len());
        let mut postorder = Vec::with_capacity(self.len());
        let mut stack: Vec<Frame<'_>> = Vec::new();

        for root in self.ids().rev() {
            if marks.contains_key(root) {
                continue;
            }
            marks.insert(root, Mark::InProgress);
            stack.push((root, self.dependents_of(root).iter().rev()));

            while let Some((node, children)) = stack.last_mut() {
                match children.next() {
                    Some(child) => match marks.get(child).copied() {
                        None => {
                            marks.insert(child, Mark::InProgress);
                            stack.push((child, self.dependents_of(child).iter().rev()));
                        }
                        Some(Mark::InProgress) => {
                            let start = stack
                                .iter()
                                .position(|(on_stack, _)| *on_stack == child)
                                .unwrap_or(0);
                            let members = stack[start..]
                                .iter()
                                .map(|(on_stack, _)| (*on_stack).clone())
                                .collect();
                            return Err(CyclePath::from_members(members));
                        }
                        Some(Mark::Finished) => {}
                    },
                    None => {
                        let done: &NodeId = *node;
                        marks.insert(done, Mark::Finished);
                        postorder.push(done.clone());
                        stack.pop();
                    }
                }
            }
        }

        Ok(postorder)
    }

    /// Returns one cycle of the view, if any
    pub(crate) fn find_cycle(&self) -> Option<CyclePath> {
        self.depth_first().err()
    }
}
