//! Execution-level planning
//!
//! Groups a validated node set into batches that can be dispatched
//! concurrently. A node's level is the length of its longest dependency
//! chain from a dependency-free node, so:
//!
//! - level 0 is exactly the set of nodes without dependencies
//! - every node sits strictly above each of its dependencies
//! - nodes sharing a level have no path between them
//!
//! ```text
//!   fetch_user ──┐
//!   inventory ───┼──► validate ──► charge
//!   pricing ─────┘
//!
//!   level 0: [fetch_user, inventory, pricing]
//!   level 1: [validate]
//!   level 2: [charge]
//! ```

use crate::graph::{GraphError, GraphResult};
use crate::sort::view::DependencyView;
use crate::sort::SortNode;
use crate::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// A batch of mutually independent nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionLevel {
    /// Position of the batch, starting at 0
    pub level: usize,
    /// Node ids in ascending order
    pub nodes: Vec<NodeId>,
}

/// Groups `nodes` into execution levels
///
/// The input is always validated first: duplicate ids, unknown dependency
/// ids and cycles are errors, never flags.
///
/// ```
/// use taskgraph::{execution_levels, SortNode};
///
/// let nodes = vec![
///     SortNode::new("A"),
///     SortNode::new("B"),
///     SortNode::new("C").with_dependencies(["A", "B"]),
/// ];
///
/// let levels = execution_levels(&nodes).unwrap();
/// assert_eq!(levels[0].nodes, vec!["A", "B"]);
/// assert_eq!(levels[1].nodes, vec!["C"]);
/// ```
pub fn execution_levels(nodes: &[SortNode]) -> GraphResult<Vec<ExecutionLevel>> {
    let view = DependencyView::from_nodes(nodes, true)?;
    if let Some(path) = view.find_cycle() {
        debug!(cycle = %path, "refusing to plan levels for cyclic input");
        return Err(GraphError::cycle(path));
    }
    Ok(assign_levels(&view))
}

/// Layered in-degree peeling over an acyclic view
///
/// Each round removes every node whose remaining in-degree is zero; the
/// round number is the node's level. Nodes left over on a cyclic view are
/// not assigned, so callers check for cycles first.
pub(crate) fn assign_levels(view: &DependencyView) -> Vec<ExecutionLevel> {
    let mut remaining: BTreeMap<&NodeId, usize> = view
        .ids()
        .map(|id| (id, view.dependencies_of(id).len()))
        .collect();

    let mut current: Vec<&NodeId> = remaining
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();

    let mut levels = Vec::new();
    while !current.is_empty() {
        let mut next = Vec::new();
        for id in &current {
            for dependent in view.dependents_of(id) {
                if let Some(degree) = remaining.get_mut(dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        next.push(dependent);
                    }
                }
            }
        }
        next.sort();

        levels.push(ExecutionLevel {
            level: levels.len(),
            nodes: current.into_iter().cloned().collect(),
        });
        current = next;
    }

    debug!(levels = levels.len(), nodes = view.len(), "execution levels computed");
    levels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, deps: &[&str]) -> SortNode {
        SortNode::new(id).with_dependencies(deps.iter().copied())
    }

    #[test]
    fn test_two_roots_and_join() {
        let levels = execution_levels(&[node("C", &["A", "B"]), node("B", &[]), node("A", &[])])
            .unwrap();
        assert_eq!(
            levels,
            vec![
                ExecutionLevel {
                    level: 0,
                    nodes: vec!["A".into(), "B".into()],
                },
                ExecutionLevel {
                    level: 1,
                    nodes: vec!["C".into()],
                },
            ]
        );
    }

    #[test]
    fn test_level_is_longest_chain() {
        // D hangs off both A (depth 0) and C (depth 2)
        let levels = execution_levels(&[
            node("A", &[]),
            node("B", &["A"]),
            node("C", &["B"]),
            node("D", &["A", "C"]),
        ])
        .unwrap();
        let d = levels
            .iter()
            .find(|level| level.nodes.contains(&NodeId::new("D")))
            .map(|level| level.level);
        assert_eq!(d, Some(3));
        assert_eq!(levels.len(), 4);
    }

    #[test]
    fn test_every_node_placed_once() {
        let nodes = [
            node("a", &[]),
            node("b", &["a"]),
            node("c", &["a"]),
            node("d", &[]),
            node("e", &["b", "d"]),
        ];
        let levels = execution_levels(&nodes).unwrap();
        let mut placed: Vec<&NodeId> = levels.iter().flat_map(|l| l.nodes.iter()).collect();
        placed.sort();
        assert_eq!(placed, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(levels[0].nodes, vec!["a", "d"]);
        assert_eq!(levels[1].nodes, vec!["b", "c"]);
        assert_eq!(levels[2].nodes, vec!["e"]);
    }

    #[test]
    fn test_cycle_is_an_error() {
        let err = execution_levels(&[node("a", &["b"]), node("b", &["a"])]).unwrap_err();
        assert_eq!(err.cycle_path().unwrap().to_string(), "a -> b -> a");
    }

    #[test]
    fn test_unknown_dependency_is_an_error() {
        let err = execution_levels(&[node("a", &["ghost"])]).unwrap_err();
        assert_eq!(err, GraphError::missing_dependency("ghost", "a"));
    }

    #[test]
    fn test_empty_input() {
        assert!(execution_levels(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_levels_serialize() {
        let levels = execution_levels(&[node("x", &[])]).unwrap();
        let json = serde_json::to_value(&levels).unwrap();
        assert_eq!(json, serde_json::json!([{"level": 0, "nodes": ["x"]}]));
    }
}
