//! Debug exports of a dependency graph
//!
//! Three renderings for external tooling:
//! - [`DependencyGraph::to_dot`]: Graphviz DOT text
//! - [`DependencyGraph::to_export`]: a serde-friendly `{nodes, edges}` form
//! - [`DependencyGraph::to_petgraph`]: a `petgraph` graph for ad-hoc analysis
//!
//! Nodes and edges are emitted in sorted order, so two graphs with the same
//! node and edge sets export identically no matter how they were built.

use super::dependency::DependencyKind;
use super::dependency_graph::{DependencyGraph, GraphOptions};
use super::error::GraphResult;
use crate::NodeId;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write;

/// Structural form of a graph: `{ nodes: [...], edges: [{from, to, type}] }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphExport {
    /// Every node id, ascending
    pub nodes: Vec<NodeId>,
    /// Every edge, ordered by `(from, to)`
    pub edges: Vec<ExportEdge>,
}

/// One edge of a [`GraphExport`]: `to` depends on `from`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportEdge {
    /// The dependency
    pub from: NodeId,
    /// The dependent
    pub to: NodeId,
    /// Classification of the dependency
    #[serde(rename = "type", default)]
    pub kind: DependencyKind,
}

fn quoted(id: &NodeId) -> String {
    let mut out = String::with_capacity(id.as_str().len() + 2);
    out.push('"');
    for ch in id.as_str().chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

impl DependencyGraph {
    /// Returns every edge ordered by `(from, to)`
    pub fn edges(&self) -> Vec<ExportEdge> {
        let mut edges: Vec<ExportEdge> = self
            .node_ids()
            .into_iter()
            .filter_map(|id| self.node(id.as_str()).map(|node| (id, node)))
            .flat_map(|(to, node)| {
                node.dependencies().iter().map(move |dep| ExportEdge {
                    from: dep.id().clone(),
                    to: to.clone(),
                    kind: dep.kind(),
                })
            })
            .collect();
        edges.sort_by(|a, b| (&a.from, &a.to).cmp(&(&b.from, &b.to)));
        edges
    }

    /// Renders the graph in Graphviz DOT format
    ///
    /// Soft dependencies are drawn dashed.
    ///
    /// ```
    /// use taskgraph::{DependencyGraph, DependencyKind};
    ///
    /// let mut graph = DependencyGraph::new();
    /// graph.add_node("A").unwrap();
    /// graph.add_node_with_dependencies("B", ["A"], DependencyKind::Hard).unwrap();
    ///
    /// assert_eq!(graph.to_dot(), "digraph {\n    \"A\";\n    \"B\";\n    \"A\" -> \"B\";\n}\n");
    /// ```
    pub fn to_dot(&self) -> String {
        // petgraph's `Dot` labels nodes by index or `Debug` weight, so ids
        // and edge styles are written out directly.
        let mut dot = String::from("digraph {\n");
        for id in self.node_ids() {
            let _ = writeln!(dot, "    {};", quoted(&id));
        }
        for edge in self.edges() {
            let style = match edge.kind {
                DependencyKind::Hard => "",
                DependencyKind::Soft => " [style=dashed]",
            };
            let _ = writeln!(dot, "    {} -> {}{};", quoted(&edge.from), quoted(&edge.to), style);
        }
        dot.push_str("}\n");
        dot
    }

    /// Returns the structural `{nodes, edges}` form of the graph
    pub fn to_export(&self) -> GraphExport {
        GraphExport {
            nodes: self.node_ids(),
            edges: self.edges(),
        }
    }

    /// Rebuilds a strict graph with the node and edge set of `export`
    ///
    /// Every edge goes through [`DependencyGraph::add_edge`], so an export
    /// describing a cycle or a dangling edge is rejected.
    pub fn from_export(export: &GraphExport) -> GraphResult<Self> {
        let mut graph = Self::with_options(GraphOptions::STRICT);
        for id in &export.nodes {
            graph.add_node(id.clone())?;
        }
        for edge in &export.edges {
            graph.add_edge(edge.from.clone(), edge.to.clone(), edge.kind)?;
        }
        Ok(graph)
    }

    /// Converts the graph into a `petgraph` directed graph
    ///
    /// Node weights are ids, edge weights are classifications, edges point
    /// from dependency to dependent. Nodes are inserted in ascending id
    /// order, so `NodeIndex(i)` is the i-th smallest id.
    pub fn to_petgraph(&self) -> DiGraph<NodeId, DependencyKind> {
        let ids = self.node_ids();
        let mut graph = DiGraph::with_capacity(ids.len(), 0);
        let mut indices: HashMap<NodeId, NodeIndex> = HashMap::with_capacity(ids.len());

        for id in ids {
            let idx = graph.add_node(id.clone());
            indices.insert(id, idx);
        }

        for edge in self.edges() {
            if let (Some(&from), Some(&to)) = (indices.get(&edge.from), indices.get(&edge.to)) {
                graph.add_edge(from, to, edge.kind);
            }
        }

        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GraphError;
    use petgraph::algo::{is_cyclic_directed, toposort};

    fn sample() -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        graph.add_node("config").unwrap();
        graph.add_node("cache").unwrap();
        graph
            .add_node_with_dependencies("serve", ["config"], DependencyKind::Hard)
            .unwrap();
        graph
            .add_edge("cache", "serve", DependencyKind::Soft)
            .unwrap();
        graph
    }

    #[test]
    fn test_dot_output() {
        let dot = sample().to_dot();
        assert_eq!(
            dot,
            "digraph {\n    \"cache\";\n    \"config\";\n    \"serve\";\n    \
             \"cache\" -> \"serve\" [style=dashed];\n    \"config\" -> \"serve\";\n}\n"
        );
    }

    #[test]
    fn test_dot_escapes_quotes() {
        let mut graph = DependencyGraph::new();
        graph.add_node("say \"hi\"").unwrap();
        assert!(graph.to_dot().contains("\"say \\\"hi\\\"\";"));
    }

    #[test]
    fn test_export_structure() {
        let export = sample().to_export();
        assert_eq!(export.nodes, vec!["cache", "config", "serve"]);
        assert_eq!(export.edges.len(), 2);

        let json = serde_json::to_value(&export).unwrap();
        assert_eq!(
            json["edges"][0],
            serde_json::json!({"from": "cache", "to": "serve", "type": "soft"})
        );
    }

    #[test]
    fn test_export_rebuilds_same_graph() {
        let graph = sample();
        let rebuilt = DependencyGraph::from_export(&graph.to_export()).unwrap();
        assert_eq!(rebuilt.to_export(), graph.to_export());
        assert_eq!(rebuilt.soft_dependencies("serve").unwrap(), vec!["cache"]);
    }

    #[test]
    fn test_from_export_rejects_cycle() {
        let export: GraphExport = serde_json::from_value(serde_json::json!({
            "nodes": ["a", "b"],
            "edges": [{"from": "a", "to": "b"}, {"from": "b", "to": "a"}]
        }))
        .unwrap();
        let err = DependencyGraph::from_export(&export).unwrap_err();
        assert!(matches!(err, GraphError::CycleDetected { .. }));
    }

    #[test]
    fn test_petgraph_conversion() {
        let pg = sample().to_petgraph();
        assert_eq!(pg.node_count(), 3);
        assert_eq!(pg.edge_count(), 2);
        assert!(!is_cyclic_directed(&pg));

        let order: Vec<&str> = toposort(&pg, None)
            .unwrap()
            .into_iter()
            .map(|idx| pg[idx].as_str())
            .collect();
        assert_eq!(order.last(), Some(&"serve"));
    }
}
