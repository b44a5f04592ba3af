//! End-to-end scenarios across the graph store, sorter and level planner
//!
//! Each scenario is checked through every public surface that can see it:
//! the standalone sorter (both algorithms), the level planner and the
//! validated graph store.

use taskgraph::prelude::*;
use taskgraph::GraphExport;

fn node(id: &str, deps: &[&str]) -> SortNode {
    SortNode::new(id).with_dependencies(deps.iter().copied())
}

fn algorithms() -> [SortOptions; 2] {
    [
        SortOptions::DEFAULT.with_algorithm(SortAlgorithm::Kahn),
        SortOptions::DEFAULT.with_algorithm(SortAlgorithm::Dfs),
    ]
}

fn position(order: &[NodeId], id: &str) -> usize {
    order
        .iter()
        .position(|candidate| candidate == id)
        .unwrap_or_else(|| panic!("{id} missing from order"))
}

// =============================================================================
// Standalone sorter
// =============================================================================

#[test]
fn linear_chain_sorts_in_dependency_order() {
    let nodes = [node("C", &["B"]), node("A", &[]), node("B", &["A"])];
    for options in algorithms() {
        let result = topological_sort(&nodes, options).unwrap();
        assert_eq!(result.order, vec!["A", "B", "C"], "{}", options.algorithm);
        assert!(!result.has_cycle);
    }
}

#[test]
fn diamond_puts_root_first_and_join_last() {
    let nodes = [
        node("D", &["B", "C"]),
        node("C", &["A"]),
        node("B", &["A"]),
        node("A", &[]),
    ];
    for options in algorithms() {
        let order = topological_sort(&nodes, options).unwrap().order;
        assert_eq!(position(&order, "A"), 0);
        assert_eq!(position(&order, "D"), 3);
    }

    // The B/C tie is broken lexicographically by both algorithms
    for options in algorithms() {
        let order = topological_sort(&nodes, options).unwrap().order;
        assert_eq!(order, vec!["A", "B", "C", "D"]);
    }
}

#[test]
fn unconstrained_branches_come_out_ascending() {
    // b and c only wait on ancestors; neither algorithm may put c first
    let nodes = [
        node("d", &[]),
        node("a", &["d"]),
        node("c", &["a"]),
        node("b", &["d"]),
    ];
    for options in algorithms() {
        let order = topological_sort(&nodes, options).unwrap().order;
        assert_eq!(order, vec!["d", "a", "b", "c"], "{}", options.algorithm);
    }
}

#[test]
fn mutual_cycle_is_flagged_with_path() {
    let nodes = [node("A", &["B"]), node("B", &["A"])];
    for options in algorithms() {
        let result = topological_sort(&nodes, options).unwrap();
        assert!(result.has_cycle);
        assert_eq!(result.cycle_path.unwrap().to_string(), "A -> B -> A");
    }

    let err = topological_sort(&nodes, SortOptions::FAIL_FAST).unwrap_err();
    assert!(err.is_cycle());
    assert_eq!(err.to_string(), "Cycle detected in dependency graph: A -> B -> A");
}

#[test]
fn self_cycle_is_single_member_path() {
    let nodes = [node("A", &["A"])];
    for options in algorithms() {
        let result = topological_sort(&nodes, options).unwrap();
        assert!(result.has_cycle);
        assert_eq!(result.cycle_path.unwrap().members(), &["A"]);
    }
}

#[test]
fn kahn_keeps_partial_order_before_cycle() {
    let nodes = [
        node("setup", &[]),
        node("x", &["setup", "y"]),
        node("y", &["x"]),
        node("teardown", &["x"]),
    ];
    let result = topological_sort(&nodes, SortOptions::DEFAULT).unwrap();
    assert!(result.has_cycle);
    assert_eq!(result.order, vec!["setup"]);
    assert_eq!(result.cycle_path.unwrap().to_string(), "x -> y -> x");

    let result = topological_sort(&nodes, SortOptions::DEFAULT.with_algorithm(SortAlgorithm::Dfs))
        .unwrap();
    assert!(result.order.is_empty());
}

#[test]
fn options_load_from_config() {
    let options: SortOptions =
        serde_json::from_str(r#"{"algorithm": "dfs", "throwOnCycle": true}"#).unwrap();
    assert_eq!(options.algorithm, SortAlgorithm::Dfs);
    assert!(options.fail_on_cycle);
    assert!(options.strict);
}

// =============================================================================
// Level planner
// =============================================================================

#[test]
fn two_roots_and_join_form_two_levels() {
    let nodes = [node("A", &[]), node("B", &[]), node("C", &["A", "B"])];
    let levels = execution_levels(&nodes).unwrap();
    assert_eq!(
        serde_json::to_value(&levels).unwrap(),
        serde_json::json!([
            {"level": 0, "nodes": ["A", "B"]},
            {"level": 1, "nodes": ["C"]}
        ])
    );
}

#[test]
fn level_planner_rejects_cycles() {
    let err = execution_levels(&[node("A", &["B"]), node("B", &["A"])]).unwrap_err();
    assert!(matches!(err, GraphError::CycleDetected { .. }));
}

// =============================================================================
// Graph store
// =============================================================================

#[test]
fn graph_store_rejects_back_edge_atomically() {
    let mut graph = DependencyGraph::new();
    graph.add_node("A").unwrap();
    graph
        .add_node_with_dependencies("B", ["A"], DependencyKind::Hard)
        .unwrap();
    graph
        .add_node_with_dependencies("C", ["B"], DependencyKind::Hard)
        .unwrap();
    let before: GraphExport = graph.to_export();

    let err = graph.add_edge("C", "A", DependencyKind::Hard).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cycle detected in dependency graph: A -> B -> C -> A"
    );
    assert_eq!(graph.to_export(), before);
    assert_eq!(graph.dependencies("C").unwrap(), vec!["B"]);
}

#[test]
fn graph_store_rejects_unknown_dependency_atomically() {
    let mut graph = DependencyGraph::new();
    graph.add_node("A").unwrap();

    let err = graph
        .add_node_with_dependencies("B", ["A", "ghost"], DependencyKind::Hard)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Dependency 'ghost' for node 'B' does not exist"
    );
    assert!(!graph.contains("B"));
    assert!(graph.dependents("A").unwrap().is_empty());
}

#[test]
fn graph_store_agrees_with_standalone_sorter() {
    let mut graph = DependencyGraph::new();
    graph.add_node("fetch").unwrap();
    graph.add_node("config").unwrap();
    graph
        .add_node_with_dependencies("parse", ["fetch"], DependencyKind::Hard)
        .unwrap();
    graph
        .add_node_with_dependencies("store", ["parse", "config"], DependencyKind::Hard)
        .unwrap();
    graph
        .add_edge("config", "parse", DependencyKind::Soft)
        .unwrap();

    for options in algorithms() {
        let from_store = graph.topological_sort(options).unwrap();
        let from_snapshot = topological_sort(&graph.snapshot(), options).unwrap();
        assert_eq!(from_store, from_snapshot);
    }
    assert_eq!(graph.parallel_groups(), execution_levels(&graph.snapshot()).unwrap());
    assert_eq!(graph.all_dependencies("store").unwrap(), vec!["config", "fetch", "parse"]);
}

#[test]
fn registrations_drive_the_whole_pipeline() {
    let registrations: Vec<EventRegistration> = serde_json::from_value(serde_json::json!([
        {"entity": "invoice", "event": "sent", "dependsOn": ["invoice.created", "customer.verified"]},
        {"entity": "invoice", "event": "created", "dependsOn": "customer.verified"},
        {"entity": "customer", "event": "verified"},
        {"entity": "metrics", "event": "recorded", "dependsOn": {"on": "invoice.sent", "type": "soft"}}
    ]))
    .unwrap();

    let graph = DependencyGraph::from_event_registrations(&registrations).unwrap();
    let order = graph.topological_sort(SortOptions::FAIL_FAST).unwrap().order;
    assert_eq!(
        order,
        vec!["customer.verified", "invoice.created", "invoice.sent", "metrics.recorded"]
    );
    assert_eq!(
        graph.soft_dependencies("metrics.recorded").unwrap(),
        vec!["invoice.sent"]
    );

    let dot = graph.to_dot();
    assert!(dot.contains("\"invoice.sent\" -> \"metrics.recorded\" [style=dashed];"));
}
