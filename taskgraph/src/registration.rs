//! Adapter from event registrations to graph nodes
//!
//! Event handlers are registered as `{entity, event, dependsOn?}` records.
//! Each record becomes the node `entity.event`; its declaration names other
//! nodes by their full `entity.event` id.
//!
//! ```
//! use taskgraph::{DependencyGraph, EventRegistration};
//!
//! let registrations: Vec<EventRegistration> = serde_json::from_str(r#"[
//!     {"entity": "order", "event": "paid", "dependsOn": "order.created"},
//!     {"entity": "order", "event": "created"}
//! ]"#).unwrap();
//!
//! let graph = DependencyGraph::from_event_registrations(&registrations).unwrap();
//! assert_eq!(graph.dependencies("order.paid").unwrap(), vec!["order.created"]);
//! ```

use crate::graph::{DependencyDeclaration, DependencyGraph, GraphOptions, GraphResult};
use crate::NodeId;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One handler registration of the event system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRegistration {
    /// Entity half of the node id, e.g. `order`
    pub entity: String,
    /// Event half of the node id, e.g. `paid`
    pub event: String,
    /// Nodes that must be handled first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<DependencyDeclaration>,
}

impl EventRegistration {
    /// Creates a registration with no dependencies
    pub fn new(entity: impl Into<String>, event: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            event: event.into(),
            depends_on: None,
        }
    }

    /// Attaches a dependency declaration
    pub fn depends_on(mut self, declaration: impl Into<DependencyDeclaration>) -> Self {
        self.depends_on = Some(declaration.into());
        self
    }

    /// The graph id of this registration: `entity.event`
    pub fn node_id(&self) -> NodeId {
        NodeId::event(&self.entity, &self.event)
    }
}

impl DependencyGraph {
    /// Builds a strict graph from event registrations
    ///
    /// Every registration is added as a node before any dependency is wired,
    /// so registrations may appear in any order.
    ///
    /// # Errors
    ///
    /// - [`GraphError::DuplicateNode`](crate::GraphError::DuplicateNode) if
    ///   two registrations share `entity.event`
    /// - [`GraphError::MissingDependency`](crate::GraphError::MissingDependency)
    ///   if a declaration names an unregistered id
    /// - [`GraphError::CycleDetected`](crate::GraphError::CycleDetected) if the
    ///   declarations form a cycle
    pub fn from_event_registrations(registrations: &[EventRegistration]) -> GraphResult<Self> {
        Self::from_event_registrations_with(registrations, GraphOptions::STRICT)
    }

    /// Builds a graph from event registrations under the given policy
    ///
    /// In lenient mode declarations naming unregistered ids are dropped with
    /// a warning.
    pub fn from_event_registrations_with(
        registrations: &[EventRegistration],
        options: GraphOptions,
    ) -> GraphResult<Self> {
        let mut graph = Self::with_options(options);
        for registration in registrations {
            graph.add_node(registration.node_id())?;
        }

        for registration in registrations {
            let Some(declaration) = &registration.depends_on else {
                continue;
            };
            let id = registration.node_id();
            for dependency in declaration.ids() {
                if !options.strict && !graph.contains(dependency.as_str()) {
                    warn!(node = %id, %dependency, "ignoring dependency on unregistered event");
                    continue;
                }
                graph.add_edge(dependency.clone(), id.clone(), declaration.kind())?;
            }
        }

        debug!(nodes = graph.len(), "graph built from event registrations");
        Ok(graph)
    }
}
