//! Node identifier type
//!
//! This module defines the NodeId type which uniquely identifies a node
//! within a dependency graph. Identifiers are plain strings compared
//! byte-wise, so every ordering produced by this crate is lexicographic.
//!
//! Nodes synthesized from event registrations use the `entity.event`
//! convention; [`NodeId::event`] builds such an id and [`NodeId::entity`] /
//! [`NodeId::event_name`] take it apart again.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Unique identifier for a node in a dependency graph
///
/// # Examples
///
/// ```
/// use taskgraph::NodeId;
///
/// let node = NodeId::event("order", "created");
/// assert_eq!(node.as_str(), "order.created");
/// assert_eq!(node.entity(), Some("order"));
/// assert_eq!(node.event_name(), Some("created"));
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Creates a new NodeId from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates the id of an event node: `entity.event`
    pub fn event(entity: impl AsRef<str>, event: impl AsRef<str>) -> Self {
        Self(format!("{}.{}", entity.as_ref(), event.as_ref()))
    }

    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the entity portion of an `entity.event` id
    pub fn entity(&self) -> Option<&str> {
        self.0.split_once('.').map(|(entity, _)| entity)
    }

    /// Returns the event portion of an `entity.event` id
    pub fn event_name(&self) -> Option<&str> {
        self.0.split_once('.').map(|(_, event)| event)
    }

    /// Consumes the id and returns the underlying string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&String> for NodeId {
    fn from(s: &String) -> Self {
        Self(s.clone())
    }
}

impl From<&NodeId> for NodeId {
    fn from(id: &NodeId) -> Self {
        id.clone()
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_creation() {
        let node = NodeId::new("process_payment");
        assert_eq!(node.as_str(), "process_payment");
        assert!(node.entity().is_none());
    }

    #[test]
    fn test_event_node_id() {
        let node = NodeId::event("invoice", "paid");
        assert_eq!(node.as_str(), "invoice.paid");
        assert_eq!(node.entity(), Some("invoice"));
        assert_eq!(node.event_name(), Some("paid"));
    }

    #[test]
    fn test_event_name_keeps_later_dots() {
        let node: NodeId = "shop.order.created".into();
        assert_eq!(node.entity(), Some("shop"));
        assert_eq!(node.event_name(), Some("order.created"));
    }

    #[test]
    fn test_node_id_ordering_is_lexicographic() {
        let mut ids: Vec<NodeId> = vec!["b".into(), "B".into(), "a".into(), "a1".into()];
        ids.sort();
        assert_eq!(ids, vec!["B", "a", "a1", "b"]);
    }

    #[test]
    fn test_node_id_display_and_debug() {
        let node = NodeId::new("my_step");
        assert_eq!(format!("{}", node), "my_step");
        assert_eq!(format!("{:?}", node), "NodeId(my_step)");
    }

    #[test]
    fn test_node_id_borrow_lookup() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(NodeId::new("step_a"));
        set.insert(NodeId::new("step_b"));
        set.insert(NodeId::new("step_a"));

        assert_eq!(set.len(), 2);
        assert!(set.contains("step_b"));
    }

    #[test]
    fn test_node_id_serializes_as_plain_string() {
        let node = NodeId::event("user", "signed_up");
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(json, "\"user.signed_up\"");

        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }
}
