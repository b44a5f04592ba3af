//! Dependency classification and declarations

use crate::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How strongly a dependent is bound to a dependency
///
/// Both kinds order the dependent after the dependency. Only a hard
/// dependency blocks the dependent from becoming runnable; a soft one is
/// left to the caller's discretion.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// Non-completion blocks the dependent
    #[default]
    Hard,
    /// Ordering hint only
    Soft,
}

impl DependencyKind {
    /// Returns true for [`DependencyKind::Hard`]
    pub fn is_hard(self) -> bool {
        self == Self::Hard
    }

    /// Combines two declarations of the same edge; hard wins
    pub(crate) fn merge(self, other: Self) -> Self {
        if self.is_hard() || other.is_hard() {
            Self::Hard
        } else {
            Self::Soft
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hard => f.write_str("hard"),
            Self::Soft => f.write_str("soft"),
        }
    }
}

/// A single dependency entry of a node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    id: NodeId,
    kind: DependencyKind,
}

impl Dependency {
    pub(crate) fn new(id: NodeId, kind: DependencyKind) -> Self {
        Self { id, kind }
    }

    /// The id depended on
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// The classification of this dependency
    pub fn kind(&self) -> DependencyKind {
        self.kind
    }

    pub(crate) fn upgrade(&mut self, kind: DependencyKind) {
        self.kind = self.kind.merge(kind);
    }
}

/// One or more dependency ids sharing a classification
///
/// Deserializes from a bare id, a list of ids, or an object naming the
/// ids under `on` with an optional `type`:
///
/// ```
/// use taskgraph::{DependencyDeclaration, DependencyKind};
///
/// let single: DependencyDeclaration = serde_json::from_str(r#""user.created""#).unwrap();
/// let many: DependencyDeclaration = serde_json::from_str(r#"["a", "b"]"#).unwrap();
/// let soft: DependencyDeclaration =
///     serde_json::from_str(r#"{"on": "a", "type": "soft"}"#).unwrap();
///
/// assert_eq!(single.ids().len(), 1);
/// assert_eq!(many.ids().len(), 2);
/// assert_eq!(soft.kind(), DependencyKind::Soft);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawDeclaration")]
pub struct DependencyDeclaration {
    on: Vec<NodeId>,
    #[serde(rename = "type")]
    kind: DependencyKind,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Targets {
    Single(NodeId),
    Many(Vec<NodeId>),
}

impl From<Targets> for Vec<NodeId> {
    fn from(targets: Targets) -> Self {
        match targets {
            Targets::Single(id) => vec![id],
            Targets::Many(ids) => ids,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDeclaration {
    Bare(Targets),
    Detailed {
        on: Targets,
        #[serde(default, rename = "type")]
        kind: DependencyKind,
    },
}

impl From<RawDeclaration> for DependencyDeclaration {
    fn from(raw: RawDeclaration) -> Self {
        match raw {
            RawDeclaration::Bare(targets) => Self::all(Vec::from(targets)),
            RawDeclaration::Detailed { on, kind } => Self::all(Vec::from(on)).with_kind(kind),
        }
    }
}

impl DependencyDeclaration {
    /// Declares a hard dependency on a single id
    pub fn on(id: impl Into<NodeId>) -> Self {
        Self {
            on: vec![id.into()],
            kind: DependencyKind::Hard,
        }
    }

    /// Declares hard dependencies on every id in `ids`
    pub fn all<I, D>(ids: I) -> Self
    where
        I: IntoIterator<Item = D>,
        D: Into<NodeId>,
    {
        Self {
            on: ids.into_iter().map(Into::into).collect(),
            kind: DependencyKind::Hard,
        }
    }

    /// Applies `kind` to every id of the declaration
    pub fn with_kind(mut self, kind: DependencyKind) -> Self {
        self.kind = kind;
        self
    }

    /// Marks every id of the declaration as a soft dependency
    pub fn soft(self) -> Self {
        self.with_kind(DependencyKind::Soft)
    }

    /// The declared ids, in declaration order
    pub fn ids(&self) -> &[NodeId] {
        &self.on
    }

    /// The classification applied to every id
    pub fn kind(&self) -> DependencyKind {
        self.kind
    }
}

impl From<&str> for DependencyDeclaration {
    fn from(id: &str) -> Self {
        Self::on(id)
    }
}

impl From<NodeId> for DependencyDeclaration {
    fn from(id: NodeId) -> Self {
        Self::on(id)
    }
}

impl<D: Into<NodeId>> From<Vec<D>> for DependencyDeclaration {
    fn from(ids: Vec<D>) -> Self {
        Self::all(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hard_is_default() {
        assert_eq!(DependencyKind::default(), DependencyKind::Hard);
        assert_eq!(DependencyDeclaration::on("a").kind(), DependencyKind::Hard);
    }

    #[test]
    fn test_merge_prefers_hard() {
        assert_eq!(DependencyKind::Soft.merge(DependencyKind::Hard), DependencyKind::Hard);
        assert_eq!(DependencyKind::Soft.merge(DependencyKind::Soft), DependencyKind::Soft);
    }

    #[test]
    fn test_declaration_forms_deserialize() {
        let decl: DependencyDeclaration = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        assert_eq!(decl.ids(), &["a", "b"]);
        assert_eq!(decl.kind(), DependencyKind::Hard);

        let decl: DependencyDeclaration =
            serde_json::from_str(r#"{"on": ["x", "y"], "type": "soft"}"#).unwrap();
        assert_eq!(decl.ids(), &["x", "y"]);
        assert_eq!(decl.kind(), DependencyKind::Soft);

        let decl: DependencyDeclaration = serde_json::from_str(r#"{"on": "x"}"#).unwrap();
        assert_eq!(decl, DependencyDeclaration::on("x"));
    }

    #[test]
    fn test_declaration_serializes_detailed_form() {
        let decl = DependencyDeclaration::all(["a", "b"]).soft();
        let json = serde_json::to_value(&decl).unwrap();
        assert_eq!(json, serde_json::json!({"on": ["a", "b"], "type": "soft"}));

        let back: DependencyDeclaration = serde_json::from_value(json).unwrap();
        assert_eq!(back, decl);
    }

    #[test]
    fn test_declaration_conversions() {
        let decl: DependencyDeclaration = vec!["a", "b"].into();
        assert_eq!(decl.ids().len(), 2);

        let decl: DependencyDeclaration = NodeId::event("user", "created").into();
        assert_eq!(decl.ids(), &["user.created"]);
    }
}
