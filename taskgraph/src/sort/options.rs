//! Sort configuration
//!
//! `SortOptions` controls which algorithm runs and how the sorter reacts
//! to cycles and unknown dependency ids.
//!
//! # Examples
//!
//! ```
//! use taskgraph::{SortAlgorithm, SortOptions};
//!
//! // Defaults: Kahn, report cycles as a flag, reject unknown ids
//! let options = SortOptions::default();
//! assert_eq!(options, SortOptions::DEFAULT);
//!
//! // Named presets
//! assert!(SortOptions::FAIL_FAST.fail_on_cycle);
//! assert!(!SortOptions::LENIENT.strict);
//!
//! // Builder style
//! let options = SortOptions::new()
//!     .with_algorithm(SortAlgorithm::Dfs)
//!     .with_fail_on_cycle(true);
//! assert_eq!(options.algorithm, SortAlgorithm::Dfs);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Topological sort algorithm
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortAlgorithm {
    /// In-degree peeling, smallest ready id first
    #[default]
    Kahn,
    /// Depth-first traversal, reverse postorder
    Dfs,
}

impl fmt::Display for SortAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kahn => f.write_str("kahn"),
            Self::Dfs => f.write_str("dfs"),
        }
    }
}

/// Configuration for a standalone topological sort.
///
/// Deserializes from camelCase keys (`algorithm`, `failOnCycle`, `strict`;
/// `throwOnCycle` is accepted as an alias) with every field optional.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SortOptions {
    /// Which algorithm computes the order.
    ///
    /// Default: [`SortAlgorithm::Kahn`]
    pub algorithm: SortAlgorithm,

    /// Turn a detected cycle into [`GraphError::CycleDetected`](crate::GraphError)
    /// instead of returning a result with `has_cycle` set.
    ///
    /// Default: false
    #[serde(alias = "throwOnCycle")]
    pub fail_on_cycle: bool,

    /// Reject dependency ids that name no node in the input.
    ///
    /// When false, unknown ids are treated as already satisfied.
    ///
    /// Default: true
    pub strict: bool,
}

impl SortOptions {
    /// Kahn, cycles reported as a flag, unknown ids rejected.
    pub const DEFAULT: Self = Self {
        algorithm: SortAlgorithm::Kahn,
        fail_on_cycle: false,
        strict: true,
    };

    /// Like [`SortOptions::DEFAULT`] but cycles fail the call.
    pub const FAIL_FAST: Self = Self {
        algorithm: SortAlgorithm::Kahn,
        fail_on_cycle: true,
        strict: true,
    };

    /// Like [`SortOptions::DEFAULT`] but unknown ids are ignored.
    pub const LENIENT: Self = Self {
        algorithm: SortAlgorithm::Kahn,
        fail_on_cycle: false,
        strict: false,
    };

    /// Returns the default options
    pub const fn new() -> Self {
        Self::DEFAULT
    }

    /// Sets the algorithm
    pub const fn with_algorithm(mut self, algorithm: SortAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets whether a cycle fails the call
    pub const fn with_fail_on_cycle(mut self, fail_on_cycle: bool) -> Self {
        self.fail_on_cycle = fail_on_cycle;
        self
    }

    /// Sets whether unknown dependency ids fail the call
    pub const fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

impl Default for SortOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}
