//! Depth-first topological sort
//!
//! The explicitly-stacked three-state traversal decides acyclicity and, on
//! a back edge, reconstructs the cycle from the active stack. Deep chains
//! cost heap, not call stack.
//!
//! A plain reverse postorder does not keep unconstrained ids in ascending
//! order (`b` and `c` below both wait only on ancestors, yet the postorder
//! of `d -> a -> c`, `d -> b` puts `c` first). Once the traversal has
//! proven the view acyclic, the order is released smallest-ready-first, so
//! both algorithms obey the same tie-break law.
//!
//! When a back edge is found the traversal stops; no partial order is
//! produced, only the cycle.

use super::view::DependencyView;
use super::Outcome;

pub(crate) fn sort(view: &DependencyView) -> Outcome {
    match view.depth_first() {
        Ok(_) => {
            let (order, _) = view.peel_smallest_first();
            Outcome { order, cycle: None }
        }
        Err(path) => Outcome {
            order: Vec::new(),
            cycle: Some(path),
        },
    }
}
