//! Kahn's algorithm with a lexicographic ready set
//!
//! # Algorithm
//!
//! 1. Compute the in-degree (distinct dependencies) of every node
//! 2. Put every node with in-degree 0 in the ready set
//! 3. While the ready set is not empty:
//!    a. Remove the smallest id, append it to the order
//!    b. For each dependent, decrement its in-degree
//!    c. If an in-degree reaches 0, add that dependent to the ready set
//! 4. Nodes left over are blocked by at least one cycle
//!
//! A `BTreeSet` as the ready set is what makes the order deterministic:
//! among nodes that are free to go next, the smallest id always wins.

use super::view::DependencyView;
use super::Outcome;

pub(crate) fn sort(view: &DependencyView) -> Outcome {
    let (order, blocked) = view.peel_smallest_first();
    if blocked.is_empty() {
        return Outcome { order, cycle: None };
    }

    let cycle = view.restrict(&blocked).find_cycle();
    Outcome { order, cycle }
}
