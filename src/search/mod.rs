pub(crate) mod branching;
pub(crate) mod tree;

use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;

use crate::engine::best_bound::SharedBound;

/// The state shared by all search workers.
///
/// Everything in here is monotone: the subproblem counter only advances, the
/// best bound only tightens, the stop flag and the progress counters only
/// grow. Workers never share search stacks or stores.
#[derive(Debug)]
pub(crate) struct SharedSearchState {
    /// Next decomposition index to hand out; fetch-add dispenser.
    pub(crate) next_subproblem: AtomicU64,
    /// Total number of decomposed subproblems (`2^P`).
    pub(crate) subproblem_count: u64,
    /// The objective frontier (meaningful only for optimization problems).
    pub(crate) bound: SharedBound,
    /// Cooperative cancellation; raised on timeout or an exhausted budget.
    pub(crate) stop: AtomicBool,
    /// Global solution count backing `stop_after_n_solutions`.
    pub(crate) solutions_found: AtomicU64,
    /// Global node count backing `stop_after_n_nodes`.
    pub(crate) nodes_visited: AtomicU64,
}

impl SharedSearchState {
    pub(crate) fn new(subproblem_count: u64, bound: SharedBound) -> SharedSearchState {
        SharedSearchState {
            next_subproblem: AtomicU64::new(0),
            subproblem_count,
            bound,
            stop: AtomicBool::new(false),
            solutions_found: AtomicU64::new(0),
            nodes_visited: AtomicU64::new(0),
        }
    }
}
