//! Depth-first, left-first branch-and-bound over one decomposed subproblem
//! at a time.
//!
//! A worker owns its store, its stack, and its statistics; the only shared
//! state it touches is [`SharedSearchState`]. Whenever idle it draws the next
//! decomposition index from the shared counter, applies the corresponding
//! prefix of branching decisions to a fresh copy of the root store, and
//! explores that subtree to completion.

use std::sync::atomic::Ordering;
use std::time::Instant;

use log::debug;

use crate::basic_types::Interval;
use crate::basic_types::Solution;
use crate::engine::fixpoint::propagate_to_fixpoint;
use crate::engine::DomainStore;
use crate::engine::SolverStatistics;
use crate::propagators::PropagatorStore;
use crate::search::branching::VariableSelection;
use crate::search::SharedSearchState;
use crate::tempest_assert_moderate;
use crate::variables::VariableId;

/// Everything a worker needs to know about the problem and the run; shared
/// read-only between all workers.
#[derive(Clone, Copy)]
pub(crate) struct SearchContext<'a> {
    pub(crate) root: &'a DomainStore,
    pub(crate) propagators: &'a PropagatorStore,
    pub(crate) branching: &'a [VariableId],
    pub(crate) objective: Option<VariableId>,
    pub(crate) selection: VariableSelection,
    /// Propagation helpers per worker (And-parallelism); 1 means sequential.
    pub(crate) helpers: usize,
    /// Number of leading branching variables consumed by the decomposition.
    pub(crate) prefix_length: usize,
    /// Global node budget (`u64::MAX` when unlimited).
    pub(crate) node_budget: u64,
    /// Global solution budget for satisfaction problems (0 means all).
    pub(crate) solution_budget: u64,
    pub(crate) deadline: Option<Instant>,
    pub(crate) shared: &'a SharedSearchState,
    pub(crate) on_solution: &'a (dyn Fn(&Solution) + Sync),
    /// Whether improving solutions of an optimization problem are emitted as
    /// they are found.
    pub(crate) emit_intermediate: bool,
}

/// A suspended right branch: the snapshot to restore plus the half-domain
/// that has not been explored yet.
struct SearchNode {
    snapshot: DomainStore,
    variable: VariableId,
    right: Interval,
    cursor: usize,
    depth: u64,
}

pub(crate) struct Worker<'a> {
    context: SearchContext<'a>,
    current: DomainStore,
    stack: Vec<SearchNode>,
    cursor: usize,
    depth: u64,
    incumbent: Option<Solution>,
    statistics: SolverStatistics,
}

pub(crate) struct WorkerOutcome {
    pub(crate) statistics: SolverStatistics,
    pub(crate) incumbent: Option<Solution>,
}

impl<'a> Worker<'a> {
    pub(crate) fn new(context: SearchContext<'a>) -> Worker<'a> {
        Worker {
            current: context.root.clone(),
            context,
            stack: Vec::new(),
            cursor: 0,
            depth: 0,
            incumbent: None,
            statistics: SolverStatistics::default(),
        }
    }

    /// Draw subproblems until the dispenser runs dry or the run is stopped.
    pub(crate) fn run(mut self) -> WorkerOutcome {
        let shared = self.context.shared;
        loop {
            if shared.stop.load(Ordering::Relaxed) {
                self.statistics.exhaustive = false;
                break;
            }
            let index = shared.next_subproblem.fetch_add(1, Ordering::Relaxed);
            if index >= shared.subproblem_count {
                break;
            }
            if self.explore(index) {
                self.statistics.subproblems_solved += 1;
            }
        }
        WorkerOutcome {
            statistics: self.statistics,
            incumbent: self.incumbent,
        }
    }

    /// Exhaust the subtree of one decomposition index. Returns whether the
    /// subtree was explored to completion.
    fn explore(&mut self, index: u64) -> bool {
        let context = self.context;
        let shared = context.shared;

        self.current.reset(context.root);
        self.stack.clear();
        self.cursor = 0;
        self.depth = context.prefix_length as u64;
        self.apply_prefix(index);

        loop {
            if shared.stop.load(Ordering::Relaxed) {
                self.statistics.exhaustive = false;
                return false;
            }
            if let Some(deadline) = context.deadline {
                if Instant::now() >= deadline {
                    debug!("timeout reached, stopping all workers");
                    shared.stop.store(true, Ordering::Relaxed);
                    self.statistics.exhaustive = false;
                    return false;
                }
            }

            self.statistics.nodes += 1;
            self.statistics.depth_max = self.statistics.depth_max.max(self.depth);
            let visited = shared.nodes_visited.fetch_add(1, Ordering::Relaxed) + 1;
            if visited > context.node_budget {
                debug!("node budget exhausted after {visited} nodes");
                shared.stop.store(true, Ordering::Relaxed);
                self.statistics.exhaustive = false;
                return false;
            }

            if let Some(objective) = context.objective {
                let _ = self
                    .current
                    .tighten_upper_bound(objective.into(), shared.bound.upper_bound());
            }

            propagate_to_fixpoint(
                &self.current,
                context.propagators,
                context.helpers,
                &shared.stop,
                &mut self.statistics,
            );

            if self.current.is_top() {
                self.statistics.fails += 1;
                if !self.backtrack() {
                    return true;
                }
                continue;
            }

            let selected =
                context
                    .selection
                    .select(&self.current, context.branching, self.cursor);
            let Some((cursor, variable)) = selected else {
                // every branching variable is assigned: a solution
                if !self.record_solution() {
                    return false;
                }
                if !self.backtrack() {
                    return true;
                }
                continue;
            };

            self.cursor = cursor;
            let domain = self.current.interval(variable.into());
            let mid = split_point(domain);
            self.stack.push(SearchNode {
                snapshot: self.current.clone(),
                variable,
                right: Interval::new(mid, domain.ub()),
                cursor,
                depth: self.depth,
            });
            let _ = self.current.tighten_upper_bound(variable.into(), mid - 1);
            self.depth += 1;
        }
    }

    /// Handle a leaf in which all branching variables are assigned. Returns
    /// `false` when the solution budget stops the run.
    fn record_solution(&mut self) -> bool {
        let context = self.context;
        let shared = context.shared;
        self.statistics.solutions += 1;

        if let Some(objective) = context.objective {
            let value = self.current.upper_bound(objective.into());
            if shared.bound.publish(value) {
                let solution = Solution::from_store(&self.current);
                self.statistics.best_bound = Some(value);
                if context.emit_intermediate {
                    (context.on_solution)(&solution);
                }
                self.incumbent = Some(solution);
            }
            // keep searching for strictly better solutions
            true
        } else {
            let solution = Solution::from_store(&self.current);
            (context.on_solution)(&solution);
            self.incumbent = Some(solution);

            let found = shared.solutions_found.fetch_add(1, Ordering::Relaxed) + 1;
            if context.solution_budget != 0 && found >= context.solution_budget {
                debug!("solution budget reached after {found} solutions");
                shared.stop.store(true, Ordering::Relaxed);
                self.statistics.exhaustive = false;
                return false;
            }
            true
        }
    }

    /// Apply the decomposition prefix: bit `k` of `index` picks the left or
    /// right half of the `k`-th branching variable, before any propagation.
    fn apply_prefix(&mut self, index: u64) {
        for decision in 0..self.context.prefix_length {
            if self.current.is_top() {
                break;
            }
            let variable = self.context.branching[decision];
            let domain = self.current.interval(variable.into());
            let take_left = (index >> decision) & 1 == 0;

            if domain.is_assigned() {
                // the left half of a singleton is empty; the right half is
                // the singleton itself
                if take_left {
                    let _ = self
                        .current
                        .tighten(variable.into(), Interval::new(i32::MAX, i32::MIN));
                }
                continue;
            }

            let mid = split_point(domain);
            if take_left {
                let _ = self.current.tighten_upper_bound(variable.into(), mid - 1);
            } else {
                let _ = self.current.tighten_lower_bound(variable.into(), mid);
            }
        }
    }

    /// Restore the deepest suspended node and enter its right branch.
    /// Returns `false` when the stack is empty and the subtree is done.
    fn backtrack(&mut self) -> bool {
        let Some(node) = self.stack.pop() else {
            return false;
        };
        self.current.reset(&node.snapshot);
        let _ = self.current.tighten(node.variable.into(), node.right);
        self.cursor = node.cursor;
        self.depth = node.depth + 1;
        true
    }
}

/// The first value of the right half when bisecting `domain`.
fn split_point(domain: Interval) -> i32 {
    tempest_assert_moderate!(
        domain.width() >= 1,
        "only domains with at least two values are split"
    );
    (domain.lb() as i64 + (domain.width() + 1) / 2) as i32
}
