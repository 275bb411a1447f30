use std::panic;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use log::debug;

use crate::api::builder::Problem;
use crate::api::outputs::SolveOutcome;
use crate::basic_types::Interval;
use crate::basic_types::Solution;
use crate::engine::best_bound::SharedBound;
use crate::engine::fixpoint::propagate_to_fixpoint;
use crate::engine::SolverStatistics;
use crate::search::branching::VariableSelection;
use crate::search::tree::SearchContext;
use crate::search::tree::Worker;
use crate::search::tree::WorkerOutcome;
use crate::search::SharedSearchState;
use crate::statistics::log_statistic_postfix;
use crate::statistics::should_log_statistics;
use crate::statistics::LogStatistics;
use crate::statistics::StatisticLogger;
use crate::variables::View;

/// Configuration of a [`Solver`] run.
#[derive(Clone, Debug)]
pub struct SolverOptions {
    /// Number of independent search workers (Or-parallelism).
    pub or_nodes: usize,
    /// Propagation helpers within each worker (And-parallelism); 1 disables
    /// intra-worker parallelism.
    pub and_nodes: usize,
    /// The root search space is decomposed into `2^subproblems_power`
    /// subproblems; clamped to the number of branching variables.
    pub subproblems_power: u32,
    /// Stop after this many solutions of a satisfaction problem; 0 finds all.
    pub stop_after_n_solutions: u64,
    /// Stop after visiting this many search nodes.
    pub stop_after_n_nodes: u64,
    /// Wall-clock budget in milliseconds; 0 disables the timeout.
    pub timeout_ms: u64,
    /// Ignore the fixed branching order and reselect by smallest domain.
    pub free_search: bool,
    /// Emit every improving solution of an optimization problem through the
    /// solution callback, rather than only the final best.
    pub print_intermediate_solutions: bool,
}

impl Default for SolverOptions {
    fn default() -> SolverOptions {
        SolverOptions {
            or_nodes: 1,
            and_nodes: 1,
            subproblems_power: 12,
            stop_after_n_solutions: 0,
            stop_after_n_nodes: u64::MAX,
            timeout_ms: 0,
            free_search: false,
            print_intermediate_solutions: false,
        }
    }
}

/// The parallel branch-and-bound driver.
///
/// A run clones the root store per worker; workers draw decomposed
/// subproblems from a shared counter and prune against a shared best-bound
/// cell. The solver itself performs no I/O: results come back as a
/// [`SolveOutcome`] and solutions are handed to the callback of
/// [`Solver::solve_with_callback`].
#[derive(Debug, Default)]
pub struct Solver {
    options: SolverOptions,
}

impl Solver {
    pub fn with_options(options: SolverOptions) -> Solver {
        Solver { options }
    }

    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    pub fn solve(&self, problem: &Problem) -> SolveOutcome {
        self.solve_with_callback(problem, |_solution: &Solution| {})
    }

    /// Solve `problem`, invoking `on_solution` as solutions are found.
    ///
    /// For satisfaction problems the callback fires for every solution. For
    /// optimization problems it fires for every improving solution when
    /// [`SolverOptions::print_intermediate_solutions`] is set, and otherwise
    /// once with the final best solution. The callback may be invoked from
    /// worker threads.
    pub fn solve_with_callback<Callback>(
        &self,
        problem: &Problem,
        on_solution: Callback,
    ) -> SolveOutcome
    where
        Callback: Fn(&Solution) + Sync,
    {
        let deadline = (self.options.timeout_ms > 0)
            .then(|| Instant::now() + Duration::from_millis(self.options.timeout_ms));

        let mut statistics = SolverStatistics {
            nodes: 1,
            ..SolverStatistics::default()
        };

        // The root fixpoint runs once, up front: a contradiction here is
        // reported without any decomposition or branching, and the narrowed
        // root tightens the initial best-bound interval.
        let root = problem.store.clone();
        let root_stop = AtomicBool::new(false);
        propagate_to_fixpoint(
            &root,
            &problem.propagators,
            1,
            &root_stop,
            &mut statistics,
        );
        if root.is_top() {
            debug!("contradiction at the root, the problem is unsatisfiable");
            statistics.fails = 1;
            return self.finish(statistics, None);
        }

        let power = self
            .options
            .subproblems_power
            .min(problem.branching.len() as u32)
            .min(62);
        let subproblem_count = 1u64 << power;
        let worker_count = self.options.or_nodes.max(1);
        debug!(
            "decomposing into {subproblem_count} subproblems for {worker_count} worker(s)"
        );

        let objective_domain = problem
            .objective
            .map(|objective| root.interval(View::positive(objective)))
            .unwrap_or(Interval::FULL);
        let shared = SharedSearchState::new(subproblem_count, SharedBound::new(objective_domain));
        // the root fixpoint counts toward the node budget
        shared.nodes_visited.store(1, Ordering::Relaxed);

        let context = SearchContext {
            root: &root,
            propagators: &problem.propagators,
            branching: &problem.branching,
            objective: problem.objective,
            selection: if self.options.free_search {
                VariableSelection::SmallestDomain
            } else {
                VariableSelection::InputOrder
            },
            helpers: self.options.and_nodes.max(1),
            prefix_length: power as usize,
            node_budget: self.options.stop_after_n_nodes,
            solution_budget: self.options.stop_after_n_solutions,
            deadline,
            shared: &shared,
            on_solution: &on_solution,
            emit_intermediate: self.options.print_intermediate_solutions,
        };

        let outcomes: Vec<WorkerOutcome> = if worker_count == 1 {
            vec![Worker::new(context).run()]
        } else {
            thread::scope(|scope| {
                let handles: Vec<_> = (0..worker_count)
                    .map(|_| scope.spawn(move || Worker::new(context).run()))
                    .collect();
                handles
                    .into_iter()
                    .map(|handle| {
                        handle
                            .join()
                            .unwrap_or_else(|payload| panic::resume_unwind(payload))
                    })
                    .collect()
            })
        };

        let best_solution = select_best_solution(problem, &outcomes);
        for outcome in &outcomes {
            statistics.join(&outcome.statistics);
        }
        if problem.objective.is_some() {
            debug!("best-bound cell settled at {}", shared.bound.interval());
        }

        if problem.objective.is_some() && !self.options.print_intermediate_solutions {
            if let Some(solution) = &best_solution {
                on_solution(solution);
            }
        }

        self.finish(statistics, best_solution)
    }

    fn finish(
        &self,
        statistics: SolverStatistics,
        best_solution: Option<Solution>,
    ) -> SolveOutcome {
        if should_log_statistics() {
            statistics.log_statistics(&StatisticLogger::default());
            log_statistic_postfix();
        }
        let outcome = SolveOutcome::new(
            statistics.exhaustive,
            statistics.solutions,
            best_solution,
            statistics.best_bound,
            statistics,
        );
        debug!("search finished: {:?}", outcome.conclusion());
        outcome
    }
}

/// For an optimization problem, the solution of the worker that proved the
/// global minimum; otherwise any worker's incumbent.
fn select_best_solution(problem: &Problem, outcomes: &[WorkerOutcome]) -> Option<Solution> {
    if problem.objective.is_some() {
        let mut best: Option<(i32, &Solution)> = None;
        for outcome in outcomes {
            if let (Some(value), Some(solution)) =
                (outcome.statistics.best_bound, outcome.incumbent.as_ref())
            {
                if best.map_or(true, |(current, _)| value < current) {
                    best = Some((value, solution));
                }
            }
        }
        best.map(|(_, solution)| solution.clone())
    } else {
        outcomes
            .iter()
            .find_map(|outcome| outcome.incumbent.clone())
    }
}
