//! # Tempest
//! Tempest is a parallel branch-and-bound constraint solver over integer
//! interval domains. Problems are stated over named integer variables with
//! bounded domains and three constraint families: domain restrictions,
//! temporal (difference) inequalities `x + k <= y`, and linear inequalities
//! `sum c_i * x_i <= c`, plus a reification form `b <=> (t1 /\ t2)` over two
//! temporal conjuncts.
//!
//! The solver enumerates all solutions, a bounded number of them, or, when
//! an objective is given, proves a minimum. Search is parallelized in two
//! tiers: the root search space is decomposed into `2^P` deterministic
//! subproblems distributed over independent workers which share only a
//! best-bound cell, and each worker may additionally parallelize its
//! propagation sweeps.
//!
//! # Solving a problem
//! Variables and constraints are posted through the [`ModelBuilder`]:
//! ```rust
//! use tempest_solver::Comparison;
//! use tempest_solver::Conclusion;
//! use tempest_solver::ModelBuilder;
//! use tempest_solver::Solver;
//!
//! let mut builder = ModelBuilder::new();
//! let _x = builder.add_variable("x", 0, 2).unwrap();
//! let _y = builder.add_variable("y", 0, 2).unwrap();
//! // x + 1 <= y
//! builder
//!     .add_temporal_constraint("x", 1, Comparison::LessOrEqual, "y")
//!     .unwrap();
//! let problem = builder.build();
//!
//! let solver = Solver::default();
//! let outcome = solver.solve(&problem);
//!
//! assert_eq!(outcome.conclusion(), Conclusion::Satisfiable);
//! assert_eq!(outcome.solution_count(), 3);
//! assert!(outcome.is_exhaustive());
//! ```
//!
//! # Optimization
//! With an objective, the run returns a provably optimal solution:
//! ```rust
//! use tempest_solver::Comparison;
//! use tempest_solver::ModelBuilder;
//! use tempest_solver::Solver;
//! use tempest_solver::SolverOptions;
//!
//! let mut builder = ModelBuilder::new();
//! let _x = builder.add_variable("x", 0, 10).unwrap();
//! let y = builder.add_variable("y", 0, 10).unwrap();
//! builder
//!     .add_temporal_constraint("x", 1, Comparison::LessOrEqual, "y")
//!     .unwrap();
//! builder.minimise("y").unwrap();
//! let problem = builder.build();
//!
//! let solver = Solver::with_options(SolverOptions {
//!     or_nodes: 2,
//!     ..SolverOptions::default()
//! });
//! let outcome = solver.solve(&problem);
//!
//! assert_eq!(outcome.best_objective(), Some(1));
//! assert_eq!(outcome.best_solution().unwrap().value(y), 1);
//! ```
//!
//! ## Feature flags
//! - `debug-checks`: enable expensive internal consistency assertions. Off
//!   by default.

pub mod asserts;
pub mod statistics;
pub mod variables;

pub(crate) mod api;
pub(crate) mod basic_types;
pub(crate) mod engine;
pub(crate) mod math;
pub(crate) mod propagators;
pub(crate) mod search;

pub use api::builder::ModelBuilder;
pub use api::builder::Problem;
pub use api::builder::TemporalConstraint;
pub use api::outputs::Conclusion;
pub use api::outputs::SolveOutcome;
pub use api::solver::Solver;
pub use api::solver::SolverOptions;
pub use basic_types::Comparison;
pub use basic_types::Interval;
pub use basic_types::ModelError;
pub use basic_types::Solution;
pub use engine::DomainStore;
pub use engine::SolverStatistics;
