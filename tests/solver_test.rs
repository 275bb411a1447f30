//! End-to-end tests of the public API.

use std::sync::Mutex;

use tempest_solver::Comparison;
use tempest_solver::Conclusion;
use tempest_solver::ModelBuilder;
use tempest_solver::Solver;
use tempest_solver::SolverOptions;
use tempest_solver::TemporalConstraint;

fn options(or_nodes: usize) -> SolverOptions {
    SolverOptions {
        or_nodes,
        ..SolverOptions::default()
    }
}

#[test]
fn trivial_satisfaction_finds_all_solutions() {
    let mut builder = ModelBuilder::new();
    let x = builder.add_variable("x", 0, 2).unwrap();
    let y = builder.add_variable("y", 0, 2).unwrap();
    builder
        .add_temporal_constraint("x", 1, Comparison::LessOrEqual, "y")
        .unwrap();
    let problem = builder.build();

    let found = Mutex::new(Vec::new());
    let outcome = Solver::default().solve_with_callback(&problem, |solution| {
        found
            .lock()
            .unwrap()
            .push((solution.value(x), solution.value(y)));
    });

    assert_eq!(outcome.solution_count(), 3);
    assert!(outcome.is_exhaustive());
    assert_eq!(outcome.conclusion(), Conclusion::Satisfiable);

    let mut found = found.into_inner().unwrap();
    found.sort_unstable();
    assert_eq!(found, vec![(0, 1), (0, 2), (1, 2)]);
}

#[test]
fn root_contradiction_is_detected_without_branching() {
    let mut builder = ModelBuilder::new();
    let _x = builder.add_variable("x", 5, 10).unwrap();
    builder.add_linear_constraint(&["x"], &[1], 4).unwrap();
    let problem = builder.build();

    let outcome = Solver::default().solve(&problem);

    assert_eq!(outcome.conclusion(), Conclusion::Unsatisfiable);
    assert_eq!(outcome.solution_count(), 0);
    assert!(outcome.is_exhaustive());
    assert_eq!(outcome.statistics().nodes, 1);
    assert_eq!(outcome.statistics().fails, 1);
    assert!(outcome.best_solution().is_none());
}

#[test]
fn minimization_proves_the_optimum() {
    let mut builder = ModelBuilder::new();
    let x = builder.add_variable("x", 0, 10).unwrap();
    let y = builder.add_variable("y", 0, 10).unwrap();
    builder
        .add_temporal_constraint("x", 1, Comparison::LessOrEqual, "y")
        .unwrap();
    builder.minimise("y").unwrap();
    let problem = builder.build();

    let outcome = Solver::default().solve(&problem);

    assert_eq!(outcome.conclusion(), Conclusion::Optimal);
    assert_eq!(outcome.best_objective(), Some(1));
    let best = outcome.best_solution().expect("an optimum exists");
    assert_eq!(best.value(y), 1);
    assert_eq!(best.value(x), 0);
}

#[test]
fn reified_guard_agrees_with_the_conjunction_on_every_assignment() {
    // b <=> (x <= y - 1 /\ y <= x + 3) over x, y in [0, 5]
    let mut builder = ModelBuilder::new();
    let b = builder.add_variable("b", 0, 1).unwrap();
    let x = builder.add_variable("x", 0, 5).unwrap();
    let y = builder.add_variable("y", 0, 5).unwrap();
    builder
        .add_reified_constraint(
            "b",
            TemporalConstraint::new("x", 1, Comparison::LessOrEqual, "y"),
            TemporalConstraint::new("y", -3, Comparison::LessOrEqual, "x"),
        )
        .unwrap();
    let problem = builder.build();

    let found = Mutex::new(Vec::new());
    let outcome = Solver::default().solve_with_callback(&problem, |solution| {
        found.lock().unwrap().push((
            solution.value(b),
            solution.value(x),
            solution.value(y),
        ));
    });

    // every (x, y) pair admits exactly one value of b
    assert_eq!(outcome.solution_count(), 36);
    assert!(outcome.is_exhaustive());

    let found = found.into_inner().unwrap();
    assert_eq!(found.len(), 36);
    for (b, x, y) in found {
        let guard_holds = x + 1 <= y && y <= x + 3;
        assert_eq!(
            b == 1,
            guard_holds,
            "b = {b} disagrees with the guard at x = {x}, y = {y}"
        );
    }
}

#[test]
fn forced_reification_values_are_propagated() {
    // assigning x = 2, y = 4 forces b = 1; x = 3, y = 3 forces b = 0
    for (x_value, y_value, expected_b) in [(2, 4, 1), (3, 3, 0)] {
        let mut builder = ModelBuilder::new();
        let b = builder.add_variable("b", 0, 1).unwrap();
        let _x = builder.add_variable("x", x_value, x_value).unwrap();
        let _y = builder.add_variable("y", y_value, y_value).unwrap();
        builder
            .add_reified_constraint(
                "b",
                TemporalConstraint::new("x", 1, Comparison::LessOrEqual, "y"),
                TemporalConstraint::new("y", -3, Comparison::LessOrEqual, "x"),
            )
            .unwrap();
        let problem = builder.build();

        let outcome = Solver::default().solve(&problem);

        assert_eq!(outcome.solution_count(), 1);
        let solution = outcome.best_solution().unwrap();
        assert_eq!(solution.value(b), expected_b);
    }
}

#[test]
fn worker_count_does_not_change_the_result() {
    let mut reference = None;
    for or_nodes in [1, 4, 16] {
        let mut builder = ModelBuilder::new();
        let _x = builder.add_variable("x", 0, 2).unwrap();
        let _y = builder.add_variable("y", 0, 2).unwrap();
        builder
            .add_temporal_constraint("x", 1, Comparison::LessOrEqual, "y")
            .unwrap();
        let problem = builder.build();

        let outcome = Solver::with_options(options(or_nodes)).solve(&problem);

        assert_eq!(outcome.solution_count(), 3, "or_nodes = {or_nodes}");
        assert!(outcome.is_exhaustive());

        match &reference {
            None => reference = Some(*outcome.statistics()),
            Some(expected) => {
                assert_eq!(outcome.statistics(), expected, "or_nodes = {or_nodes}")
            }
        }
    }
}

#[test]
fn published_bounds_decrease_strictly() {
    // minimizing y under x + y >= 10 improves once per increment of x, so a
    // sequential run publishes a whole chain of bounds
    let mut builder = ModelBuilder::new();
    let _x = builder.add_variable("x", 0, 20).unwrap();
    let y = builder.add_variable("y", 0, 20).unwrap();
    builder
        .add_linear_constraint(&["x", "y"], &[-1, -1], -10)
        .unwrap();
    builder.minimise("y").unwrap();
    let problem = builder.build();

    let published = Mutex::new(Vec::new());
    let solver = Solver::with_options(SolverOptions {
        print_intermediate_solutions: true,
        ..SolverOptions::default()
    });
    let outcome = solver.solve_with_callback(&problem, |solution| {
        published.lock().unwrap().push(solution.value(y));
    });

    let published = published.into_inner().unwrap();
    assert!(published.len() >= 2);
    assert!(
        published.windows(2).all(|pair| pair[1] < pair[0]),
        "published objective values must decrease strictly: {published:?}"
    );
    assert_eq!(*published.last().unwrap(), 0);
    assert_eq!(outcome.best_objective(), Some(0));
}

#[test]
fn optimization_in_parallel_agrees_with_sequential() {
    for or_nodes in [1, 4] {
        let mut builder = ModelBuilder::new();
        let _x = builder.add_variable("x", 0, 30).unwrap();
        let _y = builder.add_variable("y", 0, 30).unwrap();
        let z = builder.add_variable("z", 0, 60).unwrap();
        builder
            .add_temporal_constraint("x", 2, Comparison::LessOrEqual, "y")
            .unwrap();
        builder
            .add_temporal_constraint("y", 3, Comparison::LessOrEqual, "z")
            .unwrap();
        builder.minimise("z").unwrap();
        let problem = builder.build();

        let outcome = Solver::with_options(options(or_nodes)).solve(&problem);

        assert_eq!(outcome.conclusion(), Conclusion::Optimal, "or_nodes = {or_nodes}");
        assert_eq!(outcome.best_objective(), Some(5));
        assert_eq!(outcome.best_solution().unwrap().value(z), 5);
    }
}

#[test]
fn solution_budget_cuts_the_search_short() {
    let mut builder = ModelBuilder::new();
    let _x = builder.add_variable("x", 0, 9).unwrap();
    let _y = builder.add_variable("y", 0, 9).unwrap();
    builder
        .add_temporal_constraint("x", 1, Comparison::LessOrEqual, "y")
        .unwrap();
    let problem = builder.build();

    let solver = Solver::with_options(SolverOptions {
        stop_after_n_solutions: 2,
        ..SolverOptions::default()
    });
    let outcome = solver.solve(&problem);

    assert_eq!(outcome.solution_count(), 2);
    assert!(!outcome.is_exhaustive());
    assert_eq!(outcome.conclusion(), Conclusion::Satisfiable);
}

#[test]
fn node_budget_cuts_the_search_short() {
    let mut builder = ModelBuilder::new();
    let _x = builder.add_variable("x", 0, 1000).unwrap();
    let _y = builder.add_variable("y", 0, 1000).unwrap();
    builder
        .add_temporal_constraint("x", 1, Comparison::LessOrEqual, "y")
        .unwrap();
    let problem = builder.build();

    let solver = Solver::with_options(SolverOptions {
        stop_after_n_nodes: 10,
        ..SolverOptions::default()
    });
    let outcome = solver.solve(&problem);

    assert!(!outcome.is_exhaustive());
}

#[test]
fn timeout_reports_a_non_exhaustive_run() {
    let mut builder = ModelBuilder::new();
    let _x = builder.add_variable("x", 0, 1_000_000).unwrap();
    let _y = builder.add_variable("y", 0, 1_000_000).unwrap();
    builder
        .add_temporal_constraint("x", 1, Comparison::LessOrEqual, "y")
        .unwrap();
    let problem = builder.build();

    let solver = Solver::with_options(SolverOptions {
        timeout_ms: 5,
        ..SolverOptions::default()
    });
    let outcome = solver.solve(&problem);

    assert!(!outcome.is_exhaustive());
}

#[test]
fn free_search_reaches_the_same_solutions() {
    let mut builder = ModelBuilder::new();
    let _x = builder.add_variable("x", 0, 2).unwrap();
    let _y = builder.add_variable("y", 0, 2).unwrap();
    builder
        .add_temporal_constraint("x", 1, Comparison::LessOrEqual, "y")
        .unwrap();
    let problem = builder.build();

    let solver = Solver::with_options(SolverOptions {
        free_search: true,
        ..SolverOptions::default()
    });
    let outcome = solver.solve(&problem);

    assert_eq!(outcome.solution_count(), 3);
    assert!(outcome.is_exhaustive());
}

#[test]
fn propagation_helpers_reach_the_same_solutions() {
    let mut builder = ModelBuilder::new();
    let _x = builder.add_variable("x", 0, 2).unwrap();
    let _y = builder.add_variable("y", 0, 2).unwrap();
    builder
        .add_temporal_constraint("x", 1, Comparison::LessOrEqual, "y")
        .unwrap();
    let problem = builder.build();

    let solver = Solver::with_options(SolverOptions {
        or_nodes: 2,
        and_nodes: 2,
        ..SolverOptions::default()
    });
    let outcome = solver.solve(&problem);

    assert_eq!(outcome.solution_count(), 3);
    assert!(outcome.is_exhaustive());
}

#[test]
fn equality_constraints_pair_the_variables() {
    let mut builder = ModelBuilder::new();
    let x = builder.add_variable("x", 0, 3).unwrap();
    let y = builder.add_variable("y", 0, 3).unwrap();
    builder
        .add_temporal_constraint("x", 0, Comparison::Equal, "y")
        .unwrap();
    let problem = builder.build();

    let found = Mutex::new(Vec::new());
    let outcome = Solver::default().solve_with_callback(&problem, |solution| {
        found
            .lock()
            .unwrap()
            .push((solution.value(x), solution.value(y)));
    });

    assert_eq!(outcome.solution_count(), 4);
    for (x, y) in found.into_inner().unwrap() {
        assert_eq!(x, y);
    }
}

#[test]
fn strict_and_reversed_operators_are_normalized() {
    // x < y and y > x + 1 over [0, 3]^2: y >= x + 2
    let mut builder = ModelBuilder::new();
    let x = builder.add_variable("x", 0, 3).unwrap();
    let y = builder.add_variable("y", 0, 3).unwrap();
    builder
        .add_temporal_constraint("x", 0, Comparison::Less, "y")
        .unwrap();
    builder
        .add_temporal_constraint("y", -1, Comparison::Greater, "x")
        .unwrap();
    let problem = builder.build();

    let found = Mutex::new(Vec::new());
    let outcome = Solver::default().solve_with_callback(&problem, |solution| {
        found
            .lock()
            .unwrap()
            .push((solution.value(x), solution.value(y)));
    });

    // y - 1 > x means y >= x + 2: (0,2),(0,3),(1,3)
    assert_eq!(outcome.solution_count(), 3);
    let mut found = found.into_inner().unwrap();
    found.sort_unstable();
    assert_eq!(found, vec![(0, 2), (0, 3), (1, 3)]);
}

#[test]
fn linear_combination_restricts_the_solutions() {
    // 2x + 3y <= 6 over x, y in [0, 3]
    let mut builder = ModelBuilder::new();
    let x = builder.add_variable("x", 0, 3).unwrap();
    let y = builder.add_variable("y", 0, 3).unwrap();
    builder
        .add_linear_constraint(&["x", "y"], &[2, 3], 6)
        .unwrap();
    let problem = builder.build();

    let found = Mutex::new(Vec::new());
    let outcome = Solver::default().solve_with_callback(&problem, |solution| {
        found
            .lock()
            .unwrap()
            .push((solution.value(x), solution.value(y)));
    });

    let expected: Vec<(i32, i32)> = (0..=3)
        .flat_map(|x| (0..=3).map(move |y| (x, y)))
        .filter(|(x, y)| 2 * x + 3 * y <= 6)
        .collect();
    let mut found = found.into_inner().unwrap();
    found.sort_unstable();
    assert_eq!(outcome.solution_count(), expected.len() as u64);
    assert_eq!(found, expected);
}
