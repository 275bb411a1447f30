use std::collections::HashMap;

use crate::basic_types::Comparison;
use crate::basic_types::Interval;
use crate::basic_types::ModelError;
use crate::engine::DomainStore;
use crate::math::num_ext::NumExt;
use crate::propagators::ConjunctionPropagator;
use crate::propagators::LinearInequalityPropagator;
use crate::propagators::Propagator;
use crate::propagators::PropagatorStore;
use crate::propagators::ReifiedPropagator;
use crate::propagators::TemporalPropagator;
use crate::variables::VariableId;
use crate::variables::View;

/// A temporal constraint `x + k <op> y`, used as a conjunct of a reified
/// constraint.
#[derive(Clone, Copy, Debug)]
pub struct TemporalConstraint<'a> {
    pub x: &'a str,
    pub k: i32,
    pub comparison: Comparison,
    pub y: &'a str,
}

impl<'a> TemporalConstraint<'a> {
    pub fn new(x: &'a str, k: i32, comparison: Comparison, y: &'a str) -> TemporalConstraint<'a> {
        TemporalConstraint {
            x,
            k,
            comparison,
            y,
        }
    }
}

/// Constructs a [`Problem`] from named variables and constraints.
///
/// Operators are normalized at build time: strict inequalities are absorbed
/// into the constant (`k ± 1`), `=` on a temporal constraint expands into the
/// conjunction of `<=` and `>=`, and `>=` is encoded by negating both
/// operands. `!=` and `in` have no bounds-consistent propagator in the
/// solver's closed set and are rejected.
///
/// A contradiction that is already decidable while building (e.g. the
/// constant constraint `0 <= -1`) is not an error: the builder materializes
/// it as an extra variable with an empty domain, so the root store uniformly
/// reports unsatisfiability.
#[derive(Debug, Default)]
pub struct ModelBuilder {
    /// Initial domains, dense in registration order; a variable's id is its
    /// position in this vector.
    domains: Vec<Interval>,
    /// User-supplied names, in lockstep with `domains`. Internal variables
    /// (the root-contradiction sentinel) have a name here but no entry in
    /// `index`, so they can never collide with or be referenced by a model.
    names: Vec<String>,
    /// Reverse lookup used to resolve constraint operands and to reject
    /// duplicate registrations.
    index: HashMap<String, VariableId>,
    propagators: PropagatorStore,
    objective: Option<VariableId>,
    root_conflict: bool,
}

impl ModelBuilder {
    pub fn new() -> ModelBuilder {
        ModelBuilder::default()
    }

    /// Register a variable with the initial domain `[lb, ub]`.
    pub fn add_variable(
        &mut self,
        name: &str,
        lb: i32,
        ub: i32,
    ) -> Result<VariableId, ModelError> {
        if self.index.contains_key(name) {
            return Err(ModelError::DuplicateVariable(name.to_owned()));
        }
        let variable = VariableId::from_index(self.domains.len());
        self.domains.push(Interval::new(lb, ub));
        self.names.push(name.to_owned());
        let _ = self.index.insert(name.to_owned(), variable);
        Ok(variable)
    }

    /// Restrict the domain of `name` with `name <op> k`.
    pub fn strengthen_domain(
        &mut self,
        name: &str,
        comparison: Comparison,
        k: i32,
    ) -> Result<(), ModelError> {
        let variable = self.resolve(name)?;
        let restriction = match comparison {
            Comparison::LessOrEqual => Interval::new(i32::MIN, k),
            Comparison::Less => Interval::new(i32::MIN, k.saturating_sub(1)),
            Comparison::GreaterOrEqual => Interval::new(k, i32::MAX),
            Comparison::Greater => Interval::new(k.saturating_add(1), i32::MAX),
            Comparison::Equal => Interval::singleton(k),
            Comparison::NotEqual | Comparison::In => {
                return Err(ModelError::UnsupportedOperator(comparison));
            }
        };
        self.restrict(variable, restriction);
        Ok(())
    }

    /// Restrict the domain of `name` with the scaled form `a * name <= b`.
    ///
    /// With `a = 0` the constraint is decided outright: a tautology when
    /// `b >= 0`, a root contradiction otherwise.
    pub fn strengthen_domain_scaled(
        &mut self,
        name: &str,
        a: i32,
        b: i32,
    ) -> Result<(), ModelError> {
        let variable = self.resolve(name)?;
        if a == 0 {
            if b < 0 {
                self.flag_root_conflict();
            }
            return Ok(());
        }
        let restriction = if a > 0 {
            Interval::new(i32::MIN, <i32 as NumExt>::div_floor(b, a))
        } else {
            Interval::new(<i32 as NumExt>::div_ceil(b, a), i32::MAX)
        };
        self.restrict(variable, restriction);
        Ok(())
    }

    /// Post the temporal constraint `x + k <op> y`.
    pub fn add_temporal_constraint(
        &mut self,
        x: &str,
        k: i32,
        comparison: Comparison,
        y: &str,
    ) -> Result<(), ModelError> {
        let propagator = self.temporal_propagator(x, k, comparison, y)?;
        let _ = self.propagators.alloc(propagator);
        Ok(())
    }

    /// Post the linear constraint `sum coefficients[i] * variables[i] <= c`.
    pub fn add_linear_constraint(
        &mut self,
        variables: &[&str],
        coefficients: &[i32],
        c: i32,
    ) -> Result<(), ModelError> {
        if variables.len() != coefficients.len() {
            return Err(ModelError::MalformedConstraint(format!(
                "a linear constraint needs one coefficient per variable, got {} variables and {} coefficients",
                variables.len(),
                coefficients.len()
            )));
        }

        let mut views = Vec::new();
        let mut scaling = Vec::new();
        for (name, &coefficient) in variables.iter().zip(coefficients) {
            let variable = self.resolve(name)?;
            // zero-coefficient terms never contribute and would block
            // propagation from detecting the violated all-constant case
            if coefficient != 0 {
                views.push(View::positive(variable));
                scaling.push(coefficient);
            }
        }

        if views.is_empty() {
            if c < 0 {
                self.flag_root_conflict();
            }
            return Ok(());
        }

        let _ = self
            .propagators
            .alloc(Propagator::LinearInequality(LinearInequalityPropagator::new(
                views, scaling, c,
            )));
        Ok(())
    }

    /// Post the reified constraint `b <=> (first /\ second)`.
    ///
    /// The domain of `b` is restricted to `[0, 1]`; each conjunct must
    /// normalize to a single temporal propagator, so `=` is not accepted
    /// here.
    pub fn add_reified_constraint(
        &mut self,
        b: &str,
        first: TemporalConstraint,
        second: TemporalConstraint,
    ) -> Result<(), ModelError> {
        let reification = self.resolve(b)?;
        let first = self.temporal_atom(first.x, first.k, first.comparison, first.y)?;
        let second = self.temporal_atom(second.x, second.k, second.comparison, second.y)?;

        self.restrict(reification, Interval::new(0, 1));
        let _ = self
            .propagators
            .alloc(Propagator::Reified(ReifiedPropagator::new(
                View::positive(reification),
                first,
                second,
            )));
        Ok(())
    }

    /// Minimize the given variable. The last call wins.
    pub fn minimise(&mut self, name: &str) -> Result<(), ModelError> {
        self.objective = Some(self.resolve(name)?);
        Ok(())
    }

    pub fn build(self) -> Problem {
        let mut store = DomainStore::new(self.domains.len());
        for (index, domain) in self.domains.iter().enumerate() {
            store.set_domain(VariableId::from_index(index), *domain);
        }
        let branching = (0..self.domains.len())
            .map(VariableId::from_index)
            .collect();
        Problem {
            store,
            propagators: self.propagators,
            branching,
            objective: self.objective,
            names: self.names.into_boxed_slice(),
        }
    }

    fn resolve(&self, name: &str) -> Result<VariableId, ModelError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| ModelError::UnknownVariable(name.to_owned()))
    }

    fn restrict(&mut self, variable: VariableId, restriction: Interval) {
        let domain = &mut self.domains[variable.index()];
        *domain = domain.join(restriction);
    }

    fn temporal_propagator(
        &self,
        x: &str,
        k: i32,
        comparison: Comparison,
        y: &str,
    ) -> Result<Propagator, ModelError> {
        if comparison == Comparison::Equal {
            let le = self.temporal_atom(x, k, Comparison::LessOrEqual, y)?;
            let ge = self.temporal_atom(x, k, Comparison::GreaterOrEqual, y)?;
            return Ok(Propagator::Conjunction(ConjunctionPropagator::new(
                Propagator::Temporal(le),
                Propagator::Temporal(ge),
            )));
        }
        Ok(Propagator::Temporal(self.temporal_atom(
            x, k, comparison, y,
        )?))
    }

    /// Normalize `x + k <op> y` into a single `x + k <= y` propagator.
    fn temporal_atom(
        &self,
        x: &str,
        k: i32,
        comparison: Comparison,
        y: &str,
    ) -> Result<TemporalPropagator, ModelError> {
        let x = self.resolve(x)?;
        let y = self.resolve(y)?;
        match comparison {
            Comparison::LessOrEqual => Ok(TemporalPropagator::new(
                View::positive(x),
                k,
                View::positive(y),
            )),
            // x + k < y  is  x + (k + 1) <= y
            Comparison::Less => Ok(TemporalPropagator::new(
                View::positive(x),
                k.saturating_add(1),
                View::positive(y),
            )),
            // x + k >= y  is  -x + (-k) <= -y
            Comparison::GreaterOrEqual => Ok(TemporalPropagator::new(
                View::negative(x),
                k.saturating_neg(),
                View::negative(y),
            )),
            // x + k > y  is  x + (k - 1) >= y
            Comparison::Greater => Ok(TemporalPropagator::new(
                View::negative(x),
                k.saturating_sub(1).saturating_neg(),
                View::negative(y),
            )),
            Comparison::Equal => Err(ModelError::MalformedConstraint(
                "a reified conjunct must normalize to a single temporal constraint".to_owned(),
            )),
            Comparison::NotEqual | Comparison::In => {
                Err(ModelError::UnsupportedOperator(comparison))
            }
        }
    }

    /// Materialize a contradiction that is already decidable at build time.
    fn flag_root_conflict(&mut self) {
        if self.root_conflict {
            return;
        }
        self.domains.push(Interval::new(1, 0));
        self.names.push("root-contradiction".to_owned());
        self.root_conflict = true;
    }
}

/// A normalized problem: the root store, the registered propagators, the
/// branching variables in registration order, and the optional minimization
/// objective.
#[derive(Debug)]
pub struct Problem {
    pub(crate) store: DomainStore,
    pub(crate) propagators: PropagatorStore,
    pub(crate) branching: Vec<VariableId>,
    pub(crate) objective: Option<VariableId>,
    /// Variable names, dense in registration order like the store itself.
    pub(crate) names: Box<[String]>,
}

impl Problem {
    pub fn num_variables(&self) -> usize {
        self.store.len()
    }

    pub fn num_propagators(&self) -> usize {
        self.propagators.len()
    }

    pub fn objective(&self) -> Option<VariableId> {
        self.objective
    }

    /// The initial domain of a variable, before any propagation.
    pub fn root_domain(&self, variable: VariableId) -> Interval {
        self.store.interval(View::positive(variable))
    }

    pub fn variable_name(&self, variable: VariableId) -> Option<&str> {
        self.names.get(variable.index()).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_variables_are_rejected() {
        let mut builder = ModelBuilder::new();
        let _ = builder.add_variable("x", 0, 5).unwrap();
        assert_eq!(
            builder.add_variable("x", 0, 9),
            Err(ModelError::DuplicateVariable("x".to_owned()))
        );
    }

    #[test]
    fn unknown_variables_are_rejected() {
        let mut builder = ModelBuilder::new();
        assert_eq!(
            builder.strengthen_domain("y", Comparison::LessOrEqual, 3),
            Err(ModelError::UnknownVariable("y".to_owned()))
        );
    }

    #[test]
    fn strengthening_intersects_the_domain() {
        let mut builder = ModelBuilder::new();
        let x = builder.add_variable("x", 0, 10).unwrap();
        builder.strengthen_domain("x", Comparison::Less, 8).unwrap();
        builder
            .strengthen_domain("x", Comparison::Greater, 1)
            .unwrap();
        // a looser bound must not widen
        builder
            .strengthen_domain("x", Comparison::LessOrEqual, 100)
            .unwrap();

        let problem = builder.build();
        assert_eq!(problem.root_domain(x), Interval::new(2, 7));
    }

    #[test]
    fn disequality_and_membership_are_build_errors() {
        let mut builder = ModelBuilder::new();
        let _ = builder.add_variable("x", 0, 5).unwrap();
        let _ = builder.add_variable("y", 0, 5).unwrap();

        assert_eq!(
            builder.strengthen_domain("x", Comparison::NotEqual, 3),
            Err(ModelError::UnsupportedOperator(Comparison::NotEqual))
        );
        assert_eq!(
            builder.add_temporal_constraint("x", 0, Comparison::In, "y"),
            Err(ModelError::UnsupportedOperator(Comparison::In))
        );
    }

    #[test]
    fn scaled_domains_round_toward_the_feasible_side() {
        let mut builder = ModelBuilder::new();
        let x = builder.add_variable("x", -100, 100).unwrap();
        let y = builder.add_variable("y", -100, 100).unwrap();

        // 3x <= -8 means x <= floor(-8/3) = -3
        builder.strengthen_domain_scaled("x", 3, -8).unwrap();
        // -3y <= -8 means y >= ceil(8/3) = 3
        builder.strengthen_domain_scaled("y", -3, -8).unwrap();

        let problem = builder.build();
        assert_eq!(problem.root_domain(x), Interval::new(-100, -3));
        assert_eq!(problem.root_domain(y), Interval::new(3, 100));
    }

    #[test]
    fn constant_contradictions_become_an_empty_domain() {
        let mut builder = ModelBuilder::new();
        let _ = builder.add_variable("x", 0, 5).unwrap();
        builder.strengthen_domain_scaled("x", 0, -1).unwrap();

        let problem = builder.build();
        assert!(problem.store.is_top());
    }

    #[test]
    fn all_constant_linear_constraints_are_decided_at_build_time() {
        let mut builder = ModelBuilder::new();
        let _ = builder.add_variable("x", 0, 5).unwrap();

        // 0 * x <= 3 is a tautology and posts nothing
        builder.add_linear_constraint(&["x"], &[0], 3).unwrap();
        assert_eq!(builder.propagators.len(), 0);

        // 0 * x <= -2 is a contradiction
        builder.add_linear_constraint(&["x"], &[0], -2).unwrap();
        let problem = builder.build();
        assert!(problem.store.is_top());
    }

    #[test]
    fn equality_expands_into_a_conjunction() {
        let mut builder = ModelBuilder::new();
        let _ = builder.add_variable("x", 0, 5).unwrap();
        let _ = builder.add_variable("y", 0, 5).unwrap();
        builder
            .add_temporal_constraint("x", 0, Comparison::Equal, "y")
            .unwrap();

        assert_eq!(builder.propagators.len(), 1);
        let problem = builder.build();
        assert_eq!(problem.num_propagators(), 1);
    }

    #[test]
    fn linear_length_mismatch_is_malformed() {
        let mut builder = ModelBuilder::new();
        let _ = builder.add_variable("x", 0, 5).unwrap();
        assert!(matches!(
            builder.add_linear_constraint(&["x"], &[1, 2], 3),
            Err(ModelError::MalformedConstraint(_))
        ));
    }

    #[test]
    fn reification_restricts_the_guard_to_a_boolean() {
        let mut builder = ModelBuilder::new();
        let b = builder.add_variable("b", -5, 5).unwrap();
        let _ = builder.add_variable("x", 0, 5).unwrap();
        let _ = builder.add_variable("y", 0, 5).unwrap();
        builder
            .add_reified_constraint(
                "b",
                TemporalConstraint::new("x", 1, Comparison::LessOrEqual, "y"),
                TemporalConstraint::new("y", -3, Comparison::LessOrEqual, "x"),
            )
            .unwrap();

        let problem = builder.build();
        assert_eq!(problem.root_domain(b), Interval::new(0, 1));
    }

    #[test]
    fn reified_conjuncts_must_be_single_temporals() {
        let mut builder = ModelBuilder::new();
        let _ = builder.add_variable("b", 0, 1).unwrap();
        let _ = builder.add_variable("x", 0, 5).unwrap();
        let _ = builder.add_variable("y", 0, 5).unwrap();

        assert!(matches!(
            builder.add_reified_constraint(
                "b",
                TemporalConstraint::new("x", 0, Comparison::Equal, "y"),
                TemporalConstraint::new("y", 0, Comparison::LessOrEqual, "x"),
            ),
            Err(ModelError::MalformedConstraint(_))
        ));
    }

    #[test]
    fn variable_names_are_kept() {
        let mut builder = ModelBuilder::new();
        let x = builder.add_variable("makespan", 0, 10).unwrap();
        let problem = builder.build();
        assert_eq!(problem.variable_name(x), Some("makespan"));
    }
}
