//! The closed set of propagator variants.
//!
//! Every propagator exposes the same contract:
//! - `propagate` narrows the domains of the variables in its scope (never
//!   any other variable) and reports whether it changed the store. Repeated
//!   application on an unchanged store converges.
//! - `is_entailed` holds when the constraint is implied by the current
//!   domains; `is_disentailed` when it is contradicted.
//! - `variables` lists the scope.
//!
//! Dispatch is by variant; propagators form a forest in which conjunctions
//! and reifications own their children.

mod conjunction;
mod linear_inequality;
mod reified;
mod temporal;

pub(crate) use conjunction::ConjunctionPropagator;
pub(crate) use linear_inequality::LinearInequalityPropagator;
pub(crate) use reified::ReifiedPropagator;
pub(crate) use temporal::TemporalPropagator;

use crate::engine::DomainStore;
use crate::variables::VariableId;

#[derive(Clone, Debug)]
pub(crate) enum Propagator {
    Temporal(TemporalPropagator),
    LinearInequality(LinearInequalityPropagator),
    Conjunction(ConjunctionPropagator),
    Reified(ReifiedPropagator),
}

impl Propagator {
    pub(crate) fn propagate(&self, store: &DomainStore) -> bool {
        match self {
            Propagator::Temporal(propagator) => propagator.propagate(store),
            Propagator::LinearInequality(propagator) => propagator.propagate(store),
            Propagator::Conjunction(propagator) => propagator.propagate(store),
            Propagator::Reified(propagator) => propagator.propagate(store),
        }
    }

    pub(crate) fn is_entailed(&self, store: &DomainStore) -> bool {
        match self {
            Propagator::Temporal(propagator) => propagator.is_entailed(store),
            Propagator::LinearInequality(propagator) => propagator.is_entailed(store),
            Propagator::Conjunction(propagator) => propagator.is_entailed(store),
            Propagator::Reified(propagator) => propagator.is_entailed(store),
        }
    }

    pub(crate) fn is_disentailed(&self, store: &DomainStore) -> bool {
        match self {
            Propagator::Temporal(propagator) => propagator.is_disentailed(store),
            Propagator::LinearInequality(propagator) => propagator.is_disentailed(store),
            Propagator::Conjunction(propagator) => propagator.is_disentailed(store),
            Propagator::Reified(propagator) => propagator.is_disentailed(store),
        }
    }

    /// The set of variables in the propagator's scope, deduplicated.
    pub(crate) fn variables(&self) -> Vec<VariableId> {
        let mut scope = Vec::new();
        self.collect_variables(&mut scope);
        scope.sort_unstable();
        scope.dedup();
        scope
    }

    fn collect_variables(&self, scope: &mut Vec<VariableId>) {
        match self {
            Propagator::Temporal(propagator) => propagator.collect_variables(scope),
            Propagator::LinearInequality(propagator) => propagator.collect_variables(scope),
            Propagator::Conjunction(propagator) => {
                propagator.left().collect_variables(scope);
                propagator.right().collect_variables(scope);
            }
            Propagator::Reified(propagator) => propagator.collect_variables(scope),
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Propagator::Temporal(_) => "Temporal",
            Propagator::LinearInequality(_) => "LinearLeq",
            Propagator::Conjunction(_) => "And",
            Propagator::Reified(_) => "Reified",
        }
    }
}

/// The uid of a registered propagator; assigned densely by
/// [`PropagatorStore::alloc`], it doubles as the propagator's position in
/// the sweep order and is stable for the lifetime of the problem.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct PropagatorId(u32);

impl PropagatorId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Debug for PropagatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// The registered propagators of a problem, in registration order.
///
/// Registration order is load-bearing: the fixpoint engine sweeps in exactly
/// this order, and the And-parallel partition is by position in it.
#[derive(Clone, Debug, Default)]
pub(crate) struct PropagatorStore {
    propagators: Vec<Propagator>,
}

impl PropagatorStore {
    pub(crate) fn alloc(&mut self, propagator: Propagator) -> PropagatorId {
        self.propagators.push(propagator);
        PropagatorId(self.propagators.len() as u32 - 1)
    }

    pub(crate) fn len(&self) -> usize {
        self.propagators.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &'_ Propagator> {
        self.propagators.iter()
    }
}

impl std::ops::Index<PropagatorId> for PropagatorStore {
    type Output = Propagator;

    fn index(&self, index: PropagatorId) -> &Propagator {
        &self.propagators[index.index()]
    }
}
