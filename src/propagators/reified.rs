use super::TemporalPropagator;
use crate::engine::DomainStore;
use crate::variables::VariableId;
use crate::variables::View;

/// Propagator for `b <=> (t1 /\ t2)` where `b` is a 0/1 variable and both
/// conjuncts are temporal constraints.
///
/// The restriction of the right-hand side to a conjunction of two temporals
/// is what makes the negative direction well-defined: the negation of a
/// temporal constraint is again a temporal constraint, so once `b = 0` and
/// one conjunct is entailed, the other conjunct's negation can be enforced
/// directly.
#[derive(Clone, Debug)]
pub(crate) struct ReifiedPropagator {
    reification: View,
    first: TemporalPropagator,
    second: TemporalPropagator,
}

impl ReifiedPropagator {
    pub(crate) fn new(
        reification: View,
        first: TemporalPropagator,
        second: TemporalPropagator,
    ) -> ReifiedPropagator {
        ReifiedPropagator {
            reification,
            first,
            second,
        }
    }

    pub(crate) fn propagate(&self, store: &DomainStore) -> bool {
        let reification = store.interval(self.reification);
        if reification.is_assigned() {
            if reification.lb() == 0 {
                self.propagate_negative(store)
            } else {
                let changed_first = self.first.propagate(store);
                let changed_second = self.second.propagate(store);
                changed_first | changed_second
            }
        } else if self.first.is_entailed(store) && self.second.is_entailed(store) {
            store.assign(self.reification, 1)
        } else if self.first.is_disentailed(store) || self.second.is_disentailed(store) {
            store.assign(self.reification, 0)
        } else {
            false
        }
    }

    /// With `b = 0` the conjunction must not hold: once one conjunct is
    /// entailed, the other is narrowed to its negation.
    fn propagate_negative(&self, store: &DomainStore) -> bool {
        let mut changed = false;
        if self.first.is_entailed(store) {
            changed |= self.second.negation().propagate(store);
        }
        if self.second.is_entailed(store) {
            changed |= self.first.negation().propagate(store);
        }
        changed
    }

    pub(crate) fn is_entailed(&self, store: &DomainStore) -> bool {
        let reification = store.interval(self.reification);
        if !reification.is_assigned() {
            return false;
        }
        if reification.lb() == 0 {
            self.first.is_disentailed(store) || self.second.is_disentailed(store)
        } else {
            self.first.is_entailed(store) && self.second.is_entailed(store)
        }
    }

    pub(crate) fn is_disentailed(&self, store: &DomainStore) -> bool {
        let reification = store.interval(self.reification);
        if !reification.is_assigned() {
            return false;
        }
        if reification.lb() == 0 {
            self.first.is_entailed(store) && self.second.is_entailed(store)
        } else {
            self.first.is_disentailed(store) || self.second.is_disentailed(store)
        }
    }

    pub(crate) fn collect_variables(&self, scope: &mut Vec<VariableId>) {
        scope.push(self.reification.variable());
        self.first.collect_variables(scope);
        self.second.collect_variables(scope);
    }
}
