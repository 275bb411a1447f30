use crate::engine::DomainStore;
use crate::variables::VariableId;
use crate::variables::View;

/// Propagator for the difference constraint `x + k <= y`.
///
/// Both operands are [`View`]s, so the same rule also covers `x + k >= y`
/// (negate both operands and `k`) and, through the builder's normalization,
/// the strict variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TemporalPropagator {
    x: View,
    y: View,
    k: i32,
}

impl TemporalPropagator {
    pub(crate) fn new(x: View, k: i32, y: View) -> TemporalPropagator {
        TemporalPropagator { x, y, k }
    }

    pub(crate) fn propagate(&self, store: &DomainStore) -> bool {
        let lb_y = store.lower_bound(self.x).saturating_add(self.k);
        let changed_y = store.tighten_lower_bound(self.y, lb_y);

        let ub_x = store.upper_bound(self.y).saturating_sub(self.k);
        let changed_x = store.tighten_upper_bound(self.x, ub_x);

        changed_y | changed_x
    }

    pub(crate) fn is_entailed(&self, store: &DomainStore) -> bool {
        store.upper_bound(self.x) as i64 + self.k as i64 <= store.lower_bound(self.y) as i64
    }

    pub(crate) fn is_disentailed(&self, store: &DomainStore) -> bool {
        store.lower_bound(self.x) as i64 + self.k as i64 > store.upper_bound(self.y) as i64
    }

    /// The propagator of the negated constraint:
    /// `!(x + k <= y)` is `y + (1 - k) <= x`.
    pub(crate) fn negation(&self) -> TemporalPropagator {
        TemporalPropagator::new(self.y, 1i32.saturating_sub(self.k), self.x)
    }

    pub(crate) fn collect_variables(&self, scope: &mut Vec<VariableId>) {
        scope.push(self.x.variable());
        scope.push(self.y.variable());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basic_types::Interval;
    use crate::propagators::test_helper::neg;
    use crate::propagators::test_helper::pos;
    use crate::propagators::test_helper::store;

    #[test]
    fn bounds_are_tightened_on_both_operands() {
        // x + 3 <= y with x in [0, 10], y in [0, 10]
        let store = store(&[(0, 10), (0, 10)]);
        let propagator = TemporalPropagator::new(pos(0), 3, pos(1));

        assert!(propagator.propagate(&store));
        assert_eq!(store.interval(pos(0)), Interval::new(0, 7));
        assert_eq!(store.interval(pos(1)), Interval::new(3, 10));

        // a second application reaches no further
        assert!(!propagator.propagate(&store));
    }

    #[test]
    fn entailment_and_disentailment() {
        let satisfied = store(&[(0, 2), (5, 9)]);
        let propagator = TemporalPropagator::new(pos(0), 3, pos(1));
        assert!(propagator.is_entailed(&satisfied));
        assert!(!propagator.is_disentailed(&satisfied));

        let violated = store(&[(4, 9), (0, 5)]);
        assert!(!propagator.is_entailed(&violated));
        assert!(propagator.is_disentailed(&violated));

        let undecided = store(&[(0, 5), (0, 5)]);
        assert!(!propagator.is_entailed(&undecided));
        assert!(!propagator.is_disentailed(&undecided));
    }

    #[test]
    fn violated_constraint_empties_a_domain() {
        let store = store(&[(6, 9), (0, 2)]);
        let propagator = TemporalPropagator::new(pos(0), 1, pos(1));

        let _ = propagator.propagate(&store);
        assert!(store.is_top());
    }

    #[test]
    fn negated_operands_encode_the_reverse_inequality() {
        // -x + (-3) <= -y encodes x + 3 >= y: raises lb(x), caps ub(y).
        let store = store(&[(0, 10), (6, 10)]);
        let propagator = TemporalPropagator::new(neg(0), -3, neg(1));

        assert!(propagator.propagate(&store));
        assert_eq!(store.interval(pos(0)), Interval::new(3, 10));
        assert_eq!(store.interval(pos(1)), Interval::new(6, 10));
    }

    #[test]
    fn negation_flips_satisfaction() {
        let propagator = TemporalPropagator::new(pos(0), 3, pos(1));
        let negation = propagator.negation();

        // where the constraint is entailed, its negation is disentailed
        let satisfied = store(&[(0, 2), (5, 9)]);
        assert!(negation.is_disentailed(&satisfied));

        let violated = store(&[(4, 9), (0, 5)]);
        assert!(negation.is_entailed(&violated));

        assert_eq!(negation.negation(), propagator);
    }
}
