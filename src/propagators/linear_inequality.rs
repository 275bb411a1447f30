use itertools::Itertools;

use crate::engine::DomainStore;
use crate::math::num_ext::NumExt;
use crate::variables::VariableId;
use crate::variables::View;

/// Propagator for the linear inequality `sum coefficients[i] * vars[i] <= c`.
///
/// Bounds propagation: for each term, the slack left by the smallest possible
/// contribution of all *other* terms caps the term's own variable. Sums are
/// accumulated in `i64`, so the arithmetic cannot overflow for any `i32`
/// domains and coefficients.
#[derive(Clone, Debug)]
pub(crate) struct LinearInequalityPropagator {
    vars: Box<[View]>,
    coefficients: Box<[i32]>,
    c: i32,
}

impl LinearInequalityPropagator {
    /// Both slices must have the same length; the builder validates this.
    pub(crate) fn new(
        vars: impl IntoIterator<Item = View>,
        coefficients: impl IntoIterator<Item = i32>,
        c: i32,
    ) -> LinearInequalityPropagator {
        let vars = vars.into_iter().collect_vec().into_boxed_slice();
        let coefficients = coefficients.into_iter().collect_vec().into_boxed_slice();
        crate::tempest_assert_eq_simple!(vars.len(), coefficients.len());
        LinearInequalityPropagator {
            vars,
            coefficients,
            c,
        }
    }

    /// The smallest value `coefficient * var` can take.
    fn min_contribution(&self, store: &DomainStore, index: usize) -> i64 {
        let coefficient = self.coefficients[index] as i64;
        if coefficient >= 0 {
            coefficient * store.lower_bound(self.vars[index]) as i64
        } else {
            coefficient * store.upper_bound(self.vars[index]) as i64
        }
    }

    /// The largest value `coefficient * var` can take.
    fn max_contribution(&self, store: &DomainStore, index: usize) -> i64 {
        let coefficient = self.coefficients[index] as i64;
        if coefficient >= 0 {
            coefficient * store.upper_bound(self.vars[index]) as i64
        } else {
            coefficient * store.lower_bound(self.vars[index]) as i64
        }
    }

    pub(crate) fn propagate(&self, store: &DomainStore) -> bool {
        let min_sum: i64 = (0..self.vars.len())
            .map(|index| self.min_contribution(store, index))
            .sum();

        let mut changed = false;
        for (index, &coefficient) in self.coefficients.iter().enumerate() {
            if coefficient == 0 {
                continue;
            }
            let slack = self.c as i64 - (min_sum - self.min_contribution(store, index));
            if coefficient > 0 {
                let bound = <i64 as NumExt>::div_floor(slack, coefficient as i64);
                changed |= store.tighten_upper_bound(self.vars[index], clamp(bound));
            } else {
                let bound = <i64 as NumExt>::div_ceil(slack, coefficient as i64);
                changed |= store.tighten_lower_bound(self.vars[index], clamp(bound));
            }
        }
        changed
    }

    pub(crate) fn is_entailed(&self, store: &DomainStore) -> bool {
        let max_sum: i64 = (0..self.vars.len())
            .map(|index| self.max_contribution(store, index))
            .sum();
        max_sum <= self.c as i64
    }

    pub(crate) fn is_disentailed(&self, store: &DomainStore) -> bool {
        let min_sum: i64 = (0..self.vars.len())
            .map(|index| self.min_contribution(store, index))
            .sum();
        min_sum > self.c as i64
    }

    pub(crate) fn collect_variables(&self, scope: &mut Vec<VariableId>) {
        scope.extend(self.vars.iter().map(|view| view.variable()));
    }
}

fn clamp(bound: i64) -> i32 {
    bound.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
