use super::Propagator;
use crate::engine::DomainStore;

/// Propagator for the conjunction of two owned propagators.
///
/// Propagates the left conjunct, then the right; entailed only when both
/// conjuncts are, disentailed as soon as either is.
#[derive(Clone, Debug)]
pub(crate) struct ConjunctionPropagator {
    left: Box<Propagator>,
    right: Box<Propagator>,
}

impl ConjunctionPropagator {
    pub(crate) fn new(left: Propagator, right: Propagator) -> ConjunctionPropagator {
        ConjunctionPropagator {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub(crate) fn propagate(&self, store: &DomainStore) -> bool {
        let changed_left = self.left.propagate(store);
        let changed_right = self.right.propagate(store);
        changed_left | changed_right
    }

    pub(crate) fn is_entailed(&self, store: &DomainStore) -> bool {
        self.left.is_entailed(store) && self.right.is_entailed(store)
    }

    pub(crate) fn is_disentailed(&self, store: &DomainStore) -> bool {
        self.left.is_disentailed(store) || self.right.is_disentailed(store)
    }

    pub(crate) fn left(&self) -> &Propagator {
        &self.left
    }

    pub(crate) fn right(&self) -> &Propagator {
        &self.right
    }
}
