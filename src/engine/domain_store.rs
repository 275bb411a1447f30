use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicI32;
use std::sync::atomic::Ordering;

use crate::basic_types::Interval;
use crate::tempest_assert_eq_simple;
use crate::variables::VariableId;
use crate::variables::View;

/// The bounds of one variable.
///
/// Bounds are atomic so that propagation helpers may narrow the same store
/// concurrently; all narrowing goes through monotone fetch-max/fetch-min
/// updates, which makes the final store independent of helper interleaving.
#[derive(Debug)]
struct DomainCell {
    lb: AtomicI32,
    ub: AtomicI32,
}

impl DomainCell {
    fn new(interval: Interval) -> DomainCell {
        DomainCell {
            lb: AtomicI32::new(interval.lb()),
            ub: AtomicI32::new(interval.ub()),
        }
    }

    fn load(&self) -> Interval {
        Interval::new(
            self.lb.load(Ordering::Relaxed),
            self.ub.load(Ordering::Relaxed),
        )
    }

    fn store(&mut self, interval: Interval) {
        *self.lb.get_mut() = interval.lb();
        *self.ub.get_mut() = interval.ub();
    }
}

/// A fixed-size store of interval domains with a sticky unsatisfiability flag.
///
/// The store length is set at construction and never changes. During solving
/// the only permitted mutation is *narrowing*: the lower bound of a variable
/// never decreases and its upper bound never increases. Narrowing a domain
/// empty (lower bound above upper bound) raises the *top* flag, which stays
/// raised until [`DomainStore::reset`].
///
/// All accessors address variables through a [`View`]; a negated view reads
/// and writes the mirrored domain without ever touching storage of its own.
#[derive(Debug)]
pub struct DomainStore {
    domains: Vec<DomainCell>,
    top: AtomicBool,
}

impl DomainStore {
    /// Create a store of `len` variables, each covering the full `i32` range.
    pub fn new(len: usize) -> DomainStore {
        DomainStore {
            domains: (0..len).map(|_| DomainCell::new(Interval::FULL)).collect(),
            top: AtomicBool::new(false),
        }
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Whether some domain has been narrowed empty. Once raised, the flag
    /// only clears through [`DomainStore::reset`].
    pub fn is_top(&self) -> bool {
        self.top.load(Ordering::Relaxed)
    }

    /// Overwrite every domain and the top flag with the contents of `other`.
    ///
    /// Used when backtracking to a snapshot. Both stores must have the same
    /// length; calling this across differently-sized stores is a programming
    /// error.
    pub fn reset(&mut self, other: &DomainStore) {
        tempest_assert_eq_simple!(
            self.len(),
            other.len(),
            "reset requires stores of identical size"
        );
        for (cell, source) in self.domains.iter_mut().zip(other.domains.iter()) {
            cell.store(source.load());
        }
        *self.top.get_mut() = other.is_top();
    }

    /// Unconditionally set the domain of a variable.
    ///
    /// Only the problem builder uses this; it is not a narrowing operation.
    /// Setting an empty interval raises top.
    pub fn set_domain(&mut self, variable: VariableId, interval: Interval) {
        self.domains[variable.index()].store(interval);
        if interval.is_empty() {
            *self.top.get_mut() = true;
        }
    }

    pub fn interval(&self, view: View) -> Interval {
        let domain = self.domains[view.variable().index()].load();
        if view.is_negated() {
            domain.negate()
        } else {
            domain
        }
    }

    pub fn lower_bound(&self, view: View) -> i32 {
        self.interval(view).lb()
    }

    pub fn upper_bound(&self, view: View) -> i32 {
        self.interval(view).ub()
    }

    pub fn is_assigned(&self, view: View) -> bool {
        self.interval(view).is_assigned()
    }

    /// Raise the lower bound of the viewed domain to `bound` if that is
    /// strictly tighter. Returns whether the domain changed; raises top if
    /// the domain became empty.
    pub fn tighten_lower_bound(&self, view: View, bound: i32) -> bool {
        if view.is_negated() {
            self.raise_ub(view.variable(), bound.saturating_neg())
        } else {
            self.raise_lb(view.variable(), bound)
        }
    }

    /// Lower the upper bound of the viewed domain to `bound` if that is
    /// strictly tighter. Returns whether the domain changed; raises top if
    /// the domain became empty.
    pub fn tighten_upper_bound(&self, view: View, bound: i32) -> bool {
        if view.is_negated() {
            self.raise_lb(view.variable(), bound.saturating_neg())
        } else {
            self.raise_ub(view.variable(), bound)
        }
    }

    /// Narrow the viewed domain to its intersection with `interval`. Returns
    /// whether either bound changed.
    pub fn tighten(&self, view: View, interval: Interval) -> bool {
        let changed_lb = self.tighten_lower_bound(view, interval.lb());
        let changed_ub = self.tighten_upper_bound(view, interval.ub());
        changed_lb | changed_ub
    }

    pub fn assign(&self, view: View, value: i32) -> bool {
        self.tighten(view, Interval::singleton(value))
    }

    /// Re-derive the top flag by scanning for an empty domain.
    ///
    /// Narrowing raises top eagerly, but when two helpers concurrently cross
    /// a lower and an upper bound, each may read the other's stale bound and
    /// miss the crossing. A scan after a concurrent sweep closes that gap.
    pub(crate) fn detect_empty_domain(&self) {
        for cell in &self.domains {
            if cell.load().is_empty() {
                self.top.store(true, Ordering::Relaxed);
                return;
            }
        }
    }

    fn raise_lb(&self, variable: VariableId, bound: i32) -> bool {
        let cell = &self.domains[variable.index()];
        let previous = cell.lb.fetch_max(bound, Ordering::Relaxed);
        if previous >= bound {
            return false;
        }
        if bound > cell.ub.load(Ordering::Relaxed) {
            self.top.store(true, Ordering::Relaxed);
        }
        true
    }

    fn raise_ub(&self, variable: VariableId, bound: i32) -> bool {
        let cell = &self.domains[variable.index()];
        let previous = cell.ub.fetch_min(bound, Ordering::Relaxed);
        if previous <= bound {
            return false;
        }
        if bound < cell.lb.load(Ordering::Relaxed) {
            self.top.store(true, Ordering::Relaxed);
        }
        true
    }
}

impl Clone for DomainStore {
    fn clone(&self) -> DomainStore {
        DomainStore {
            domains: self
                .domains
                .iter()
                .map(|cell| DomainCell::new(cell.load()))
                .collect(),
            top: AtomicBool::new(self.is_top()),
        }
    }
}
