use std::sync::atomic::AtomicI32;
use std::sync::atomic::Ordering;

use crate::basic_types::Interval;

/// The objective interval shared by all search workers.
///
/// The upper bound is the minimization frontier: workers narrow their local
/// objective domain to it before propagating, and every improving solution
/// lowers it through [`SharedBound::publish`]. The cell only ever tightens,
/// so the sequence of successfully published frontiers is strictly
/// decreasing under any interleaving.
#[derive(Debug)]
pub(crate) struct SharedBound {
    lb: AtomicI32,
    ub: AtomicI32,
}

impl SharedBound {
    pub(crate) fn new(interval: Interval) -> SharedBound {
        SharedBound {
            lb: AtomicI32::new(interval.lb()),
            ub: AtomicI32::new(interval.ub()),
        }
    }

    pub(crate) fn upper_bound(&self) -> i32 {
        self.ub.load(Ordering::Relaxed)
    }

    pub(crate) fn interval(&self) -> Interval {
        Interval::new(self.lb.load(Ordering::Relaxed), self.upper_bound())
    }

    /// Record a candidate objective value.
    ///
    /// On success the frontier becomes `value - 1` (searching for strictly
    /// better solutions) and the cell is opened downward. Returns `false` if
    /// another worker already published a value at least as good.
    pub(crate) fn publish(&self, value: i32) -> bool {
        let frontier = value.saturating_sub(1);
        let mut current = self.ub.load(Ordering::Relaxed);
        loop {
            if frontier >= current {
                return false;
            }
            match self
                .ub
                .compare_exchange_weak(current, frontier, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => {
                    self.lb.store(i32::MIN, Ordering::Relaxed);
                    return true;
                }
                Err(observed) => current = observed,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publishing_tightens_the_frontier() {
        let bound = SharedBound::new(Interval::new(0, 10));

        assert!(bound.publish(7));
        assert_eq!(bound.upper_bound(), 6);
        assert_eq!(bound.interval().lb(), i32::MIN);

        assert!(bound.publish(3));
        assert_eq!(bound.upper_bound(), 2);
    }

    #[test]
    fn stale_candidates_are_rejected() {
        let bound = SharedBound::new(Interval::new(0, 10));

        assert!(bound.publish(4));
        assert!(!bound.publish(4), "an equal candidate does not improve");
        assert!(!bound.publish(8), "a worse candidate does not improve");
        assert_eq!(bound.upper_bound(), 3);
    }

    #[test]
    fn a_value_matching_the_initial_upper_bound_improves() {
        let bound = SharedBound::new(Interval::new(0, 10));
        assert!(bound.publish(10));
        assert_eq!(bound.upper_bound(), 9);
    }
}
