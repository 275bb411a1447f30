//! The propagation engine: sweep the propagators in registration order until
//! a whole sweep reports no change, or the store becomes top.
//!
//! The schedule is the naive round-until-quiet loop: no priority queue, no
//! dirty-set deduplication. Its simplicity is what allows a sweep to be
//! partitioned across helper threads: every narrowing is a monotone atomic
//! update on the store, so helpers may run their share of the propagators
//! concurrently and the resulting fixpoint is independent of their
//! interleaving.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread;

use crate::engine::DomainStore;
use crate::engine::SolverStatistics;
use crate::propagators::PropagatorStore;

/// Run the propagators on `store` until fixpoint or contradiction.
///
/// Each full sweep increments `fixpoint_iterations`. With `helpers > 1` the
/// propagator list is partitioned round-robin across that many threads which
/// synchronize at a barrier between sweeps. The global `stop` flag is polled
/// between sweeps.
pub(crate) fn propagate_to_fixpoint(
    store: &DomainStore,
    propagators: &PropagatorStore,
    helpers: usize,
    stop: &AtomicBool,
    statistics: &mut SolverStatistics,
) {
    if store.is_top() {
        return;
    }
    loop {
        let changed = if helpers > 1 {
            concurrent_sweep(store, propagators, helpers)
        } else {
            sweep(store, propagators)
        };
        statistics.fixpoint_iterations += 1;

        if store.is_top() || !changed || stop.load(Ordering::Relaxed) {
            break;
        }
    }
    if helpers > 1 && !store.is_top() {
        store.detect_empty_domain();
    }
}

fn sweep(store: &DomainStore, propagators: &PropagatorStore) -> bool {
    let mut changed = false;
    for propagator in propagators.iter() {
        changed |= propagator.propagate(store);
        if store.is_top() {
            break;
        }
    }
    changed
}

fn concurrent_sweep(store: &DomainStore, propagators: &PropagatorStore, helpers: usize) -> bool {
    let changed = AtomicBool::new(false);
    thread::scope(|scope| {
        for helper in 0..helpers {
            let changed = &changed;
            let _ = scope.spawn(move || {
                for (index, propagator) in propagators.iter().enumerate() {
                    if index % helpers != helper {
                        continue;
                    }
                    if store.is_top() {
                        break;
                    }
                    if propagator.propagate(store) {
                        changed.store(true, Ordering::Relaxed);
                    }
                }
            });
        }
    });
    changed.load(Ordering::Relaxed)
}
