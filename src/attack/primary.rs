//! Primary phase: sieve the structural candidate space.
//!
//! A structural candidate (0, a0, a1, 0) guesses only the XOR of each
//! subkey half, a0 = k0 ^ k1 and a1 = k2 ^ k3. Folding the final-round
//! inputs the same way before evaluating the round function leaves the
//! middle two output bytes correct, so any guess equal to the real
//! subkey's folds must reproduce the middle 16 bits of the target
//! difference. The full space is only 2^16 wide and the sieve cuts it
//! down to a handful of survivors for the secondary phase to complete.

use std::sync::mpsc;

use crate::attack::{PairSetup, BYTE_PAIRS, THREADS};
use crate::cipher::{fold_halves, pack};
use crate::memo::RoundCache;
use crate::utility::ProgressBar;

/// Bits 8 to 23, the two output bytes a folded input determines.
const MIDDLE_BITS: u32 = 0x00ffff00;

/// Builds the structural candidate word (0, a0, a1, 0).
#[inline(always)]
pub fn structural_word(a0: u8, a1: u8) -> u32 {
    pack([0x00, a0, a1, 0x00])
}

/// Tests one structural candidate against the pair.
#[inline(always)]
fn matches(setup: &PairSetup, candidate: u32, cache: &mut RoundCache) -> bool {
    let q0 = cache.evaluate(fold_halves(setup.y0 ^ candidate));
    let q1 = cache.evaluate(fold_halves(setup.y1 ^ candidate));

    (q0 ^ q1) & MIDDLE_BITS == setup.target & MIDDLE_BITS
}

/// Exhausts all 65536 structural candidates against one pair and
/// returns the survivors in ascending order. An empty result is a data
/// outcome, not an error.
pub fn find_survivors(setup: &PairSetup, cache: &mut RoundCache) -> Vec<u32> {
    let mut survivors = Vec::new();

    for &(a0, a1) in BYTE_PAIRS.iter() {
        let candidate = structural_word(a0, a1);

        if matches(setup, candidate, cache) {
            survivors.push(candidate);
        }
    }

    survivors
}

/// Parallel version of `find_survivors`. Workers sieve every THREADS-th
/// candidate with a clone of the cache; survivors are merged and
/// sorted, and the worker caches folded back into `cache`.
pub fn parallel_find_survivors(setup: &PairSetup, cache: &mut RoundCache) -> Vec<u32> {
    // No point spinning up a scope for a single worker
    if *THREADS == 1 {
        return find_survivors(setup, cache);
    }

    let (result_tx, result_rx) = mpsc::channel();

    // Start scoped worker threads
    crossbeam_utils::thread::scope(|scope| {
        for t in 0..*THREADS {
            let result_tx = result_tx.clone();
            let mut thread_cache = cache.clone();

            scope.spawn(move |_| {
                let share = BYTE_PAIRS.iter().skip(t).step_by(*THREADS);
                let mut survivors = Vec::new();
                let mut progress_bar = ProgressBar::new(share.len());

                for &(a0, a1) in share {
                    let candidate = structural_word(a0, a1);

                    if matches(setup, candidate, &mut thread_cache) {
                        survivors.push(candidate);
                    }

                    if t == 0 {
                        progress_bar.increment();
                    }
                }

                result_tx
                    .send((survivors, thread_cache))
                    .expect("Thread could not send result");
            });
        }
    })
    .expect("Worker thread panicked");

    // Collect survivors from each thread and merge the caches back
    let mut survivors = Vec::new();

    for _ in 0..*THREADS {
        let (mut thread_survivors, thread_cache) =
            result_rx.recv().expect("Main could not receive result");

        survivors.append(&mut thread_survivors);
        cache.merge(thread_cache);
    }

    survivors.sort_unstable();
    survivors
}
