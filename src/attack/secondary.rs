//! Secondary phase: complete fold survivors into full subkey candidates.
//!
//! A survivor (0, a0, a1, 0) fixes the XOR of each half of the subkey
//! but not the halves themselves. Guessing the outer bytes (c0, c1)
//! determines the rest, giving the candidate (c0, a0 ^ c0, a1 ^ c1, c1)
//! whose halves fold back to a0 and a1. Here the sieve is exact: a
//! candidate counts only if the two final-round outputs differ by the
//! full 32-bit target.

use indexmap::IndexMap;
use std::sync::mpsc;

use crate::attack::{PairSetup, BYTE_PAIRS, THREADS};
use crate::cipher::{pack, unpack};
use crate::memo::RoundCache;
use crate::utility::ProgressBar;

/// Completes a fold survivor with outer-byte guesses into a full
/// candidate word (c0, a0 ^ c0, a1 ^ c1, c1).
#[inline(always)]
pub fn candidate_word(a0: u8, a1: u8, c0: u8, c1: u8) -> u32 {
    pack([c0, a0 ^ c0, a1 ^ c1, c1])
}

/// Tests one full candidate against the pair.
#[inline(always)]
fn matches(setup: &PairSetup, candidate: u32, cache: &mut RoundCache) -> bool {
    let z0 = cache.evaluate(setup.y0 ^ candidate);
    let z1 = cache.evaluate(setup.y1 ^ candidate);

    z0 ^ z1 == setup.target
}

/// Exhausts all 65536 outer-byte completions of every survivor against
/// one pair. Returns each matching candidate with its occurrence count,
/// in ascending candidate order. Empty survivors give an empty map.
pub fn count_candidates(
    survivors: &[u32],
    setup: &PairSetup,
    cache: &mut RoundCache,
) -> IndexMap<u32, usize> {
    let mut candidates = IndexMap::new();

    for &survivor in survivors {
        let [_, a0, a1, _] = unpack(survivor);

        for &(c0, c1) in BYTE_PAIRS.iter() {
            let candidate = candidate_word(a0, a1, c0, c1);

            if matches(setup, candidate, cache) {
                *candidates.entry(candidate).or_insert(0) += 1;
            }
        }
    }

    candidates.sort_keys();
    candidates
}

/// Parallel version of `count_candidates`. Workers take every
/// THREADS-th outer-byte guess for all survivors; counts are merged by
/// summation and the worker caches folded back into `cache`.
pub fn parallel_count_candidates(
    survivors: &[u32],
    setup: &PairSetup,
    cache: &mut RoundCache,
) -> IndexMap<u32, usize> {
    if *THREADS == 1 {
        return count_candidates(survivors, setup, cache);
    }

    let (result_tx, result_rx) = mpsc::channel();

    // Start scoped worker threads
    crossbeam_utils::thread::scope(|scope| {
        for t in 0..*THREADS {
            let result_tx = result_tx.clone();
            let mut thread_cache = cache.clone();

            scope.spawn(move |_| {
                let share: Vec<(u8, u8)> = BYTE_PAIRS
                    .iter()
                    .skip(t)
                    .step_by(*THREADS)
                    .cloned()
                    .collect();
                let mut candidates: IndexMap<u32, usize> = IndexMap::new();
                let mut progress_bar = ProgressBar::new(survivors.len() * share.len());

                for &survivor in survivors {
                    let [_, a0, a1, _] = unpack(survivor);

                    for &(c0, c1) in &share {
                        let candidate = candidate_word(a0, a1, c0, c1);

                        if matches(setup, candidate, &mut thread_cache) {
                            *candidates.entry(candidate).or_insert(0) += 1;
                        }

                        if t == 0 {
                            progress_bar.increment();
                        }
                    }
                }

                result_tx
                    .send((candidates, thread_cache))
                    .expect("Thread could not send result");
            });
        }
    })
    .expect("Worker thread panicked");

    // Collect candidate counts from each thread and merge the caches back
    let mut candidates: IndexMap<u32, usize> = IndexMap::new();

    for _ in 0..*THREADS {
        let (thread_candidates, thread_cache) =
            result_rx.recv().expect("Main could not receive result");

        for (candidate, count) in thread_candidates {
            *candidates.entry(candidate).or_insert(0) += count;
        }

        cache.merge(thread_cache);
    }

    candidates.sort_keys();
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attack::{primary, Characteristic};
    use crate::cipher::round_function;
    use crate::pairs::{CiphertextPair, SAMPLE_PAIRS};

    #[test]
    fn no_survivors_give_no_candidates() {
        let setup = PairSetup::new(&SAMPLE_PAIRS[0], &Characteristic::classic());
        let mut cache = RoundCache::new();

        assert!(count_candidates(&[], &setup, &mut cache).is_empty());
        assert!(parallel_count_candidates(&[], &setup, &mut cache).is_empty());
    }

    #[test]
    fn candidates_satisfy_the_full_width_relation() {
        let setup = PairSetup::new(&SAMPLE_PAIRS[0], &Characteristic::classic());
        let mut cache = RoundCache::new();

        let survivors = primary::find_survivors(&setup, &mut cache);
        let candidates = count_candidates(&survivors, &setup, &mut cache);

        for (&candidate, &count) in &candidates {
            // Recompute without the cache
            let z0 = round_function(setup.y0 ^ candidate);
            let z1 = round_function(setup.y1 ^ candidate);

            assert_eq!(z0 ^ z1, setup.target);
            assert!(count >= 1);

            // The candidate's halves must fold back to one of the survivors
            let [d0, d1, d2, d3] = unpack(candidate);
            assert!(survivors.contains(&primary::structural_word(d0 ^ d1, d2 ^ d3)));
        }
    }

    #[test]
    fn true_subkey_and_aliases_are_counted() {
        let characteristic = Characteristic::classic();
        let cipher = crate::cipher::Feal4::new([
            0x243f6a88, 0x85a308d3, 0x13198a2e, 0x03707344, 0xa4093822, 0x299f31d0,
        ]);
        let p0 = 0xfedcba9876543210;
        let pair = CiphertextPair {
            c0: cipher.encrypt(p0),
            c1: cipher.encrypt(p0 ^ characteristic.input_diff),
        };

        let setup = PairSetup::new(&pair, &characteristic);
        let mut cache = RoundCache::new();

        let survivors = primary::find_survivors(&setup, &mut cache);
        let candidates = count_candidates(&survivors, &setup, &mut cache);

        // The differentials of the round function make these four
        // candidates indistinguishable from the true subkey
        let subkey = cipher.last_round_key();
        for alias in [0x00000000, 0x80800000, 0x00008080, 0x80808080] {
            assert!(candidates.contains_key(&(subkey ^ alias)));
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        let setup = PairSetup::new(&SAMPLE_PAIRS[2], &Characteristic::classic());

        let mut sequential_cache = RoundCache::new();
        let survivors = primary::find_survivors(&setup, &mut sequential_cache);
        let sequential = count_candidates(&survivors, &setup, &mut sequential_cache);

        let mut parallel_cache = RoundCache::new();
        let parallel = parallel_count_candidates(&survivors, &setup, &mut parallel_cache);

        assert_eq!(sequential, parallel);
    }
}
