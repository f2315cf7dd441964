//! The two-phase differential attack on the final round key.

pub mod intersect;
pub mod primary;
pub mod secondary;

use indexmap::IndexMap;
use itertools::Itertools;
use lazy_static::lazy_static;
use std::fs::OpenOptions;
use std::io::Write;
use std::time::Instant;

use crate::memo::RoundCache;
use crate::pairs::{load_pairs, split_block, CiphertextPair, SAMPLE_PAIRS};

// The number of threads used for parallel calls is fixed
lazy_static! {
    pub(crate) static ref THREADS: usize = num_cpus::get();

    /// All 65536 byte pairs in ascending order. The primary phase scans
    /// it as the fold guesses (a0, a1), the secondary phase as the
    /// outer-byte guesses (c0, c1). Workers take every THREADS-th
    /// element.
    pub(crate) static ref BYTE_PAIRS: Vec<(u8, u8)> = (0u16..256)
        .cartesian_product(0u16..256)
        .map(|(hi, lo)| (hi as u8, lo as u8))
        .collect();
}

/// The differential characteristic the attack exploits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Characteristic {
    /// Fixed XOR difference between the two plaintexts of every pair.
    pub input_diff: u64,
    /// Round-function output difference reaching the final round with
    /// probability 1 under `input_diff`.
    pub output_diff: u32,
}

impl Characteristic {
    /// The classic FEAL-4 characteristic: plaintext difference
    /// 0x8080000080800000 cancels in the mixed right half and forces
    /// the round-function output difference 0x02000000 two rounds
    /// before the ciphertext.
    pub fn classic() -> Characteristic {
        Characteristic {
            input_diff: 0x8080000080800000,
            output_diff: 0x02000000,
        }
    }
}

impl Default for Characteristic {
    fn default() -> Self {
        Characteristic::classic()
    }
}

/// The per-pair values both phases test candidates against.
///
/// `y0` and `y1` are the left ^ right words of the two ciphertexts,
/// which equal the final-round inputs before the subkey is added.
/// `target` is the difference the final-round outputs must show if the
/// characteristic held: the left-half difference of the ciphertexts
/// XORed with the characteristic's output difference.
#[derive(Clone, Copy, Debug)]
pub struct PairSetup {
    pub y0: u32,
    pub y1: u32,
    pub target: u32,
}

impl PairSetup {
    /// Derives the setup values of one ciphertext pair.
    pub fn new(pair: &CiphertextPair, characteristic: &Characteristic) -> PairSetup {
        let (l0, r0) = split_block(pair.c0);
        let (l1, r1) = split_block(pair.c1);

        PairSetup {
            y0: l0 ^ r0,
            y1: l1 ^ r1,
            target: (l0 ^ l1) ^ characteristic.output_diff,
        }
    }
}

/// Runs the full attack: both search phases on every pair, then the
/// cross-pair intersection.
///
/// Returns the subkey candidates consistent with every pair, mapped to
/// the number of pairs supporting them, in ascending candidate order.
/// An empty map means no candidate survived all pairs; several entries
/// mean the pairs did not pin the subkey down uniquely. Both outcomes
/// are left to the caller to report.
///
/// # Panics
/// Panics if `pairs` is empty.
pub fn recover_last_round_key(
    pairs: &[CiphertextPair],
    characteristic: &Characteristic,
) -> IndexMap<u32, usize> {
    assert!(!pairs.is_empty(), "At least one ciphertext pair is required");

    let mut cache = RoundCache::new();
    let mut pair_candidates = Vec::with_capacity(pairs.len());

    for (i, pair) in pairs.iter().enumerate() {
        println!("Pair {} of {}: {:?}", i + 1, pairs.len(), pair);

        let setup = PairSetup::new(pair, characteristic);

        let survivors = primary::parallel_find_survivors(&setup, &mut cache);
        println!("Primary phase:   {:>6} fold survivors", survivors.len());

        let candidates = secondary::parallel_count_candidates(&survivors, &setup, &mut cache);
        println!("Secondary phase: {:>6} subkey candidates\n", candidates.len());

        pair_candidates.push(candidates);
    }

    let result = intersect::intersect_counts(&pair_candidates);

    println!("Cached round function inputs: {}", cache.size());

    result
}

/// Dumps the surviving candidates to a file, one hex word per line.
fn dump_candidates(candidates: &IndexMap<u32, usize>, path: &str) {
    // Contents of previous files are overwritten
    let mut file = OpenOptions::new()
        .write(true)
        .truncate(true)
        .create(true)
        .open(path)
        .expect("Could not open file.");

    for candidate in candidates.keys() {
        writeln!(file, "{:08x}", candidate).expect("Could not write to file.");
    }
}

/// Runs the attack for the command line: reads the pairs, recovers the
/// candidates, and reports the verdict.
pub fn run_attack(
    pair_file: Option<String>,
    characteristic: &Characteristic,
    output: Option<String>,
) {
    let pairs = match pair_file {
        Some(path) => load_pairs(&path),
        None => SAMPLE_PAIRS.to_vec(),
    };

    println!("\tPairs: {}", pairs.len());
    println!("\tInput difference:  {:016x}", characteristic.input_diff);
    println!("\tOutput difference: {:08x}", characteristic.output_diff);
    println!("\tThreads: {}", *THREADS);
    println!();

    let start = Instant::now();

    println!("------------------------------ SEARCHING ------------------------------\n");

    let candidates = recover_last_round_key(&pairs, characteristic);

    println!("\n------------------------------- RESULTS -------------------------------\n");

    println!("Attack finished. [{:?}]", start.elapsed());

    if candidates.is_empty() {
        println!("No subkey was consistent with every pair.");
        println!("Check the pair data and the characteristic.");
    } else {
        if candidates.len() > 1 {
            println!(
                "{} subkeys are consistent with every pair:",
                candidates.len()
            );
        }

        for (candidate, support) in &candidates {
            println!("Subkey {:08x} [{}/{} pairs]", candidate, support, pairs.len());
        }
    }

    if let Some(path) = output {
        dump_candidates(&candidates, &path);
    }
}
