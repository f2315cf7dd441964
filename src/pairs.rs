//! Ciphertext pairs, the attack's input data.

use rand::Rng;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};

use crate::cipher::Feal4;
use crate::utility::parse_hex64;

/// The ciphertexts of two plaintexts whose XOR difference is the fixed
/// input difference of the characteristic.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CiphertextPair {
    pub c0: u64,
    pub c1: u64,
}

impl fmt::Debug for CiphertextPair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:016x}, {:016x})", self.c0, self.c1)
    }
}

/// Splits a 64-bit block into its left and right words.
#[inline(always)]
pub fn split_block(block: u64) -> (u32, u32) {
    ((block >> 32) as u32, block as u32)
}

/// Four pairs captured from a FEAL-4 instance under the classic
/// plaintext difference 0x8080000080800000. Used when no pair file is
/// given.
pub const SAMPLE_PAIRS: [CiphertextPair; 4] = [
    CiphertextPair {
        c0: 0xbfa68902044c5bfa,
        c1: 0x2d3617760aa5b93d,
    },
    CiphertextPair {
        c0: 0x928d09abd2735506,
        c1: 0xf8f7462224726e7c,
    },
    CiphertextPair {
        c0: 0xb07ba785f5707028,
        c1: 0x42b70825af44ff09,
    },
    CiphertextPair {
        c0: 0x885a2c1be73ed79f,
        c1: 0xbb9e58774c72c372,
    },
];

/// Parses a `hex,hex` line into a pair. Both blocks may carry a `0x`
/// prefix.
pub fn parse_pair(line: &str) -> CiphertextPair {
    let mut blocks = line.split(',');

    let c0 = blocks.next().expect("Missing first ciphertext");
    let c1 = blocks.next().expect("Missing second ciphertext");

    CiphertextPair {
        c0: parse_hex64(c0.trim()).expect("Could not parse first ciphertext"),
        c1: parse_hex64(c1.trim()).expect("Could not parse second ciphertext"),
    }
}

/// Reads ciphertext pairs from a file with one `hex,hex` line per pair.
/// Blank lines are skipped.
pub fn load_pairs(path: &str) -> Vec<CiphertextPair> {
    let file = File::open(path).expect("Could not open pair file.");
    let mut pairs = Vec::new();

    for line in BufReader::new(file).lines() {
        let line = line.expect("Error reading pair file.");

        if line.trim().is_empty() {
            continue;
        }

        pairs.push(parse_pair(&line));
    }

    pairs
}

/// Writes ciphertext pairs in the format `load_pairs` reads.
pub fn write_pairs(path: &str, pairs: &[CiphertextPair]) {
    let mut file = File::create(path).expect("Could not create pair file.");

    for pair in pairs {
        writeln!(file, "{:016x},{:016x}", pair.c0, pair.c1).expect("Could not write to file.");
    }
}

/// Encrypts `count` chosen-plaintext pairs under `cipher`, each from a
/// random plaintext and its offset by `input_diff`.
pub fn chosen_plaintext_pairs<R: Rng>(
    cipher: &Feal4,
    input_diff: u64,
    count: usize,
    rng: &mut R,
) -> Vec<CiphertextPair> {
    let pairs: Vec<CiphertextPair> = (0..count)
        .map(|_| {
            let p0: u64 = rng.gen();

            CiphertextPair {
                c0: cipher.encrypt(p0),
                c1: cipher.encrypt(p0 ^ input_diff),
            }
        })
        .collect();

    debug_assert!(pairs
        .iter()
        .all(|pair| cipher.decrypt(pair.c0) ^ cipher.decrypt(pair.c1) == input_diff));

    pairs
}

/// Generates chosen-plaintext pairs for the command line and reports
/// the subkeys they were encrypted under.
pub fn run_generate(key: Option<[u32; 6]>, count: usize, input_diff: u64, output: Option<String>) {
    let mut rng = rand::thread_rng();
    let cipher = match key {
        Some(subkeys) => Feal4::new(subkeys),
        None => Feal4::random(&mut rng),
    };

    let pairs = chosen_plaintext_pairs(&cipher, input_diff, count, &mut rng);

    match output {
        Some(path) => {
            write_pairs(&path, &pairs);
            println!("Wrote {} pairs to {}", pairs.len(), path);
        }
        None => {
            for pair in &pairs {
                println!("{:016x},{:016x}", pair.c0, pair.c1);
            }
        }
    }

    // Key material goes to stderr so piped pair output stays clean
    let subkeys = cipher.subkeys();
    eprintln!(
        "Subkeys: {:08x},{:08x},{:08x},{:08x},{:08x},{:08x}",
        subkeys[0], subkeys[1], subkeys[2], subkeys[3], subkeys[4], subkeys[5]
    );
    eprintln!("Final round key: {:08x}", cipher.last_round_key());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_block_test() {
        assert_eq!(split_block(0x0123456789abcdef), (0x01234567, 0x89abcdef));
        assert_eq!(split_block(0xffffffff00000000), (0xffffffff, 0x00000000));
    }

    #[test]
    fn parse_pair_accepts_prefixed_and_bare_hex() {
        let pair = parse_pair("0xbfa68902044c5bfa, 2d3617760aa5b93d");

        assert_eq!(pair, SAMPLE_PAIRS[0]);
    }

    #[test]
    #[should_panic]
    fn parse_pair_rejects_single_block() {
        parse_pair("bfa68902044c5bfa");
    }

    #[test]
    fn generated_pairs_decrypt_to_the_input_difference() {
        let input_diff = 0x8080000080800000;
        let cipher = Feal4::new([
            0x0f1e2d3c, 0x4b5a6978, 0x8796a5b4, 0xc3d2e1f0, 0x01234567, 0x89abcdef,
        ]);
        let mut rng = rand::thread_rng();

        for pair in chosen_plaintext_pairs(&cipher, input_diff, 8, &mut rng) {
            assert_eq!(cipher.decrypt(pair.c0) ^ cipher.decrypt(pair.c1), input_diff);
            assert_ne!(pair.c0, pair.c1);
        }
    }
}
