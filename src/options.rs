use structopt::StructOpt;

use crate::utility::{parse_hex32, parse_hex64};

/// Parses six comma separated hexadecimal subkeys.
pub fn parse_subkeys(input: &str) -> Result<[u32; 6], String> {
    let words: Vec<&str> = input.split(',').collect();

    if words.len() != 6 {
        return Err(format!("Expected 6 subkeys, got {}", words.len()));
    }

    let mut subkeys = [0; 6];

    for (subkey, word) in subkeys.iter_mut().zip(&words) {
        *subkey = parse_hex32(word.trim()).map_err(|e| e.to_string())?;
    }

    Ok(subkeys)
}

#[derive(Clone, StructOpt)]
#[structopt(
    name = "fealcrack",
    about = "Differential cryptanalysis of FEAL-4. Recovers the final round key from ciphertext pairs."
)]
pub enum FealcrackOptions {
    #[structopt(name = "attack")]
    Attack {
        #[structopt(short = "p", long = "pairs")]
        /**
        Path to a file of ciphertext pairs, one hex,hex line per pair. The four bundled
        reference pairs are attacked when omitted.
        */
        pairs: Option<String>,

        #[structopt(long = "input-diff", default_value = "8080000080800000", parse(try_from_str = parse_hex64))]
        /**
        Plaintext XOR difference the pairs were encrypted under.
        */
        input_diff: u64,

        #[structopt(long = "output-diff", default_value = "02000000", parse(try_from_str = parse_hex32))]
        /**
        Round function output difference which the input difference forces with probability 1.
        */
        output_diff: u32,

        #[structopt(short = "o", long = "output")]
        /**
        Path to dump the surviving subkey candidates to, one hex word per line.
        */
        output: Option<String>,
    },

    #[structopt(name = "generate")]
    Generate {
        #[structopt(short = "k", long = "key", parse(try_from_str = parse_subkeys))]
        /**
        Six comma separated hexadecimal subkeys. Drawn at random when omitted.
        */
        key: Option<[u32; 6]>,

        #[structopt(short = "n", long = "pairs", default_value = "4")]
        /**
        Number of chosen-plaintext pairs to generate.
        */
        pairs: usize,

        #[structopt(long = "input-diff", default_value = "8080000080800000", parse(try_from_str = parse_hex64))]
        /**
        Plaintext XOR difference between the two plaintexts of every pair.
        */
        input_diff: u64,

        #[structopt(short = "o", long = "output")]
        /**
        Path to write the pairs to instead of stdout.
        */
        output: Option<String>,
    },
}
