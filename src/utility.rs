//! A collection of utility functions used throughout the tool.

use std::io::{self, Write};
use std::num::ParseIntError;

/// Parses a 32-bit word from a hexadecimal string, with or without a
/// leading `0x`.
pub fn parse_hex32(input: &str) -> Result<u32, ParseIntError> {
    let digits = input.strip_prefix("0x").unwrap_or(input);
    u32::from_str_radix(digits, 16)
}

/// Parses a 64-bit block from a hexadecimal string, with or without a
/// leading `0x`.
pub fn parse_hex64(input: &str) -> Result<u64, ParseIntError> {
    let digits = input.strip_prefix("0x").unwrap_or(input);
    u64::from_str_radix(digits, 16)
}

// Number of '=' characters a full progress track prints
const TRACK_WIDTH: usize = 50;

/// A struct representing a progress bar for progress printing on the command line.
pub struct ProgressBar {
    num_items: usize,
    current_items: usize,
    printed: usize,
}

impl ProgressBar {
    /// Creates a new progress bar for tracking progress of `num_items` steps.
    pub fn new(num_items: usize) -> ProgressBar {
        ProgressBar {
            num_items: num_items.max(1),
            current_items: 0,
            printed: 0,
        }
    }

    /// Increment the current progress of the bar. The progress bar prints if
    /// a new step was reached.
    #[inline(always)]
    pub fn increment(&mut self) {
        self.current_items += 1;
        let target = self.current_items * TRACK_WIDTH / self.num_items;

        while self.printed < target {
            print!("=");
            io::stdout().flush().expect("Could not flush stdout");
            self.printed += 1;
        }
    }
}

impl Drop for ProgressBar {
    fn drop(&mut self) {
        if self.printed > 0 {
            println!();
        }
    }
}
