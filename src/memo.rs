//! Memoized evaluation of the round function.

use fnv::FnvHashMap;

use crate::cipher::round_function;

/// A cache of round-function outputs keyed by input word.
///
/// Both search phases revisit the same inputs over and over, so all
/// their evaluations go through a cache. Entries are never evicted;
/// a single cache lives for the duration of an attack. Worker threads
/// run on clones that are merged back when they finish.
#[derive(Clone)]
pub struct RoundCache {
    table: FnvHashMap<u32, u32>,
}

impl RoundCache {
    /// Creates an empty cache.
    pub fn new() -> RoundCache {
        RoundCache {
            table: FnvHashMap::default(),
        }
    }

    /// Returns the round function of `input`, computing and storing it
    /// on first sight.
    #[inline(always)]
    pub fn evaluate(&mut self, input: u32) -> u32 {
        *self
            .table
            .entry(input)
            .or_insert_with(|| round_function(input))
    }

    /// Returns the number of distinct inputs evaluated so far.
    pub fn size(&self) -> usize {
        self.table.len()
    }

    /// Absorbs all entries of another cache.
    pub fn merge(&mut self, other: RoundCache) {
        self.table.extend(other.table);
    }
}

impl Default for RoundCache {
    fn default() -> Self {
        RoundCache::new()
    }
}
