//! Cross-pair intersection of the per-pair candidate maps.

use indexmap::IndexMap;

/// Keeps only the candidates present in every per-pair map, each mapped
/// to the number of maps it appeared in. Survivors of the intersection
/// therefore always carry a count equal to the number of maps.
///
/// Returned in ascending candidate order. An empty result means no
/// candidate was consistent with every pair.
///
/// # Panics
/// Panics if `maps` is empty.
pub fn intersect_counts(maps: &[IndexMap<u32, usize>]) -> IndexMap<u32, usize> {
    assert!(!maps.is_empty(), "At least one candidate map is required");

    let mut support: IndexMap<u32, usize> = IndexMap::new();

    for map in maps {
        for &candidate in map.keys() {
            *support.entry(candidate).or_insert(0) += 1;
        }
    }

    support.retain(|_, count| *count == maps.len());
    support.sort_keys();
    support
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(entries: &[(u32, usize)]) -> IndexMap<u32, usize> {
        entries.iter().cloned().collect()
    }

    #[test]
    fn keeps_only_common_candidates() {
        let maps = [
            counts(&[(0xaa, 1), (0xbb, 2), (0xcc, 1)]),
            counts(&[(0xaa, 3), (0xcc, 1)]),
            counts(&[(0xaa, 1), (0xbb, 1), (0xcc, 2)]),
        ];

        assert_eq!(intersect_counts(&maps), counts(&[(0xaa, 3), (0xcc, 3)]));
    }

    #[test]
    fn counts_the_maps_not_their_entries() {
        let maps = [counts(&[(0x01, 5), (0x02, 1)])];

        assert_eq!(intersect_counts(&maps), counts(&[(0x01, 1), (0x02, 1)]));
    }

    #[test]
    fn one_empty_map_empties_the_intersection() {
        let maps = [counts(&[(0x01, 1), (0x02, 1)]), counts(&[])];

        assert!(intersect_counts(&maps).is_empty());
    }

    #[test]
    fn result_is_sorted_ascending() {
        let maps = [
            counts(&[(0x30, 1), (0x10, 1), (0x20, 1)]),
            counts(&[(0x20, 1), (0x30, 1), (0x10, 1)]),
        ];
        let result = intersect_counts(&maps);
        let keys: Vec<u32> = result.keys().cloned().collect();

        assert_eq!(keys, vec![0x10, 0x20, 0x30]);
    }

    #[test]
    #[should_panic]
    fn zero_maps_violate_the_precondition() {
        intersect_counts(&[]);
    }
}
