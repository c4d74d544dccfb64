//! Cluster patterns.
//!
//! A [`Pattern`] is one candidate cluster of the Dantzig-Wolfe master
//! problem: a median plus the set of locations it serves. An open median
//! always serves itself, so the median is part of its own location set.
//! Patterns are immutable once built; their location set is kept sorted so
//! membership tests are a binary search.

use serde::{Deserialize, Serialize};

use crate::instance::Instance;

/// A median together with the locations assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pattern {
    median: usize,
    locations: Vec<usize>,
    cost: u64,
}

impl Pattern {
    /// Build a pattern for `median`; the cost is derived from the instance.
    /// The median is added to `locations` if missing.
    pub fn new(instance: &Instance, median: usize, mut locations: Vec<usize>) -> Self {
        locations.push(median);
        locations.sort_unstable();
        locations.dedup();
        let cost = locations
            .iter()
            .map(|&l| instance.distance(l, median))
            .sum();
        Self {
            median,
            locations,
            cost,
        }
    }

    pub fn median(&self) -> usize {
        self.median
    }

    /// Sorted location indices.
    pub fn locations(&self) -> &[usize] {
        &self.locations
    }

    /// Sum of distances from each member to the median.
    pub fn cost(&self) -> u64 {
        self.cost
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    #[inline]
    pub fn contains(&self, location: usize) -> bool {
        self.locations.binary_search(&location).is_ok()
    }

    /// Total demand served by this cluster.
    pub fn load(&self, instance: &Instance) -> u64 {
        self.locations.iter().map(|&l| instance.demand(l)).sum()
    }

    /// True if the load fits the median's capacity.
    pub fn respects_capacity(&self, instance: &Instance) -> bool {
        self.load(instance) <= instance.capacity(self.median)
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "median {} <- {:?} (cost {})", self.median, self.locations, self.cost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance() -> Instance {
        Instance::new(
            2,
            vec![vec![0, 2, 7], vec![2, 0, 5], vec![7, 5, 0]],
            vec![3, 1, 2],
            vec![4, 4, 3],
        )
        .unwrap()
    }

    #[test]
    fn test_cost_is_sum_of_distances_to_median() {
        let inst = instance();
        let p = Pattern::new(&inst, 1, vec![2, 0, 1]);
        assert_eq!(p.locations(), &[0, 1, 2]);
        assert_eq!(p.cost(), 2 + 0 + 5);
        assert!(p.contains(2));
    }

    #[test]
    fn test_capacity_check() {
        let inst = instance();
        assert!(Pattern::new(&inst, 0, vec![0, 1]).respects_capacity(&inst));
        assert!(!Pattern::new(&inst, 2, vec![0, 2]).respects_capacity(&inst));
    }

    #[test]
    fn test_median_serves_itself() {
        let inst = instance();
        let p = Pattern::new(&inst, 2, vec![1]);
        assert_eq!(p.locations(), &[1, 2]);
        assert_eq!(p.cost(), 5);
        assert_eq!(p.load(&inst), 3);

        let alone = Pattern::new(&inst, 0, Vec::new());
        assert_eq!(alone.locations(), &[0]);
        assert_eq!(alone.cost(), 0);
    }
}
