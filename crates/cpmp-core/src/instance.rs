//! CPMP instance data.
//!
//! An instance is a square distance matrix together with one demand and one
//! capacity per location and the maximum number of clusters `p`. Every
//! location may serve as a median, so the same index space is used for both
//! roles. `distance(l, m)` is the cost of assigning location `l` to median
//! `m`; the matrix does not need to be symmetric.

use serde::Serialize;

use crate::error::{CpmpError, CpmpResult};

/// A validated Capacitated P-Median instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instance {
    nclusters: usize,
    /// Row = location, column = median.
    distances: Vec<Vec<u64>>,
    demands: Vec<u64>,
    capacities: Vec<u64>,
}

impl Instance {
    /// Build an instance, checking that all blocks agree on the number of
    /// locations and that `1 <= nclusters <= nlocations`.
    pub fn new(
        nclusters: usize,
        distances: Vec<Vec<u64>>,
        demands: Vec<u64>,
        capacities: Vec<u64>,
    ) -> CpmpResult<Self> {
        let n = distances.len();
        if n == 0 {
            return Err(CpmpError::Validation(
                "instance must contain at least one location".into(),
            ));
        }
        if let Some((row, len)) = distances
            .iter()
            .enumerate()
            .map(|(i, r)| (i, r.len()))
            .find(|&(_, len)| len != n)
        {
            return Err(CpmpError::Validation(format!(
                "distance row {row} has {len} entries, expected {n}"
            )));
        }
        if demands.len() != n {
            return Err(CpmpError::Validation(format!(
                "expected {n} demands, got {}",
                demands.len()
            )));
        }
        if capacities.len() != n {
            return Err(CpmpError::Validation(format!(
                "expected {n} capacities, got {}",
                capacities.len()
            )));
        }
        if nclusters == 0 || nclusters > n {
            return Err(CpmpError::Validation(format!(
                "number of clusters must be in 1..={n}, got {nclusters}"
            )));
        }

        Ok(Self {
            nclusters,
            distances,
            demands,
            capacities,
        })
    }

    pub fn nlocations(&self) -> usize {
        self.distances.len()
    }

    /// Maximum number of clusters (the `p` in p-median).
    pub fn nclusters(&self) -> usize {
        self.nclusters
    }

    /// Cost of assigning `location` to `median`.
    #[inline]
    pub fn distance(&self, location: usize, median: usize) -> u64 {
        self.distances[location][median]
    }

    #[inline]
    pub fn demand(&self, location: usize) -> u64 {
        self.demands[location]
    }

    #[inline]
    pub fn capacity(&self, median: usize) -> u64 {
        self.capacities[median]
    }

    pub fn distances(&self) -> &[Vec<u64>] {
        &self.distances
    }

    pub fn demands(&self) -> &[u64] {
        &self.demands
    }

    pub fn capacities(&self) -> &[u64] {
        &self.capacities
    }

    pub fn total_demand(&self) -> u64 {
        self.demands.iter().sum()
    }

    /// Sum of the `nclusters` largest capacities. If this is below the total
    /// demand no feasible clustering exists.
    pub fn best_case_capacity(&self) -> u64 {
        let mut caps = self.capacities.clone();
        caps.sort_unstable_by(|a, b| b.cmp(a));
        caps.iter().take(self.nclusters).sum()
    }

    /// Upper bound on the cost of any assignment: every location sent to its
    /// farthest median.
    pub fn worst_case_cost(&self) -> u64 {
        self.distances
            .iter()
            .map(|row| row.iter().copied().max().unwrap_or(0))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_locations() -> Instance {
        Instance::new(
            2,
            vec![vec![0, 2, 7], vec![2, 0, 5], vec![7, 5, 0]],
            vec![3, 1, 2],
            vec![4, 4, 3],
        )
        .unwrap()
    }

    #[test]
    fn test_accessors() {
        let inst = three_locations();
        assert_eq!(inst.nlocations(), 3);
        assert_eq!(inst.nclusters(), 2);
        assert_eq!(inst.distance(0, 2), 7);
        assert_eq!(inst.demand(0), 3);
        assert_eq!(inst.capacity(2), 3);
        assert_eq!(inst.total_demand(), 6);
    }

    #[test]
    fn test_capacity_and_cost_bounds() {
        let inst = three_locations();
        assert_eq!(inst.best_case_capacity(), 8);
        assert_eq!(inst.worst_case_cost(), 7 + 5 + 7);
    }

    #[test]
    fn test_rejects_ragged_distances() {
        let err = Instance::new(1, vec![vec![0, 1], vec![1]], vec![1, 1], vec![2, 2]);
        assert!(matches!(err, Err(CpmpError::Validation(_))));
    }

    #[test]
    fn test_rejects_bad_cluster_count() {
        let dist = vec![vec![0, 1], vec![1, 0]];
        assert!(Instance::new(0, dist.clone(), vec![1, 1], vec![2, 2]).is_err());
        assert!(Instance::new(3, dist, vec![1, 1], vec![2, 2]).is_err());
    }

    #[test]
    fn test_rejects_mismatched_demands() {
        let err = Instance::new(1, vec![vec![0]], vec![1, 2], vec![3]);
        assert!(err.unwrap_err().to_string().contains("demands"));
    }
}
