//! Forbidden (median, location) assignments.
//!
//! Branching constraints forbid a location from being served by some
//! medians inside their subtree. Nested nodes may forbid the same pair, so
//! each pair carries the number of active constraints forbidding it rather
//! than a flag; the pair is allowed again only when the last of them is
//! deactivated, whatever the order.

/// Reference-counted forbidding matrix indexed `[median][location]`.
#[derive(Debug, Clone)]
pub struct ForbiddenAssignments {
    nlocations: usize,
    counts: Vec<u32>,
}

impl ForbiddenAssignments {
    pub fn new(nlocations: usize) -> Self {
        Self {
            nlocations,
            counts: vec![0; nlocations * nlocations],
        }
    }

    pub fn nlocations(&self) -> usize {
        self.nlocations
    }

    #[inline]
    fn slot(&self, median: usize, location: usize) -> usize {
        assert!(median < self.nlocations && location < self.nlocations);
        median * self.nlocations + location
    }

    #[inline]
    pub fn is_forbidden(&self, median: usize, location: usize) -> bool {
        self.counts[self.slot(median, location)] > 0
    }

    /// Number of active constraints forbidding the pair.
    pub fn count(&self, median: usize, location: usize) -> u32 {
        self.counts[self.slot(median, location)]
    }

    pub fn forbid(&mut self, median: usize, location: usize) {
        let slot = self.slot(median, location);
        self.counts[slot] += 1;
    }

    /// Release one forbidding of the pair.
    ///
    /// # Panics
    ///
    /// Panics if the pair is not currently forbidden; that means activation
    /// and deactivation calls are unbalanced.
    pub fn allow(&mut self, median: usize, location: usize) {
        let slot = self.slot(median, location);
        assert!(
            self.counts[slot] > 0,
            "allowing assignment of location {location} to median {median} which is not forbidden"
        );
        self.counts[slot] -= 1;
    }

    /// Forbid `location` for every median flagged in `forbidden`.
    pub fn forbid_assignments(&mut self, location: usize, forbidden: &[bool]) {
        assert_eq!(forbidden.len(), self.nlocations);
        for median in flagged(forbidden) {
            self.forbid(median, location);
        }
    }

    /// Undo [`Self::forbid_assignments`] for the same arguments.
    pub fn allow_assignments(&mut self, location: usize, forbidden: &[bool]) {
        assert_eq!(forbidden.len(), self.nlocations);
        for median in flagged(forbidden) {
            self.allow(median, location);
        }
    }

    /// Medians currently forbidden for `location`.
    pub fn forbidden_medians(&self, location: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.nlocations).filter(move |&m| self.is_forbidden(m, location))
    }

    /// True if no pair is forbidden, i.e. no branching constraint is active.
    pub fn is_clear(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }
}

fn flagged(mask: &[bool]) -> impl Iterator<Item = usize> + '_ {
    mask.iter()
        .enumerate()
        .filter_map(|(i, &set)| set.then_some(i))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbid_and_allow_pair() {
        let mut reg = ForbiddenAssignments::new(3);
        assert!(!reg.is_forbidden(1, 2));
        reg.forbid(1, 2);
        assert!(reg.is_forbidden(1, 2));
        assert!(!reg.is_forbidden(2, 1));
        reg.allow(1, 2);
        assert!(reg.is_clear());
    }

    #[test]
    fn test_nested_forbids_survive_out_of_order_release() {
        let mut reg = ForbiddenAssignments::new(4);
        let outer = [true, false, true, false];
        let inner = [true, true, false, false];

        reg.forbid_assignments(3, &outer);
        reg.forbid_assignments(3, &inner);
        assert_eq!(reg.count(0, 3), 2);

        // Release the outer one first: median 0 is still forbidden by the inner.
        reg.allow_assignments(3, &outer);
        assert!(reg.is_forbidden(0, 3));
        assert!(reg.is_forbidden(1, 3));
        assert!(!reg.is_forbidden(2, 3));

        reg.allow_assignments(3, &inner);
        assert!(reg.is_clear());
    }

    #[test]
    fn test_forbidden_medians_lists_location_column() {
        let mut reg = ForbiddenAssignments::new(4);
        reg.forbid_assignments(1, &[false, true, false, true]);
        reg.forbid(2, 0);
        assert_eq!(reg.forbidden_medians(1).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(reg.forbidden_medians(0).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    #[should_panic(expected = "not forbidden")]
    fn test_unbalanced_allow_panics() {
        let mut reg = ForbiddenAssignments::new(2);
        reg.allow(0, 1);
    }
}
