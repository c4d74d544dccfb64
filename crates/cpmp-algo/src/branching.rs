//! Semi-assignment branching.
//!
//! Branching on a single pattern variable does not work with column
//! generation: the `x_P = 0` branch cannot stop pricing from generating `P`
//! again. Instead we look at the aggregated assignment of location `i` to
//! median `j`,
//!
//! ```text
//! a_ij = Σ_{P : med(P)=j, i ∈ P} x_P
//! ```
//!
//! pick a location whose assignments are fractional, and split its medians
//! between two children. Each child forbids `i` from its half of the medians,
//! which pricing respects through the forbidden-assignment registry.
//!
//! Selection:
//! 1. the location with the most fractional `a_ij` wins;
//! 2. ties go to the location whose even-ranked fractional assignments (by
//!    non-increasing value) come closest to half of its total fractional
//!    assignment. This is a balance heuristic, later ties win.

use tracing::debug;

use crate::context::MasterContext;
use crate::master::MasterLp;
use crate::propagation::SemiassignCons;
use crate::traits::BranchRule;
use crate::tree::{NodeId, SearchTree};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchResult {
    /// Every location is integrally assigned.
    DidNotFind,
    Branched {
        location: usize,
        left: NodeId,
        right: NodeId,
    },
}

/// Aggregated assignment values, `[location][median]`.
pub fn compute_assignments(ctx: &MasterContext<'_>, lp: &dyn MasterLp) -> Vec<Vec<f64>> {
    let n = ctx.nlocations();
    let mut assignments = vec![vec![0.0; n]; n];
    for (pv, value) in ctx.master.values(lp) {
        let median = pv.pattern.median();
        for &location in pv.pattern.locations() {
            assignments[location][median] += value;
        }
    }
    assignments
}

/// Medians by non-increasing assignment value, ties by ascending index.
pub fn sort_medians(assignments: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..assignments.len()).collect();
    order.sort_by(|&a, &b| {
        assignments[b]
            .total_cmp(&assignments[a])
            .then_with(|| a.cmp(&b))
    });
    order
}

/// Location to branch on, `None` if all assignments are integral.
pub fn choose_location(
    ctx: &MasterContext<'_>,
    assignments: &[Vec<f64>],
    sorted: &[Vec<usize>],
) -> Option<usize> {
    let tol = ctx.tolerances;
    let mut chosen = None;
    let mut max_nfrac = 0;
    let mut min_diff = f64::INFINITY;

    for (location, order) in sorted.iter().enumerate() {
        let mut nfrac = 0;
        let mut total = 0.0;
        let mut half = 0.0;
        for (rank, &median) in order.iter().enumerate() {
            let value = assignments[location][median];
            if tol.is_feas_integral(value) {
                continue;
            }
            nfrac += 1;
            total += value;
            if rank % 2 == 0 {
                half += value;
            }
        }
        if nfrac == 0 {
            continue;
        }

        let diff = (half - 0.5 * total).abs();
        if nfrac > max_nfrac || (nfrac == max_nfrac && tol.is_feas_le(diff, min_diff)) {
            chosen = Some(location);
            max_nfrac = nfrac;
            min_diff = diff;
        }
    }
    chosen
}

/// Forbidden masks `(left, right)` for branching on `location`.
///
/// Medians already forbidden at this node are skipped; the remaining ones
/// alternate, even positions to the right child and odd positions to the
/// left child.
pub fn split_medians(
    ctx: &MasterContext<'_>,
    location: usize,
    values: &[f64],
    order: &[usize],
) -> (Vec<bool>, Vec<bool>) {
    let tol = ctx.tolerances;
    let n = ctx.nlocations();
    let mut left = vec![false; n];
    let mut right = vec![false; n];

    let nfrac = values.iter().filter(|&&v| !tol.is_feas_integral(v)).count();
    assert!(nfrac > 0, "branching on location {location} without fractional medians");

    let mut position = 0;
    for &median in order {
        let value = values[median];
        assert!(
            !tol.is_feas_integral(value) || tol.is_feas_zero(value),
            "location {location} is fully assigned to median {median} next to fractional medians"
        );
        if ctx.forbidden.is_forbidden(median, location) {
            continue;
        }
        if position % 2 == 0 {
            right[median] = true;
        } else {
            left[median] = true;
        }
        position += 1;
    }
    (left, right)
}

/// Branching rule creating two children per fractional location.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemiassignBranching;

impl SemiassignBranching {
    fn perform_branching(
        &self,
        ctx: &MasterContext<'_>,
        tree: &mut dyn SearchTree,
        location: usize,
        values: &[f64],
        order: &[usize],
        estimate: f64,
    ) -> BranchResult {
        let (left_forbidden, right_forbidden) = split_medians(ctx, location, values, order);

        let left = tree.create_child(estimate);
        tree.add_cons_node(left, SemiassignCons::new(location, left_forbidden, left));
        let right = tree.create_child(estimate);
        tree.add_cons_node(right, SemiassignCons::new(location, right_forbidden, right));

        debug!(location, %left, %right, "semi-assignment branching");
        BranchResult::Branched {
            location,
            left,
            right,
        }
    }

    /// Branch using `estimate` as the children's lower bound.
    pub fn branch_with_estimate(
        &self,
        ctx: &MasterContext<'_>,
        lp: &dyn MasterLp,
        tree: &mut dyn SearchTree,
        estimate: f64,
    ) -> BranchResult {
        let assignments = compute_assignments(ctx, lp);
        let sorted: Vec<Vec<usize>> = assignments.iter().map(|a| sort_medians(a)).collect();

        match choose_location(ctx, &assignments, &sorted) {
            None => BranchResult::DidNotFind,
            Some(location) => self.perform_branching(
                ctx,
                tree,
                location,
                &assignments[location],
                &sorted[location],
                estimate,
            ),
        }
    }
}

impl BranchRule for SemiassignBranching {
    fn branch(
        &mut self,
        ctx: &MasterContext<'_>,
        lp: &dyn MasterLp,
        tree: &mut dyn SearchTree,
    ) -> BranchResult {
        self.branch_with_estimate(ctx, lp, tree, f64::NEG_INFINITY)
    }
}
