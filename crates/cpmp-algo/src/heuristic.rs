//! Greedy rounding of a master LP solution.
//!
//! Positive pattern columns are taken by decreasing LP value (cheaper first
//! on ties) whenever their median is still unused and none of their
//! locations is covered yet. If every location ends up covered with at most
//! `p` clusters, the selection is a feasible clustering.
//!
//! On instances with tied optimal columns an interior-point master returns
//! split values; rounding recovers the integral optimum without branching.

use cpmp_core::Pattern;

use crate::context::MasterContext;
use crate::master::MasterLp;

/// Feasible clustering read off the LP solution, if the greedy pass finds one.
pub fn round_lp_solution(ctx: &MasterContext<'_>, lp: &dyn MasterLp) -> Option<Vec<Pattern>> {
    let tol = ctx.tolerances;
    let n = ctx.nlocations();

    let mut candidates: Vec<(&Pattern, f64)> = ctx
        .master
        .values(lp)
        .filter(|(pv, value)| {
            tol.is_feas_positive(*value) && !tol.is_feas_zero(lp.ub_local(pv.var))
        })
        .map(|(pv, value)| (&pv.pattern, value))
        .collect();
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cost().cmp(&b.0.cost())));

    let mut covered = vec![false; n];
    let mut used = vec![false; n];
    let mut ncovered = 0;
    let mut chosen = Vec::new();

    for (pattern, _) in candidates {
        if chosen.len() == ctx.instance.nclusters() || ncovered == n {
            break;
        }
        if used[pattern.median()] || pattern.locations().iter().any(|&l| covered[l]) {
            continue;
        }
        used[pattern.median()] = true;
        for &l in pattern.locations() {
            covered[l] = true;
        }
        ncovered += pattern.len();
        chosen.push(pattern.clone());
    }

    if ncovered < n {
        return None;
    }
    chosen.sort_by_key(|p| p.median());
    Some(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::master::VarKind;
    use crate::testing::RecordingLp;
    use cpmp_core::{Instance, Tolerances};

    fn four() -> Instance {
        Instance::new(
            2,
            vec![
                vec![0, 1, 4, 4],
                vec![1, 0, 3, 5],
                vec![4, 3, 0, 1],
                vec![4, 5, 1, 0],
            ],
            vec![1; 4],
            vec![2; 4],
        )
        .unwrap()
    }

    fn add(
        ctx: &mut MasterContext<'_>,
        lp: &mut RecordingLp,
        median: usize,
        locs: &[usize],
        value: f64,
    ) {
        let pattern = Pattern::new(ctx.instance, median, locs.to_vec());
        let var = ctx.master.add_pattern(lp, pattern).unwrap().unwrap();
        lp.set_value(var, value);
    }

    #[test]
    fn test_split_tied_columns_round_to_optimum() {
        let inst = four();
        let mut ctx = MasterContext::new(&inst, VarKind::Binary, Tolerances::default());
        let mut lp = RecordingLp::default();
        add(&mut ctx, &mut lp, 0, &[0, 1], 0.5);
        add(&mut ctx, &mut lp, 1, &[0, 1], 0.5);
        add(&mut ctx, &mut lp, 2, &[2, 3], 0.5);
        add(&mut ctx, &mut lp, 3, &[2, 3], 0.5);
        add(&mut ctx, &mut lp, 0, &[0], 1e-9);

        let clusters = round_lp_solution(&ctx, &lp).unwrap();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters.iter().map(|c| c.cost()).sum::<u64>(), 2);
        assert_eq!(clusters[0].locations(), &[0, 1]);
        assert_eq!(clusters[1].locations(), &[2, 3]);
    }

    #[test]
    fn test_overlaps_are_skipped_and_partial_cover_rejected() {
        let inst = four();
        let mut ctx = MasterContext::new(&inst, VarKind::Binary, Tolerances::default());
        let mut lp = RecordingLp::default();
        add(&mut ctx, &mut lp, 0, &[0, 1], 0.5);
        add(&mut ctx, &mut lp, 1, &[1, 2], 0.5);
        add(&mut ctx, &mut lp, 3, &[2, 3], 0.5);
        add(&mut ctx, &mut lp, 2, &[0, 2], 0.5);

        // Equal values: the two cheapest columns are disjoint and win.
        let clusters = round_lp_solution(&ctx, &lp).unwrap();
        assert_eq!(clusters.len(), 2);

        // With a single cluster allowed nothing covers all four locations.
        let single = Instance::new(1, inst.distances().to_vec(), vec![1; 4], vec![2; 4]).unwrap();
        let mut ctx = MasterContext::new(&single, VarKind::Binary, Tolerances::default());
        let mut lp = RecordingLp::default();
        add(&mut ctx, &mut lp, 0, &[0, 1], 0.5);
        add(&mut ctx, &mut lp, 3, &[2, 3], 0.5);
        assert!(round_lp_solution(&ctx, &lp).is_none());
    }
}
