//! Column generation for the CPMP master.
//!
//! Every median yields one pricing subproblem: pick locations not forbidden
//! for it, within its capacity, maximising the dual profit. That is a 0/1
//! knapsack.
//!
//! ```text
//! reduced cost of cluster (S, m):
//!     Σ_{l∈S} (π_l + d(l,m))  −  μ  −  ν_m
//!
//!   π_l ≤ 0   dual of the assignment row of l
//!   μ   ≤ 0   dual of the p-median row
//!   ν_m ≤ 0   dual of the convexity row of m
//!
//! profit of l  =  −π_l − d(l,m)        (Farkas: −π_l from the ray)
//! ```
//!
//! An open median serves itself: the median is always part of its cluster
//! and only the capacity left after its own demand goes to the knapsack. A
//! median that cannot serve itself (forbidden at this node, or its demand
//! exceeds its capacity) yields no subproblem.
//!
//! Only other locations with positive profit enter the knapsack. Profits
//! are scaled by `1/epsilon` and rounded up to `u128` integers; the decision
//! to add a column is taken on the unscaled score.

use tracing::{debug, trace};

use cpmp_core::{CpmpResult, Pattern};

use crate::context::MasterContext;
use crate::knapsack::{DynamicProgrammingKnapsack, KnapsackSolver};
use crate::master::{MasterLp, MasterRow, VarId};
use crate::traits::Pricer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricingMode {
    /// The last LP was optimal: price with its duals.
    ReducedCost,
    /// The last LP was infeasible: price with its Farkas multipliers.
    Farkas,
}

/// Columns found in one pricing round.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PricingOutcome {
    pub added: Vec<VarId>,
    /// Most negative score over all medians, `None` if no median could
    /// open.
    pub best_score: Option<f64>,
}

impl PricingOutcome {
    pub fn found_columns(&self) -> bool {
        !self.added.is_empty()
    }
}

/// Profit of serving `location` from `median`.
fn location_profit(
    ctx: &MasterContext<'_>,
    lp: &dyn MasterLp,
    mode: PricingMode,
    location: usize,
    median: usize,
) -> f64 {
    let row = MasterRow::Assignment(location);
    match mode {
        PricingMode::ReducedCost => {
            -lp.dual(row) - ctx.instance.distance(location, median) as f64
        }
        PricingMode::Farkas => -lp.farkas(row),
    }
}

/// Reduced cost (or Farkas score) of serving `locations` from `median`.
pub fn column_score(
    ctx: &MasterContext<'_>,
    lp: &dyn MasterLp,
    mode: PricingMode,
    median: usize,
    locations: &[usize],
) -> f64 {
    match mode {
        PricingMode::ReducedCost => {
            let served: f64 = locations
                .iter()
                .map(|&l| {
                    lp.dual(MasterRow::Assignment(l))
                        + ctx.instance.distance(l, median) as f64
                })
                .sum();
            served - lp.dual(MasterRow::PMedian) - lp.dual(MasterRow::Convexity(median))
        }
        PricingMode::Farkas => {
            let served: f64 = locations
                .iter()
                .map(|&l| lp.farkas(MasterRow::Assignment(l)))
                .sum();
            served - lp.farkas(MasterRow::PMedian) - lp.farkas(MasterRow::Convexity(median))
        }
    }
}

/// Knapsack-based pricer.
#[derive(Debug, Clone, Default)]
pub struct CpmpPricer<K = DynamicProgrammingKnapsack> {
    knapsack: K,
}

impl<K: KnapsackSolver> CpmpPricer<K> {
    pub fn new(knapsack: K) -> Self {
        Self { knapsack }
    }

    /// Solve the subproblem of one median. Returns the cluster, median
    /// included, or `None` if the median cannot open at this node.
    fn solve_median(
        &self,
        ctx: &MasterContext<'_>,
        lp: &dyn MasterLp,
        mode: PricingMode,
        median: usize,
    ) -> CpmpResult<Option<Vec<usize>>> {
        let instance = ctx.instance;
        if ctx.forbidden.is_forbidden(median, median)
            || instance.demand(median) > instance.capacity(median)
        {
            return Ok(None);
        }
        let residual = instance.capacity(median) - instance.demand(median);

        let eps = ctx.tolerances.epsilon;
        let mut items = Vec::new();
        let mut profits = Vec::new();
        let mut weights = Vec::new();

        for location in 0..ctx.nlocations() {
            if location == median || ctx.forbidden.is_forbidden(median, location) {
                continue;
            }
            let profit = location_profit(ctx, lp, mode, location, median);
            if profit <= 0.0 {
                continue;
            }
            items.push(location);
            profits.push((profit / eps).ceil() as u128);
            weights.push(instance.demand(location));
        }

        let mut cluster = vec![median];
        if !items.is_empty() {
            let solution = self.knapsack.solve(&profits, &weights, residual)?;
            cluster.extend(solution.items.into_iter().map(|i| items[i]));
        }
        Ok(Some(cluster))
    }
}

impl<K: KnapsackSolver> Pricer for CpmpPricer<K> {
    fn price(
        &mut self,
        ctx: &mut MasterContext<'_>,
        lp: &mut dyn MasterLp,
        mode: PricingMode,
    ) -> CpmpResult<PricingOutcome> {
        let mut outcome = PricingOutcome::default();

        for median in 0..ctx.nlocations() {
            let Some(locations) = self.solve_median(ctx, lp, mode, median)? else {
                trace!(median, "median cannot open");
                continue;
            };

            let score = column_score(ctx, lp, mode, median, &locations);
            outcome.best_score = Some(outcome.best_score.map_or(score, |b: f64| b.min(score)));
            if !ctx.tolerances.is_improving(score) {
                trace!(median, score, "no improving cluster");
                continue;
            }

            let pattern = Pattern::new(ctx.instance, median, locations);
            debug_assert!(pattern.respects_capacity(ctx.instance));
            match ctx.master.add_pattern(lp, pattern)? {
                Some(var) => {
                    let pv = ctx.master.get(ctx.master.len() - 1);
                    debug!(
                        var = %pv.name,
                        ?mode,
                        score,
                        cost = pv.pattern.cost(),
                        locations = ?pv.pattern.locations(),
                        "added column"
                    );
                    outcome.added.push(var);
                }
                None => trace!(median, score, "cluster already in master"),
            }
        }

        Ok(outcome)
    }
}
