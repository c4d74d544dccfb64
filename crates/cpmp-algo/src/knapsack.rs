//! 0/1 knapsack subproblem solvers.
//!
//! Pricing asks, once per candidate median, for the most profitable set of
//! locations whose total demand fits the median's remaining capacity.
//! Profits arrive already scaled to integers; they are `u128` so that large
//! duals divided by a tiny epsilon keep their relative order.
//!
//! Two solvers are shipped:
//!
//! - [`DynamicProgrammingKnapsack`]: exact DP over the capacity dimension
//! - [`MipKnapsack`]: the same problem as a binary program for HiGHS
//!   (feature `solver-highs`)

use cpmp_core::CpmpResult;
use serde::{Deserialize, Serialize};

/// Optimal item subset returned by a [`KnapsackSolver`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnapsackSolution {
    /// Indices into the input arrays, ascending.
    pub items: Vec<usize>,
    pub profit: u128,
    pub weight: u64,
}

impl KnapsackSolution {
    fn from_items(items: Vec<usize>, profits: &[u128], weights: &[u64]) -> Self {
        Self {
            profit: items.iter().map(|&i| profits[i]).sum(),
            weight: items.iter().map(|&i| weights[i]).sum(),
            items,
        }
    }
}

/// Exact 0/1 knapsack: maximise total profit with total weight at most
/// `capacity`.
pub trait KnapsackSolver {
    fn solve(&self, profits: &[u128], weights: &[u64], capacity: u64)
        -> CpmpResult<KnapsackSolution>;
}

/// Subproblem solver selected in the configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnapsackAlgorithm {
    #[default]
    DynamicProgramming,
    /// Binary program solved by HiGHS; needs the `solver-highs` feature.
    Mip,
}

impl KnapsackAlgorithm {
    pub fn is_available(self) -> bool {
        match self {
            KnapsackAlgorithm::DynamicProgramming => true,
            KnapsackAlgorithm::Mip => cfg!(feature = "solver-highs"),
        }
    }
}

/// Dynamic programming over the capacity dimension.
///
/// Runs in `O(n * C)` time and memory where `C` is the smaller of the
/// capacity and the total weight of the items that fit individually.
#[derive(Debug, Clone, Copy, Default)]
pub struct DynamicProgrammingKnapsack;

impl KnapsackSolver for DynamicProgrammingKnapsack {
    fn solve(
        &self,
        profits: &[u128],
        weights: &[u64],
        capacity: u64,
    ) -> CpmpResult<KnapsackSolution> {
        assert_eq!(profits.len(), weights.len());

        let candidates: Vec<usize> = (0..profits.len())
            .filter(|&i| weights[i] <= capacity && profits[i] > 0)
            .collect();
        let total_weight: u64 = candidates.iter().map(|&i| weights[i]).sum();

        // Everything fits: take all positive-profit items.
        if total_weight <= capacity {
            return Ok(KnapsackSolution::from_items(candidates, profits, weights));
        }

        let cap = total_weight.min(capacity) as usize;
        let width = cap + 1;
        let mut best = vec![0u128; width];
        let mut take = vec![false; candidates.len() * width];

        for (k, &item) in candidates.iter().enumerate() {
            let w = weights[item] as usize;
            let p = profits[item];
            let row = &mut take[k * width..(k + 1) * width];
            for c in (w..=cap).rev() {
                let with = best[c - w].saturating_add(p);
                if with > best[c] {
                    best[c] = with;
                    row[c] = true;
                }
            }
        }

        let mut items = Vec::new();
        let mut c = cap;
        for (k, &item) in candidates.iter().enumerate().rev() {
            if take[k * width + c] {
                items.push(item);
                c -= weights[item] as usize;
            }
        }
        items.reverse();

        Ok(KnapsackSolution::from_items(items, profits, weights))
    }
}

/// Knapsack as a binary program:
///
/// ```text
/// max  Σ p_i x_i
/// s.t. Σ w_i x_i ≤ C,   x ∈ {0,1}^n
/// ```
///
/// Profits are handed to HiGHS as `f64`, so ties closer than the float
/// resolution may be broken differently from the DP.
#[cfg(feature = "solver-highs")]
#[derive(Debug, Clone, Copy, Default)]
pub struct MipKnapsack;

#[cfg(feature = "solver-highs")]
impl KnapsackSolver for MipKnapsack {
    fn solve(
        &self,
        profits: &[u128],
        weights: &[u64],
        capacity: u64,
    ) -> CpmpResult<KnapsackSolution> {
        use good_lp::solvers::highs::highs;
        use good_lp::{constraint, variable, variables, Expression, Solution, SolverModel, Variable};

        assert_eq!(profits.len(), weights.len());
        let candidates: Vec<usize> = (0..profits.len())
            .filter(|&i| weights[i] <= capacity && profits[i] > 0)
            .collect();
        if candidates.is_empty() {
            return Ok(KnapsackSolution::default());
        }

        let mut vars = variables!();
        let pack: Vec<Variable> = candidates
            .iter()
            .map(|_| vars.add(variable().binary()))
            .collect();

        let mut objective = Expression::from(0.0);
        let mut load = Expression::from(0.0);
        for (&item, &x) in candidates.iter().zip(&pack) {
            objective += profits[item] as f64 * x;
            load += weights[item] as f64 * x;
        }

        let solution = vars
            .maximise(objective)
            .using(highs)
            .with(constraint!(load <= capacity as f64))
            .solve()
            .map_err(|e| cpmp_core::CpmpError::Solver(format!("knapsack MIP: {e:?}")))?;

        let items = candidates
            .iter()
            .zip(&pack)
            .filter(|&(_, &x)| solution.value(x) > 0.5)
            .map(|(&item, _)| item)
            .collect();
        Ok(KnapsackSolution::from_items(items, profits, weights))
    }
}
