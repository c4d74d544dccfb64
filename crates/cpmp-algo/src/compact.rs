//! LP relaxation of the compact assignment formulation.
//!
//! ```text
//! min  Σ_{l,m} d(l,m) y_lm
//! s.t. Σ_m y_lm = 1                      ∀ l
//!      Σ_l q_l y_lm ≤ Q_m z_m            ∀ m
//!      y_lm ≤ z_m                        ∀ l, m
//!      y_mm = z_m                        ∀ m
//!      Σ_m z_m ≤ p
//!      0 ≤ y, z ≤ 1
//! ```
//!
//! Its optimum is a lower bound on the CPMP optimum and never exceeds the
//! root bound of the column generation master, which makes it a cheap sanity
//! check for the branch-and-price root.

use good_lp::solvers::clarabel::clarabel;
use good_lp::{constraint, variable, variables, Expression, Solution, SolverModel, Variable};
use serde::Serialize;
use tracing::debug;
use web_time::Instant;

use cpmp_core::{CpmpError, CpmpResult, Instance};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompactBound {
    pub objective: f64,
    /// Opening value `z_m` of every median.
    pub openings: Vec<f64>,
    pub solve_time_ms: u64,
}

/// Solve the compact LP relaxation of `instance`.
pub fn compact_lp_bound(instance: &Instance) -> CpmpResult<CompactBound> {
    let start = Instant::now();
    let n = instance.nlocations();

    let mut vars = variables!();
    let open: Vec<Variable> = (0..n)
        .map(|_| vars.add(variable().min(0.0).max(1.0)))
        .collect();
    let assign: Vec<Vec<Variable>> = (0..n)
        .map(|_| (0..n).map(|_| vars.add(variable().min(0.0).max(1.0))).collect())
        .collect();

    let mut cost = Expression::from(0.0);
    for (location, row) in assign.iter().enumerate() {
        for (median, &y) in row.iter().enumerate() {
            cost += instance.distance(location, median) as f64 * y;
        }
    }

    let mut model = vars.minimise(cost).using(clarabel);

    for row in &assign {
        let served: Expression = row.iter().copied().sum();
        model = model.with(constraint!(served == 1.0));
    }
    for (median, &z) in open.iter().enumerate() {
        let mut load = Expression::from(0.0);
        for (location, row) in assign.iter().enumerate() {
            load += instance.demand(location) as f64 * row[median];
            model = model.with(constraint!(row[median] <= z));
        }
        let capacity = instance.capacity(median) as f64;
        model = model.with(constraint!(load <= capacity * z));
        model = model.with(constraint!(assign[median][median] == z));
    }
    let opened: Expression = open.iter().copied().sum();
    model = model.with(constraint!(opened <= instance.nclusters() as f64));

    let solution = model
        .solve()
        .map_err(|e| CpmpError::Solver(format!("compact LP: {e:?}")))?;

    let objective = (0..n)
        .flat_map(|l| (0..n).map(move |m| (l, m)))
        .map(|(l, m)| instance.distance(l, m) as f64 * solution.value(assign[l][m]))
        .sum();
    let openings = open.iter().map(|&z| solution.value(z)).collect();

    let solve_time_ms = start.elapsed().as_millis() as u64;
    debug!(objective, solve_time_ms, "compact LP bound");
    Ok(CompactBound {
        objective,
        openings,
        solve_time_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_pairs() {
        let inst = Instance::new(
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
        .unwrap();
        let bound = compact_lp_bound(&inst).unwrap();
        assert!(bound.objective <= 2.0 + 1e-6);
        assert!(bound.objective >= -1e-6);
        let opened: f64 = bound.openings.iter().sum();
        assert!(opened <= 2.0 + 1e-6);
    }

    #[test]
    fn test_single_location() {
        let inst = Instance::new(1, vec![vec![0]], vec![3], vec![3]).unwrap();
        let bound = compact_lp_bound(&inst).unwrap();
        assert!(bound.objective.abs() < 1e-6);
        assert!((bound.openings[0] - 1.0).abs() < 1e-5);
    }
}
