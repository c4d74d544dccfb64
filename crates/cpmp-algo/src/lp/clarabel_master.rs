//! Restricted master LP on top of Clarabel.
//!
//! Clarabel solves conic programs in the form
//!
//! ```text
//! minimize    (1/2)x'Px + q'x
//! subject to  Ax + s = b,   s ∈ K
//! ```
//!
//! The master is a pure LP, so `P = 0` and `K` is a single nonnegative
//! cone. Rows are laid out as
//!
//! ```text
//! [0, n)          assignment rows      -Σ x_P ≤ -1
//! [n, 2n)         convexity rows        Σ x_P ≤  1
//! 2n              p-median row          Σ x_P ≤  p
//! 2n+1 ..         bound rows            x_j ≤ ub_j,  -x_j ≤ -lb_j
//! ```
//!
//! Clarabel's dual `z ≥ 0` satisfies `q + A'z = 0`, so the dual of a `≤` row
//! in minimisation convention is `-z`. When the LP is primal infeasible the
//! returned `z` is a certificate (`A'z = 0`, `b'z < 0`); its negation is
//! served as the Farkas multipliers.
//!
//! The matrix is rebuilt on every solve. Interior-point solutions are not
//! vertices: tied optimal columns can come back with split values.

use clarabel::algebra::CscMatrix;
use clarabel::solver::{
    DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus, SupportedConeT,
};
use tracing::{debug, trace};
use web_time::Instant;

use cpmp_core::{CpmpError, CpmpResult};

use super::{LpBackend, LpStatus};
use crate::config::LpSettings;
use crate::master::{FixOutcome, MasterLp, MasterRow, VarId, VarKind};

/// Slack allowed when checking a fixing against current bounds.
const BOUND_TOL: f64 = 1e-9;

#[derive(Debug, Clone)]
struct Column {
    obj: f64,
    lb: f64,
    ub: f64,
    coefs: Vec<(usize, f64)>,
}

#[derive(Debug, Clone, Copy)]
struct BoundChange {
    var: usize,
    lb: f64,
    ub: f64,
}

/// Clarabel-backed restricted master.
#[derive(Debug, Clone)]
pub struct ClarabelMaster {
    nlocations: usize,
    nclusters: usize,
    settings: LpSettings,
    columns: Vec<Column>,
    trail: Vec<BoundChange>,
    scopes: Vec<usize>,
    status: Option<LpStatus>,
    objective: f64,
    primal: Vec<f64>,
    duals: Vec<f64>,
    farkas: Vec<f64>,
    iterations: u32,
}

impl ClarabelMaster {
    /// Empty master with coupling rows for `nlocations` and at most
    /// `nclusters` clusters.
    pub fn new(nlocations: usize, nclusters: usize, settings: LpSettings) -> Self {
        Self {
            nlocations,
            nclusters,
            settings,
            columns: Vec::new(),
            trail: Vec::new(),
            scopes: Vec::new(),
            status: None,
            objective: 0.0,
            primal: Vec::new(),
            duals: Vec::new(),
            farkas: Vec::new(),
            iterations: 0,
        }
    }

    fn ncoupling(&self) -> usize {
        2 * self.nlocations + 1
    }

    fn row_index(&self, row: MasterRow) -> usize {
        match row {
            MasterRow::Assignment(l) => {
                assert!(l < self.nlocations);
                l
            }
            MasterRow::Convexity(m) => {
                assert!(m < self.nlocations);
                self.nlocations + m
            }
            MasterRow::PMedian => 2 * self.nlocations,
        }
    }

    fn coupling_rhs(&self) -> Vec<f64> {
        let n = self.nlocations;
        let mut rhs = Vec::with_capacity(self.ncoupling());
        rhs.extend(std::iter::repeat(-1.0).take(n));
        rhs.extend(std::iter::repeat(1.0).take(n));
        rhs.push(self.nclusters as f64);
        rhs
    }

    pub fn status(&self) -> Option<LpStatus> {
        self.status
    }

    /// Interior-point iterations of the last solve.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Record an infeasible master without columns. Every assignment row
    /// reads `0 ≤ -1`; the unit certificate on those rows proves it.
    fn set_empty_infeasible(&mut self) {
        let m = self.ncoupling();
        self.primal.clear();
        self.duals = vec![0.0; m];
        self.farkas = vec![0.0; m];
        for l in 0..self.nlocations {
            self.farkas[l] = -1.0;
        }
        self.objective = 0.0;
        self.iterations = 0;
        self.status = Some(LpStatus::Infeasible);
    }
}

impl MasterLp for ClarabelMaster {
    fn add_var(
        &mut self,
        name: &str,
        obj: f64,
        lb: f64,
        ub: f64,
        _kind: VarKind,
    ) -> CpmpResult<VarId> {
        // Only the relaxation is solved here; integrality comes from branching.
        if !lb.is_finite() || lb > ub {
            return Err(CpmpError::Solver(format!(
                "invalid bounds [{lb}, {ub}] for column {name}"
            )));
        }
        self.columns.push(Column {
            obj,
            lb,
            ub,
            coefs: Vec::new(),
        });
        Ok(VarId::new(self.columns.len() - 1))
    }

    fn add_coef(&mut self, row: MasterRow, var: VarId, coef: f64) -> CpmpResult<()> {
        let r = self.row_index(row);
        let col = self
            .columns
            .get_mut(var.value())
            .ok_or_else(|| CpmpError::Solver(format!("unknown column {}", var.value())))?;
        col.coefs.push((r, coef));
        Ok(())
    }

    fn dual(&self, row: MasterRow) -> f64 {
        self.duals.get(self.row_index(row)).copied().unwrap_or(0.0)
    }

    fn farkas(&self, row: MasterRow) -> f64 {
        self.farkas.get(self.row_index(row)).copied().unwrap_or(0.0)
    }

    fn value(&self, var: VarId) -> f64 {
        self.primal.get(var.value()).copied().unwrap_or(0.0)
    }

    fn lb_local(&self, var: VarId) -> f64 {
        self.columns[var.value()].lb
    }

    fn ub_local(&self, var: VarId) -> f64 {
        self.columns[var.value()].ub
    }

    fn fix_var(&mut self, var: VarId, value: f64) -> FixOutcome {
        let j = var.value();
        let col = &mut self.columns[j];
        if value < col.lb - BOUND_TOL || value > col.ub + BOUND_TOL {
            return FixOutcome {
                infeasible: true,
                fixed: false,
            };
        }
        if col.lb == value && col.ub == value {
            return FixOutcome::default();
        }
        self.trail.push(BoundChange {
            var: j,
            lb: col.lb,
            ub: col.ub,
        });
        col.lb = value;
        col.ub = value;
        FixOutcome {
            infeasible: false,
            fixed: true,
        }
    }
}

impl LpBackend for ClarabelMaster {
    fn solve(&mut self) -> CpmpResult<LpStatus> {
        let start = Instant::now();
        let n_var = self.columns.len();
        if n_var == 0 {
            self.set_empty_infeasible();
            debug!("master has no columns: infeasible");
            return Ok(LpStatus::Infeasible);
        }

        // Columns in CSC order: coupling coefficients, then the column's own
        // bound rows.
        let m0 = self.ncoupling();
        let mut rhs = self.coupling_rhs();
        let mut cols: Vec<Vec<(usize, f64)>> = Vec::with_capacity(n_var);
        for col in &self.columns {
            let mut entries = col.coefs.clone();
            if col.ub.is_finite() {
                entries.push((rhs.len(), 1.0));
                rhs.push(col.ub);
            }
            entries.push((rhs.len(), -1.0));
            rhs.push(-col.lb);
            cols.push(entries);
        }

        let n_con_rows = rhs.len();
        let mut col_ptr = Vec::with_capacity(n_var + 1);
        let mut row_idx = Vec::new();
        let mut values = Vec::new();
        let mut nnz = 0;
        for entries in cols.iter_mut() {
            col_ptr.push(nnz);
            entries.sort_by_key(|(r, _)| *r);
            for &(r, v) in entries.iter() {
                row_idx.push(r);
                values.push(v);
                nnz += 1;
            }
        }
        col_ptr.push(nnz);

        let a_mat = CscMatrix::new(n_con_rows, n_var, col_ptr, row_idx, values);
        let p_mat = CscMatrix::new(n_var, n_var, vec![0; n_var + 1], Vec::new(), Vec::new());
        let obj: Vec<f64> = self.columns.iter().map(|c| c.obj).collect();
        let cones = [SupportedConeT::NonnegativeConeT(n_con_rows)];

        let settings = DefaultSettingsBuilder::default()
            .verbose(self.settings.verbose)
            .max_iter(self.settings.max_iter)
            .tol_feas(self.settings.tol_feas)
            .tol_gap_abs(self.settings.tol_gap)
            .tol_gap_rel(self.settings.tol_gap)
            .equilibrate_enable(self.settings.equilibrate)
            .build()
            .map_err(|e| CpmpError::Solver(format!("Clarabel settings error: {:?}", e)))?;

        let mut solver = DefaultSolver::new(&p_mat, &obj, &a_mat, &rhs, &cones, settings)
            .map_err(|e| CpmpError::Solver(format!("Clarabel initialization failed: {:?}", e)))?;
        solver.solve();
        let sol = solver.solution;
        self.iterations = sol.iterations;

        let status = match sol.status {
            SolverStatus::Solved | SolverStatus::AlmostSolved => {
                self.primal = sol.x.clone();
                self.duals = sol.z[..m0].iter().map(|z| -z).collect();
                self.farkas = vec![0.0; m0];
                self.objective = sol.obj_val;
                LpStatus::Optimal
            }
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                // The certificate's scale is arbitrary; normalise it so the
                // pricing profits stay within the knapsack's integer range.
                let scale = sol.z[..m0]
                    .iter()
                    .fold(0.0_f64, |acc, z| acc.max(z.abs()));
                let scale = if scale > 0.0 { scale } else { 1.0 };
                self.primal.clear();
                self.duals = vec![0.0; m0];
                self.farkas = sol.z[..m0].iter().map(|z| -z / scale).collect();
                self.objective = 0.0;
                LpStatus::Infeasible
            }
            other => {
                self.status = None;
                return Err(CpmpError::Solver(format!(
                    "Clarabel returned status {:?} on a master with {} columns",
                    other, n_var
                )));
            }
        };

        trace!(
            ?status,
            objective = self.objective,
            columns = n_var,
            iterations = self.iterations,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "master LP solved"
        );
        self.status = Some(status);
        Ok(status)
    }

    fn objective(&self) -> f64 {
        self.objective
    }

    fn push_scope(&mut self) {
        self.scopes.push(self.trail.len());
    }

    fn pop_scope(&mut self) {
        let Some(mark) = self.scopes.pop() else {
            return;
        };
        while self.trail.len() > mark {
            if let Some(change) = self.trail.pop() {
                let col = &mut self.columns[change.var];
                col.lb = change.lb;
                col.ub = change.ub;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two locations, one cluster, capacity for both at median 0.
    fn two_location_master() -> (ClarabelMaster, VarId, VarId) {
        let mut lp = ClarabelMaster::new(2, 1, LpSettings::default());
        // {0,1} served from median 0 at cost 3.
        let both = lp.add_var("Pattern_0_0", 3.0, 0.0, 1.0, VarKind::Continuous).unwrap();
        lp.add_coef(MasterRow::Assignment(0), both, -1.0).unwrap();
        lp.add_coef(MasterRow::Assignment(1), both, -1.0).unwrap();
        lp.add_coef(MasterRow::Convexity(0), both, 1.0).unwrap();
        lp.add_coef(MasterRow::PMedian, both, 1.0).unwrap();
        // {1} served from median 1 at cost 0.
        let single = lp.add_var("Pattern_1_0", 0.0, 0.0, 1.0, VarKind::Continuous).unwrap();
        lp.add_coef(MasterRow::Assignment(1), single, -1.0).unwrap();
        lp.add_coef(MasterRow::Convexity(1), single, 1.0).unwrap();
        lp.add_coef(MasterRow::PMedian, single, 1.0).unwrap();
        (lp, both, single)
    }

    #[test]
    fn test_empty_master_is_infeasible_with_unit_certificate() {
        let mut lp = ClarabelMaster::new(3, 2, LpSettings::default());
        assert_eq!(lp.solve().unwrap(), LpStatus::Infeasible);
        for l in 0..3 {
            assert_eq!(lp.farkas(MasterRow::Assignment(l)), -1.0);
            assert_eq!(lp.farkas(MasterRow::Convexity(l)), 0.0);
        }
        assert_eq!(lp.farkas(MasterRow::PMedian), 0.0);
    }

    #[test]
    fn test_solves_small_master() {
        let (mut lp, both, single) = two_location_master();
        assert_eq!(lp.solve().unwrap(), LpStatus::Optimal);
        assert!((lp.objective() - 3.0).abs() < 1e-5);
        assert!((lp.value(both) - 1.0).abs() < 1e-5);
        assert!(lp.value(single).abs() < 1e-5);
        // Location 0 can only be covered by the pair, its dual carries the cost.
        assert!(lp.dual(MasterRow::Assignment(0)) < -1.0);
        for row in [MasterRow::Assignment(1), MasterRow::PMedian, MasterRow::Convexity(0)] {
            assert!(lp.dual(row) <= 1e-6);
        }
    }

    #[test]
    fn test_fixing_and_scopes() {
        let (mut lp, both, _single) = two_location_master();
        lp.push_scope();
        let outcome = lp.fix_var(both, 0.0);
        assert!(outcome.fixed && !outcome.infeasible);
        assert_eq!(lp.ub_local(both), 0.0);
        assert_eq!(lp.fix_var(both, 0.0), FixOutcome::default());

        // Location 0 is now uncoverable.
        assert_eq!(lp.solve().unwrap(), LpStatus::Infeasible);
        assert!(lp.farkas(MasterRow::Assignment(0)) < 0.0);

        lp.pop_scope();
        assert_eq!(lp.ub_local(both), 1.0);
        assert_eq!(lp.solve().unwrap(), LpStatus::Optimal);
    }

    #[test]
    fn test_fix_outside_bounds_is_infeasible() {
        let mut lp = ClarabelMaster::new(1, 1, LpSettings::default());
        let v = lp.add_var("x", 1.0, 1.0, 1.0, VarKind::Binary).unwrap();
        let outcome = lp.fix_var(v, 0.0);
        assert!(outcome.infeasible);
        assert_eq!(lp.lb_local(v), 1.0);
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let mut lp = ClarabelMaster::new(1, 1, LpSettings::default());
        assert!(lp.add_var("x", 1.0, 2.0, 1.0, VarKind::Continuous).is_err());
    }
}
