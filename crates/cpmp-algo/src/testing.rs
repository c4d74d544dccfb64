//! In-memory [`MasterLp`] used by unit tests.

use std::collections::HashMap;

use cpmp_core::CpmpResult;

use crate::master::{FixOutcome, MasterLp, MasterRow, VarId, VarKind};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedColumn {
    pub name: String,
    pub obj: f64,
    pub lb: f64,
    pub ub: f64,
    pub kind: VarKind,
    pub coefs: Vec<(MasterRow, f64)>,
}

/// Records columns and serves hand-set duals, Farkas values and primal values.
#[derive(Debug, Default)]
pub struct RecordingLp {
    pub columns: Vec<RecordedColumn>,
    pub duals: HashMap<MasterRow, f64>,
    pub farkas: HashMap<MasterRow, f64>,
    pub values: HashMap<VarId, f64>,
    pub fixes: Vec<VarId>,
}

impl RecordingLp {
    pub fn set_value(&mut self, var: VarId, value: f64) {
        self.values.insert(var, value);
    }
}

impl MasterLp for RecordingLp {
    fn add_var(
        &mut self,
        name: &str,
        obj: f64,
        lb: f64,
        ub: f64,
        kind: VarKind,
    ) -> CpmpResult<VarId> {
        self.columns.push(RecordedColumn {
            name: name.to_string(),
            obj,
            lb,
            ub,
            kind,
            coefs: Vec::new(),
        });
        Ok(VarId::new(self.columns.len() - 1))
    }

    fn add_coef(&mut self, row: MasterRow, var: VarId, coef: f64) -> CpmpResult<()> {
        self.columns[var.value()].coefs.push((row, coef));
        Ok(())
    }

    fn dual(&self, row: MasterRow) -> f64 {
        self.duals.get(&row).copied().unwrap_or(0.0)
    }

    fn farkas(&self, row: MasterRow) -> f64 {
        self.farkas.get(&row).copied().unwrap_or(0.0)
    }

    fn value(&self, var: VarId) -> f64 {
        self.values.get(&var).copied().unwrap_or(0.0)
    }

    fn lb_local(&self, var: VarId) -> f64 {
        self.columns[var.value()].lb
    }

    fn ub_local(&self, var: VarId) -> f64 {
        self.columns[var.value()].ub
    }

    fn fix_var(&mut self, var: VarId, value: f64) -> FixOutcome {
        let col = &mut self.columns[var.value()];
        if value < col.lb || value > col.ub {
            return FixOutcome {
                infeasible: true,
                fixed: false,
            };
        }
        let fixed = col.lb != value || col.ub != value;
        col.lb = value;
        col.ub = value;
        if fixed {
            self.fixes.push(var);
        }
        FixOutcome {
            infeasible: false,
            fixed,
        }
    }
}
