//! Restricted master problem.
//!
//! ```text
//! minimize    Σ_P cost(P) · x_P
//!
//! subject to  -Σ_{P ∋ i} x_P        ≤ -1     for every location i   (assignment)
//!              Σ_{P : med(P)=j} x_P ≤  1     for every median j     (convexity)
//!              Σ_P x_P              ≤  p                            (p-median)
//!              0 ≤ x_P ≤ 1
//! ```
//!
//! The LP itself lives behind [`MasterLp`]; this module owns the pattern
//! registry and knows which coefficients a new pattern contributes. Duals
//! follow the convention of a minimisation LP with `≤` rows, so they are
//! non-positive.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use cpmp_core::{CpmpResult, Pattern};

/// Coupling rows of the master problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MasterRow {
    /// Coverage of one location.
    Assignment(usize),
    /// At most one cluster per median.
    Convexity(usize),
    /// At most `p` clusters overall.
    PMedian,
}

/// Handle of a master LP column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarId(usize);

impl VarId {
    pub fn new(value: usize) -> Self {
        Self(value)
    }

    pub fn value(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarKind {
    Continuous,
    Binary,
}

/// Result of a bound fixing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FixOutcome {
    /// The value lies outside the current local bounds.
    pub infeasible: bool,
    /// The bounds changed.
    pub fixed: bool,
}

/// Operations the branch-and-price components need from the LP host.
pub trait MasterLp {
    fn add_var(
        &mut self,
        name: &str,
        obj: f64,
        lb: f64,
        ub: f64,
        kind: VarKind,
    ) -> CpmpResult<VarId>;

    fn add_coef(&mut self, row: MasterRow, var: VarId, coef: f64) -> CpmpResult<()>;

    /// Dual value of a row in the last optimal LP.
    fn dual(&self, row: MasterRow) -> f64;

    /// Farkas multiplier of a row in the last infeasible LP.
    fn farkas(&self, row: MasterRow) -> f64;

    /// Primal value of a column in the last LP.
    fn value(&self, var: VarId) -> f64;

    fn lb_local(&self, var: VarId) -> f64;

    fn ub_local(&self, var: VarId) -> f64;

    /// Fix both local bounds of `var` to `value` at the current node.
    fn fix_var(&mut self, var: VarId, value: f64) -> FixOutcome;
}

/// One registered pattern and its master column.
#[derive(Debug, Clone)]
pub struct PatternVar {
    pub pattern: Pattern,
    pub var: VarId,
    pub name: String,
}

/// Pattern registry of the restricted master.
///
/// Patterns only ever get appended: the list is shared by every node of the
/// search tree and positions in it are stable, which is what propagation
/// cursors index into.
#[derive(Debug, Clone)]
pub struct RestrictedMaster {
    kind: VarKind,
    patterns: Vec<PatternVar>,
    per_median: Vec<usize>,
    seen: HashSet<(usize, Vec<usize>)>,
}

impl RestrictedMaster {
    pub fn new(nlocations: usize, kind: VarKind) -> Self {
        Self {
            kind,
            patterns: Vec::new(),
            per_median: vec![0; nlocations],
            seen: HashSet::new(),
        }
    }

    pub fn kind(&self) -> VarKind {
        self.kind
    }

    /// Number of pattern variables created so far.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &[PatternVar] {
        &self.patterns
    }

    pub fn get(&self, index: usize) -> &PatternVar {
        &self.patterns[index]
    }

    pub fn contains(&self, pattern: &Pattern) -> bool {
        self.seen
            .contains(&(pattern.median(), pattern.locations().to_vec()))
    }

    /// Create the column for `pattern` and register it.
    ///
    /// Returns `None` without touching the LP if the same cluster is already
    /// in the registry.
    pub fn add_pattern(
        &mut self,
        lp: &mut dyn MasterLp,
        pattern: Pattern,
    ) -> CpmpResult<Option<VarId>> {
        let key = (pattern.median(), pattern.locations().to_vec());
        if self.seen.contains(&key) {
            return Ok(None);
        }

        let median = pattern.median();
        let name = format!("Pattern_{}_{}", median, self.per_median[median]);
        let var = lp.add_var(&name, pattern.cost() as f64, 0.0, 1.0, self.kind)?;
        for &location in pattern.locations() {
            lp.add_coef(MasterRow::Assignment(location), var, -1.0)?;
        }
        lp.add_coef(MasterRow::Convexity(median), var, 1.0)?;
        lp.add_coef(MasterRow::PMedian, var, 1.0)?;

        self.per_median[median] += 1;
        self.seen.insert(key);
        self.patterns.push(PatternVar { pattern, var, name });
        Ok(Some(var))
    }

    /// Patterns with their LP values.
    pub fn values<'a>(
        &'a self,
        lp: &'a dyn MasterLp,
    ) -> impl Iterator<Item = (&'a PatternVar, f64)> + 'a {
        self.patterns.iter().map(move |pv| (pv, lp.value(pv.var)))
    }
}
