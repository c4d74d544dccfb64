//! Semi-assignment constraints and their handler.
//!
//! A semi-assignment constraint says: inside the subtree of `node`,
//! `location` may not be served by any median flagged in `forbidden`. It is
//! enforced in two places. While the node is active its forbidding sits in
//! the [`ForbiddenAssignments`](crate::forbidden::ForbiddenAssignments)
//! registry, so pricing never builds offending clusters. Columns that
//! already exist are fixed to zero by propagation.
//!
//! Columns accumulate across the whole tree, so a constraint may be
//! re-entered after new columns appeared elsewhere. Each constraint keeps a
//! [`PropagationCursor`]: the number of columns already checked plus a flag
//! asking for another pass over the ones after it.

use tracing::{debug, trace};

use crate::context::MasterContext;
use crate::master::MasterLp;
use crate::traits::ConstraintHandler;
use crate::tree::NodeId;

/// Resumable scan position of one constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropagationCursor {
    /// Pattern variables `[0, npropvars)` are known to respect the constraint.
    pub npropvars: usize,
    /// Pattern variables past the cursor must be checked.
    pub propagate: bool,
}

impl Default for PropagationCursor {
    fn default() -> Self {
        Self {
            npropvars: 0,
            propagate: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsState {
    Inactive,
    NeedsPropagation,
    Clean,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SemiassignCons {
    pub location: usize,
    /// Indexed by median.
    pub forbidden: Vec<bool>,
    pub node: NodeId,
    pub cursor: PropagationCursor,
    active: bool,
}

impl SemiassignCons {
    pub fn new(location: usize, forbidden: Vec<bool>, node: NodeId) -> Self {
        Self {
            location,
            forbidden,
            node,
            cursor: PropagationCursor::default(),
            active: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn state(&self) -> ConsState {
        match (self.active, self.cursor.propagate) {
            (false, _) => ConsState::Inactive,
            (true, true) => ConsState::NeedsPropagation,
            (true, false) => ConsState::Clean,
        }
    }

    pub fn forbidden_medians(&self) -> impl Iterator<Item = usize> + '_ {
        self.forbidden
            .iter()
            .enumerate()
            .filter_map(|(m, &f)| f.then_some(m))
    }
}

impl std::fmt::Display for SemiassignCons {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Semiassignment constraint at node {}:", self.node)?;
        writeln!(f, "   Location {}", self.location)?;
        write!(f, "   Forbidden medians:")?;
        for m in self.forbidden_medians() {
            write!(f, " {m}")?;
        }
        Ok(())
    }
}

/// What the host must do after an activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Every existing column has been checked already.
    Clean,
    /// New columns exist; propagate this node again.
    Repropagate(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationResult {
    /// The constraint had nothing to check.
    DidNotRun,
    DidNotFind,
    ReducedDom { nfixed: usize },
    /// A column could not be fixed to zero; the node is infeasible.
    Cutoff,
}

/// Constraint handler for semi-assignment branching decisions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemiassignConshdlr;

impl ConstraintHandler for SemiassignConshdlr {
    fn activate(&mut self, cons: &mut SemiassignCons, ctx: &mut MasterContext<'_>) -> Activation {
        assert!(!cons.active, "constraint at node {} activated twice", cons.node);
        let nvars = ctx.master.len();
        assert!(cons.cursor.npropvars <= nvars);

        cons.active = true;
        ctx.forbidden
            .forbid_assignments(cons.location, &cons.forbidden);

        if cons.cursor.npropvars < nvars {
            cons.cursor.propagate = true;
            Activation::Repropagate(cons.node)
        } else {
            Activation::Clean
        }
    }

    fn deactivate(&mut self, cons: &mut SemiassignCons, ctx: &mut MasterContext<'_>) {
        assert!(cons.active, "constraint at node {} is not active", cons.node);
        ctx.forbidden
            .allow_assignments(cons.location, &cons.forbidden);
        cons.cursor.propagate = false;
        cons.active = false;
    }

    fn propagate(
        &mut self,
        cons: &mut SemiassignCons,
        ctx: &MasterContext<'_>,
        lp: &mut dyn MasterLp,
    ) -> PropagationResult {
        assert!(cons.active);
        if !cons.cursor.propagate {
            return PropagationResult::DidNotRun;
        }

        let tol = ctx.tolerances;
        let nvars = ctx.master.len();
        let mut nfixed = 0;

        for index in cons.cursor.npropvars..nvars {
            let pv = ctx.master.get(index);
            if tol.is_feas_zero(lp.ub_local(pv.var))
                || !cons.forbidden[pv.pattern.median()]
                || !pv.pattern.contains(cons.location)
            {
                continue;
            }

            let outcome = lp.fix_var(pv.var, 0.0);
            if outcome.infeasible {
                debug!(
                    node = %cons.node,
                    var = %pv.name,
                    "semi-assignment propagation cut off node"
                );
                return PropagationResult::Cutoff;
            }
            assert!(outcome.fixed);
            trace!(var = %pv.name, location = cons.location, "fixed to zero");
            nfixed += 1;
        }

        cons.cursor.npropvars = nvars;
        cons.cursor.propagate = false;

        if nfixed > 0 {
            PropagationResult::ReducedDom { nfixed }
        } else {
            PropagationResult::DidNotFind
        }
    }

    fn check(&self, cons: &SemiassignCons, ctx: &MasterContext<'_>, lp: &dyn MasterLp) -> bool {
        let tol = ctx.tolerances;
        ctx.master.values(lp).all(|(pv, value)| {
            !tol.is_feas_positive(value)
                || !cons.forbidden[pv.pattern.median()]
                || !pv.pattern.contains(cons.location)
        })
    }
}
