//! Callback interfaces between the tree-search driver and the
//! branch-and-price components.
//!
//! The driver owns the [`MasterContext`] and the LP; each component gets
//! exactly the access it needs for one call.

use cpmp_core::CpmpResult;

use crate::branching::BranchResult;
use crate::context::MasterContext;
use crate::master::MasterLp;
use crate::pricer::{PricingMode, PricingOutcome};
use crate::propagation::{Activation, PropagationResult, SemiassignCons};
use crate::tree::SearchTree;

/// Column generation.
pub trait Pricer {
    /// Look for improving columns using the duals (or Farkas values) of the
    /// last LP solve and add them to the master.
    fn price(
        &mut self,
        ctx: &mut MasterContext<'_>,
        lp: &mut dyn MasterLp,
        mode: PricingMode,
    ) -> CpmpResult<PricingOutcome>;
}

/// Branching on a fractional LP solution.
pub trait BranchRule {
    fn branch(
        &mut self,
        ctx: &MasterContext<'_>,
        lp: &dyn MasterLp,
        tree: &mut dyn SearchTree,
    ) -> BranchResult;
}

/// Node-local constraints created by branching.
pub trait ConstraintHandler {
    /// The node holding `cons` was entered.
    fn activate(&mut self, cons: &mut SemiassignCons, ctx: &mut MasterContext<'_>) -> Activation;

    /// The node holding `cons` was left.
    fn deactivate(&mut self, cons: &mut SemiassignCons, ctx: &mut MasterContext<'_>);

    fn propagate(
        &mut self,
        cons: &mut SemiassignCons,
        ctx: &MasterContext<'_>,
        lp: &mut dyn MasterLp,
    ) -> PropagationResult;

    /// Whether the current LP solution satisfies `cons`.
    fn check(&self, cons: &SemiassignCons, ctx: &MasterContext<'_>, lp: &dyn MasterLp) -> bool;
}
