//! LP backends for the restricted master.
//!
//! A backend is a [`MasterLp`] that can also solve itself and scope bound
//! changes to search-tree nodes.

mod clarabel_master;

pub use clarabel_master::ClarabelMaster;

use cpmp_core::CpmpResult;
use serde::{Deserialize, Serialize};

use crate::master::MasterLp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LpStatus {
    Optimal,
    Infeasible,
}

/// Solvable master LP with node-scoped bound changes.
pub trait LpBackend: MasterLp {
    fn solve(&mut self) -> CpmpResult<LpStatus>;

    /// Objective of the last optimal solve.
    fn objective(&self) -> f64;

    /// Start recording bound changes for a newly entered node.
    fn push_scope(&mut self);

    /// Undo every bound change since the matching [`Self::push_scope`].
    fn pop_scope(&mut self);
}
