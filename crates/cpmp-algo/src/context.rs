//! Shared solving state.
//!
//! The tree-search driver owns one [`MasterContext`] for the whole run and
//! hands it by reference to pricing, branching and propagation. It bundles
//! the two pieces of cross-node state: the pattern registry (grows only)
//! and the forbidden-assignment registry (reflects the active path only).

use cpmp_core::{Instance, Tolerances};

use crate::forbidden::ForbiddenAssignments;
use crate::master::{RestrictedMaster, VarKind};

#[derive(Debug, Clone)]
pub struct MasterContext<'a> {
    pub instance: &'a Instance,
    pub forbidden: ForbiddenAssignments,
    pub master: RestrictedMaster,
    pub tolerances: Tolerances,
}

impl<'a> MasterContext<'a> {
    pub fn new(instance: &'a Instance, kind: VarKind, tolerances: Tolerances) -> Self {
        let n = instance.nlocations();
        Self {
            instance,
            forbidden: ForbiddenAssignments::new(n),
            master: RestrictedMaster::new(n, kind),
            tolerances,
        }
    }

    pub fn nlocations(&self) -> usize {
        self.instance.nlocations()
    }
}
