//! # cpmp-algo: Branch-and-Price for the Capacitated P-Median Problem
//!
//! Clusters are generated on demand by a knapsack pricer and fed into a
//! Dantzig-Wolfe master LP; fractional LP solutions are resolved by
//! semi-assignment branching.
//!
//! ## Master Problem
//!
//! | Row | Form | Meaning |
//! |-----|------|---------|
//! | [`MasterRow::Assignment`] | `−Σ x_P ≤ −1` over patterns serving `l` | every location is served |
//! | [`MasterRow::Convexity`] | `Σ x_P ≤ 1` over patterns of median `m` | a median opens at most once |
//! | [`MasterRow::PMedian`] | `Σ x_P ≤ p` | at most `p` clusters |
//!
//! ### Components
//!
//! - **[`CpmpPricer`]**: one knapsack per median, reduced-cost or Farkas mode
//! - **[`SemiassignBranching`]**: splits the medians of a fractional location
//! - **[`SemiassignConshdlr`]**: applies branching decisions to the
//!   [`ForbiddenAssignments`] registry and fixes offending columns
//! - **[`ClarabelMaster`]**: interior-point master LP with node-scoped bounds
//! - **[`round_lp_solution`]**: greedy rounding of the master LP into a clustering
//! - **[`BranchAndPrice`]**: depth-first driver tying them together
//!
//! The components talk to the driver only through the [`traits`] module, so
//! each can be replaced or tested against a recording LP.
//!
//! ## Example
//!
//! ```no_run
//! use cpmp_algo::{BranchAndPrice, BranchAndPriceConfig, SolveStatus};
//! use cpmp_core::Instance;
//!
//! let instance = Instance::new(
//!     1,
//!     vec![vec![0, 2], vec![2, 0]],
//!     vec![1, 1],
//!     vec![2, 2],
//! )?;
//! let solution = BranchAndPrice::new(&instance, BranchAndPriceConfig::default()).solve()?;
//! assert_eq!(solution.status, SolveStatus::Optimal);
//! assert_eq!(solution.objective, Some(2.0));
//! # Ok::<(), cpmp_core::CpmpError>(())
//! ```

pub mod branching;
#[cfg(feature = "solver-clarabel")]
pub mod compact;
pub mod config;
pub mod context;
pub mod driver;
pub mod forbidden;
pub mod heuristic;
pub mod knapsack;
pub mod lp;
pub mod master;
pub mod pricer;
pub mod propagation;
pub mod traits;
pub mod tree;

#[cfg(test)]
mod testing;

pub use branching::{BranchResult, SemiassignBranching};
#[cfg(feature = "solver-clarabel")]
pub use compact::{compact_lp_bound, CompactBound};
pub use config::{BranchAndPriceConfig, LpSettings};
pub use context::MasterContext;
pub use driver::{BranchAndPrice, BranchAndPriceSolution, PatternValue, SolveStats, SolveStatus};
pub use forbidden::ForbiddenAssignments;
pub use heuristic::round_lp_solution;
#[cfg(feature = "solver-highs")]
pub use knapsack::MipKnapsack;
pub use knapsack::{
    DynamicProgrammingKnapsack, KnapsackAlgorithm, KnapsackSolution, KnapsackSolver,
};
pub use lp::{ClarabelMaster, LpBackend, LpStatus};
pub use master::{FixOutcome, MasterLp, MasterRow, RestrictedMaster, VarId, VarKind};
pub use pricer::{CpmpPricer, PricingMode, PricingOutcome};
pub use propagation::{SemiassignCons, SemiassignConshdlr};
pub use tree::{NodeArena, NodeId, SearchTree};
