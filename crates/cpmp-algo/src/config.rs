//! Solver configuration.

use serde::{Deserialize, Serialize};

use cpmp_core::{CpmpError, CpmpResult, Tolerances};

use crate::knapsack::KnapsackAlgorithm;

/// Interior-point settings for the master LP.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LpSettings {
    /// Maximum interior point iterations (default: 200)
    pub max_iter: u32,
    /// Primal/dual feasibility tolerance (default: 1e-8)
    pub tol_feas: f64,
    /// Duality gap tolerance (default: 1e-8)
    pub tol_gap: f64,
    /// Enable matrix equilibration (default: true)
    pub equilibrate: bool,
    /// Verbose solver output (default: false)
    pub verbose: bool,
}

impl Default for LpSettings {
    fn default() -> Self {
        Self {
            max_iter: 200,
            tol_feas: 1e-8,
            tol_gap: 1e-8,
            equilibrate: true,
            verbose: false,
        }
    }
}

/// Branch-and-price configuration.
///
/// ```
/// use cpmp_algo::BranchAndPriceConfig;
///
/// let config = BranchAndPriceConfig::default()
///     .with_node_limit(500)
///     .with_time_limit(30.0);
/// assert!(config.solve_integer);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchAndPriceConfig {
    /// Binary pattern variables and tree search; otherwise only the root LP
    /// relaxation is solved (default: true)
    pub solve_integer: bool,
    /// Branch on fractional location assignments (default: true)
    pub semiassign_branching: bool,
    /// Start every master with one big-M column per location so the LP is
    /// always feasible (default: true). Without them infeasible masters are
    /// repaired by Farkas pricing.
    pub artificial_columns: bool,
    /// Maximum number of processed nodes
    pub node_limit: Option<usize>,
    /// Wall-clock limit in seconds
    pub time_limit_seconds: Option<f64>,
    /// Pricing rounds per node before column generation is stopped
    /// (default: 10_000)
    pub max_pricing_rounds: usize,
    /// Pricing subproblem solver (default: dynamic programming)
    pub knapsack: KnapsackAlgorithm,
    pub tolerances: Tolerances,
    pub lp: LpSettings,
}

impl Default for BranchAndPriceConfig {
    fn default() -> Self {
        Self {
            solve_integer: true,
            semiassign_branching: true,
            artificial_columns: true,
            node_limit: None,
            time_limit_seconds: None,
            max_pricing_rounds: 10_000,
            knapsack: KnapsackAlgorithm::DynamicProgramming,
            tolerances: Tolerances::default(),
            lp: LpSettings::default(),
        }
    }
}

impl BranchAndPriceConfig {
    /// Solve only the LP relaxation at the root.
    pub fn lp_relaxation() -> Self {
        Self {
            solve_integer: false,
            ..Self::default()
        }
    }

    pub fn with_branching(mut self, enabled: bool) -> Self {
        self.semiassign_branching = enabled;
        self
    }

    pub fn with_artificial_columns(mut self, enabled: bool) -> Self {
        self.artificial_columns = enabled;
        self
    }

    pub fn with_node_limit(mut self, limit: usize) -> Self {
        self.node_limit = Some(limit);
        self
    }

    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit_seconds = Some(seconds);
        self
    }

    pub fn with_knapsack(mut self, knapsack: KnapsackAlgorithm) -> Self {
        self.knapsack = knapsack;
        self
    }

    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    pub fn validate(&self) -> CpmpResult<()> {
        if self.max_pricing_rounds == 0 {
            return Err(CpmpError::Config("max_pricing_rounds must be positive".into()));
        }
        if !self.knapsack.is_available() {
            return Err(CpmpError::Config(format!(
                "knapsack solver {:?} is not compiled in",
                self.knapsack
            )));
        }
        if let Some(t) = self.time_limit_seconds {
            if !(t > 0.0) {
                return Err(CpmpError::Config(format!("time limit must be positive, got {t}")));
            }
        }
        let tol = &self.tolerances;
        if !(tol.epsilon > 0.0 && tol.feastol > 0.0 && tol.feastol < 0.5) {
            return Err(CpmpError::Config(format!(
                "invalid tolerances: epsilon {}, feastol {}",
                tol.epsilon, tol.feastol
            )));
        }
        Ok(())
    }
}
