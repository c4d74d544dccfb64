//! Depth-first branch-and-price driver.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  per node                                                        │
//! │                                                                  │
//! │  switch path ──► propagate ──► solve LP ──┬─► price (redcost) ─┐ │
//! │  (deactivate /    (fix offending          │   price (Farkas)   │ │
//! │   activate        columns to 0)           └──◄─── new columns ◄┘ │
//! │   constraints)                                                   │
//! │                          no columns ──► bound / integrality      │
//! │                                          └─► incumbent | branch  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The restricted master starts with one big-M artificial column per
//! location so the first LP is feasible. If artificial columns are still
//! in use once reduced-cost pricing converges, they are fixed to zero for
//! the node's subtree and the master falls back to Farkas pricing, which
//! either repairs the LP or proves the node infeasible.
//!
//! Nodes are explored depth first. A node is left only once its subtree is
//! finished, so a constraint is never reactivated after its node was left.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use web_time::Instant;

use cpmp_core::{CpmpResult, Instance, Pattern};

use crate::branching::{
    choose_location, compute_assignments, sort_medians, BranchResult, SemiassignBranching,
};
use crate::config::BranchAndPriceConfig;
use crate::context::MasterContext;
use crate::heuristic::round_lp_solution;
#[cfg(feature = "solver-highs")]
use crate::knapsack::MipKnapsack;
use crate::knapsack::{DynamicProgrammingKnapsack, KnapsackAlgorithm};
use crate::lp::{ClarabelMaster, LpBackend, LpStatus};
use crate::master::{MasterRow, VarId, VarKind};
use crate::pricer::{CpmpPricer, PricingMode};
use crate::propagation::{Activation, PropagationResult, SemiassignConshdlr};
use crate::traits::{BranchRule, ConstraintHandler, Pricer};
use crate::tree::{NodeArena, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// Integer optimum proven, or LP relaxation solved in relaxation mode.
    Optimal,
    /// No feasible clustering exists.
    Infeasible,
    NodeLimit,
    TimeLimit,
    /// The root LP is fractional and branching is disabled.
    FractionalRoot,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolveStats {
    pub nodes: usize,
    pub max_depth: usize,
    pub lp_solves: usize,
    pub pricing_rounds: usize,
    pub farkas_rounds: usize,
    pub columns: usize,
    pub fixings: usize,
    pub cutoffs: usize,
    pub solve_time_ms: u64,
}

/// Value of a pattern variable in the final LP of the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternValue {
    pub name: String,
    pub median: usize,
    pub locations: Vec<usize>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchAndPriceSolution {
    pub status: SolveStatus,
    /// Cost of the best clustering found.
    pub objective: Option<f64>,
    /// Proven lower bound on the optimal cost.
    pub dual_bound: f64,
    pub root_lp_bound: Option<f64>,
    /// Clusters of the best solution, by median.
    pub clusters: Vec<Pattern>,
    /// Positive pattern values of the root LP.
    pub root_lp_solution: Vec<PatternValue>,
    pub stats: SolveStats,
}

impl BranchAndPriceSolution {
    /// Relative gap between objective and dual bound.
    pub fn gap(&self) -> Option<f64> {
        let obj = self.objective?;
        if !self.dual_bound.is_finite() {
            return None;
        }
        Some((obj - self.dual_bound).abs() / obj.abs().max(1.0))
    }
}

enum NodeOutcome {
    Cutoff,
    Infeasible,
    Integral,
    Branched,
    /// Stop the search after this node.
    Stop,
}

struct ColumnGeneration {
    /// LP objective without artificial columns.
    bound: f64,
    converged: bool,
}

struct Incumbent {
    objective: f64,
    clusters: Vec<Pattern>,
}

/// Mutable state of one solve.
struct Search<'a> {
    ctx: MasterContext<'a>,
    tree: NodeArena,
    active: Vec<NodeId>,
    stack: Vec<NodeId>,
    artificials: Vec<VarId>,
    big_m: f64,
    incumbent: Option<Incumbent>,
    root_lp_bound: Option<f64>,
    root_lp_solution: Vec<PatternValue>,
    stats: SolveStats,
}

/// Branch-and-price solver for one instance.
pub struct BranchAndPrice<'a> {
    instance: &'a Instance,
    config: BranchAndPriceConfig,
    pricer: Box<dyn Pricer + 'a>,
    branchrule: Box<dyn BranchRule + 'a>,
    conshdlr: Box<dyn ConstraintHandler + 'a>,
}

impl<'a> BranchAndPrice<'a> {
    pub fn new(instance: &'a Instance, config: BranchAndPriceConfig) -> Self {
        let pricer: Box<dyn Pricer + 'a> = match config.knapsack {
            #[cfg(feature = "solver-highs")]
            KnapsackAlgorithm::Mip => Box::new(CpmpPricer::new(MipKnapsack)),
            // Unavailable solvers are rejected by `validate` before solving.
            _ => Box::new(CpmpPricer::<DynamicProgrammingKnapsack>::default()),
        };
        Self {
            instance,
            config,
            pricer,
            branchrule: Box::new(SemiassignBranching),
            conshdlr: Box::new(SemiassignConshdlr),
        }
    }

    /// Replace the column generator.
    pub fn with_pricer(mut self, pricer: impl Pricer + 'a) -> Self {
        self.pricer = Box::new(pricer);
        self
    }

    pub fn config(&self) -> &BranchAndPriceConfig {
        &self.config
    }

    /// Solve with the Clarabel master.
    pub fn solve(&mut self) -> CpmpResult<BranchAndPriceSolution> {
        let mut lp = ClarabelMaster::new(
            self.instance.nlocations(),
            self.instance.nclusters(),
            self.config.lp,
        );
        self.solve_with(&mut lp)
    }

    /// Solve on a caller-supplied empty master LP.
    pub fn solve_with<L: LpBackend>(&mut self, lp: &mut L) -> CpmpResult<BranchAndPriceSolution> {
        self.config.validate()?;
        let start = Instant::now();
        let kind = if self.config.solve_integer {
            VarKind::Binary
        } else {
            VarKind::Continuous
        };

        let tree = NodeArena::new();
        let root = tree.root();
        let mut s = Search {
            ctx: MasterContext::new(self.instance, kind, self.config.tolerances),
            tree,
            active: Vec::new(),
            stack: vec![root],
            artificials: Vec::new(),
            big_m: self.instance.worst_case_cost() as f64 + 1.0,
            incumbent: None,
            root_lp_bound: None,
            root_lp_solution: Vec::new(),
            stats: SolveStats::default(),
        };
        if self.config.artificial_columns {
            self.add_artificial_columns(&mut s, lp)?;
        }

        info!(
            locations = self.instance.nlocations(),
            clusters = self.instance.nclusters(),
            integer = self.config.solve_integer,
            branching = self.config.semiassign_branching,
            "starting branch-and-price"
        );

        let mut status = None;
        while let Some(node) = s.stack.pop() {
            if let Some(limit) = self.limit_reached(&s, start) {
                s.stack.push(node);
                status = Some(limit);
                break;
            }

            let estimate = s.tree.node(node).estimate;
            if self.prunable(&s, estimate) {
                s.stats.cutoffs += 1;
                s.tree.discard(node);
                continue;
            }

            self.switch_to(&mut s, lp, node);
            s.stats.nodes += 1;
            s.stats.max_depth = s.stats.max_depth.max(s.tree.node(node).depth);

            match self.process_node(&mut s, lp, node)? {
                NodeOutcome::Cutoff | NodeOutcome::Infeasible => s.stats.cutoffs += 1,
                NodeOutcome::Integral | NodeOutcome::Branched => {}
                NodeOutcome::Stop => {
                    status = Some(if self.config.solve_integer {
                        SolveStatus::FractionalRoot
                    } else {
                        SolveStatus::Optimal
                    });
                    break;
                }
            }
        }

        let dual_bound = self.dual_bound(&s, status);
        while let Some(id) = s.active.pop() {
            self.leave(&mut s, lp, id);
        }
        debug_assert!(s.ctx.forbidden.is_clear());

        let status = status.unwrap_or(match s.incumbent {
            Some(_) => SolveStatus::Optimal,
            None => SolveStatus::Infeasible,
        });
        s.stats.solve_time_ms = start.elapsed().as_millis() as u64;

        let (objective, clusters) = match s.incumbent {
            Some(inc) => (Some(inc.objective), inc.clusters),
            None => (None, Vec::new()),
        };
        info!(
            ?status,
            objective,
            dual_bound,
            nodes = s.stats.nodes,
            columns = s.ctx.master.len(),
            "branch-and-price finished"
        );

        Ok(BranchAndPriceSolution {
            status,
            objective,
            dual_bound,
            root_lp_bound: s.root_lp_bound,
            clusters,
            root_lp_solution: s.root_lp_solution,
            stats: s.stats,
        })
    }

    fn add_artificial_columns<L: LpBackend>(
        &self,
        s: &mut Search<'_>,
        lp: &mut L,
    ) -> CpmpResult<()> {
        for location in 0..self.instance.nlocations() {
            let var = lp.add_var(
                &format!("Artificial_{location}"),
                s.big_m,
                0.0,
                f64::INFINITY,
                VarKind::Continuous,
            )?;
            lp.add_coef(MasterRow::Assignment(location), var, -1.0)?;
            s.artificials.push(var);
        }
        Ok(())
    }

    fn limit_reached(&self, s: &Search<'_>, start: Instant) -> Option<SolveStatus> {
        if let Some(limit) = self.config.node_limit {
            if s.stats.nodes >= limit {
                return Some(SolveStatus::NodeLimit);
            }
        }
        if let Some(limit) = self.config.time_limit_seconds {
            if start.elapsed().as_secs_f64() >= limit {
                return Some(SolveStatus::TimeLimit);
            }
        }
        None
    }

    /// A subtree whose bound cannot beat the incumbent.
    fn prunable(&self, s: &Search<'_>, bound: f64) -> bool {
        let tol = &self.config.tolerances;
        match &s.incumbent {
            Some(inc) => tol.feas_ceil(bound) >= inc.objective - tol.feastol,
            None => false,
        }
    }

    fn dual_bound(&self, s: &Search<'_>, status: Option<SolveStatus>) -> f64 {
        match status {
            Some(SolveStatus::Optimal) | Some(SolveStatus::FractionalRoot) => {
                s.root_lp_bound.unwrap_or(f64::NEG_INFINITY)
            }
            Some(_) => {
                let open = s
                    .stack
                    .iter()
                    .map(|&id| s.tree.node(id).estimate)
                    .fold(f64::INFINITY, f64::min);
                let inc = s.incumbent.as_ref().map_or(f64::INFINITY, |i| i.objective);
                open.min(inc)
            }
            None => s
                .incumbent
                .as_ref()
                .map_or(f64::INFINITY, |i| i.objective),
        }
    }

    /// Make `node` the current node: leave nodes off its path, enter it.
    fn switch_to<L: LpBackend>(&mut self, s: &mut Search<'_>, lp: &mut L, node: NodeId) {
        let parent = s.tree.node(node).parent;
        while s.active.last().copied() != parent {
            let Some(left) = s.active.pop() else {
                unreachable!("parent of node {node} is not on the active path");
            };
            self.leave(s, lp, left);
        }

        lp.push_scope();
        s.active.push(node);
        s.tree.set_current(node);
        if let Some(cons) = s.tree.node_mut(node).cons.as_mut() {
            if let Activation::Repropagate(id) = self.conshdlr.activate(cons, &mut s.ctx) {
                debug!(node = %id, "constraint needs propagation");
            }
        }
    }

    fn leave<L: LpBackend>(&mut self, s: &mut Search<'_>, lp: &mut L, node: NodeId) {
        if let Some(cons) = s.tree.node_mut(node).cons.as_mut() {
            self.conshdlr.deactivate(cons, &mut s.ctx);
        }
        lp.pop_scope();
        s.tree.discard(node);
    }

    /// Propagate every active constraint that asks for it. Returns `true`
    /// on cutoff.
    fn propagate_active<L: LpBackend>(&mut self, s: &mut Search<'_>, lp: &mut L) -> bool {
        for i in 0..s.active.len() {
            let id = s.active[i];
            let Some(cons) = s.tree.node_mut(id).cons.as_mut() else {
                continue;
            };
            match self.conshdlr.propagate(cons, &s.ctx, lp) {
                PropagationResult::Cutoff => return true,
                PropagationResult::ReducedDom { nfixed } => s.stats.fixings += nfixed,
                PropagationResult::DidNotRun | PropagationResult::DidNotFind => {}
            }
        }
        false
    }

    fn process_node<L: LpBackend>(
        &mut self,
        s: &mut Search<'_>,
        lp: &mut L,
        node: NodeId,
    ) -> CpmpResult<NodeOutcome> {
        if self.propagate_active(s, lp) {
            debug!(%node, "cut off by propagation");
            return Ok(NodeOutcome::Cutoff);
        }

        let Some(cg) = self.column_generation(s, lp, node)? else {
            debug!(%node, "infeasible");
            return Ok(NodeOutcome::Infeasible);
        };

        let is_root = node == s.tree.root();
        if is_root {
            s.root_lp_bound = Some(cg.bound);
            s.root_lp_solution = s
                .ctx
                .master
                .values(&*lp)
                .filter(|(_, v)| self.config.tolerances.is_feas_positive(*v))
                .map(|(pv, value)| PatternValue {
                    name: pv.name.clone(),
                    median: pv.pattern.median(),
                    locations: pv.pattern.locations().to_vec(),
                    value,
                })
                .collect();
            info!(bound = cg.bound, columns = s.ctx.master.len(), "root LP solved");
        }

        if self.config.solve_integer {
            if let Some(clusters) = round_lp_solution(&s.ctx, &*lp) {
                self.offer_incumbent(s, clusters, "rounding");
            }
        }

        let tol = self.config.tolerances;
        let bound = if cg.converged {
            tol.feas_ceil(cg.bound)
        } else {
            s.tree.node(node).estimate
        };
        if self.prunable(s, bound) {
            debug!(%node, bound, "pruned by bound");
            return Ok(NodeOutcome::Cutoff);
        }

        let result = if self.config.solve_integer && self.config.semiassign_branching {
            self.branchrule.branch(&s.ctx, &*lp, &mut s.tree)
        } else {
            let assignments = compute_assignments(&s.ctx, &*lp);
            let sorted: Vec<_> = assignments.iter().map(|a| sort_medians(a)).collect();
            match choose_location(&s.ctx, &assignments, &sorted) {
                None => BranchResult::DidNotFind,
                Some(location) => {
                    debug!(location, "fractional LP solution, not branching");
                    return Ok(NodeOutcome::Stop);
                }
            }
        };

        match result {
            BranchResult::DidNotFind => {
                if !self.active_constraints_hold(s, lp) {
                    warn!(%node, "integral LP solution violates a branching decision");
                }
                self.update_incumbent(s, lp);
                if !self.config.solve_integer {
                    return Ok(NodeOutcome::Stop);
                }
                Ok(NodeOutcome::Integral)
            }
            BranchResult::Branched { location, .. } => {
                let children = s.tree.take_fresh();
                debug!(%node, location, bound, children = children.len(), "branched");
                for &child in children.iter().rev() {
                    s.tree.node_mut(child).estimate = bound;
                    s.stack.push(child);
                }
                Ok(NodeOutcome::Branched)
            }
        }
    }

    /// Run column generation at the current node. `None` if the node's LP
    /// is infeasible.
    fn column_generation<L: LpBackend>(
        &mut self,
        s: &mut Search<'_>,
        lp: &mut L,
        node: NodeId,
    ) -> CpmpResult<Option<ColumnGeneration>> {
        let tol = self.config.tolerances;
        let mut rounds = 0;

        loop {
            let status = lp.solve()?;
            s.stats.lp_solves += 1;

            if rounds >= self.config.max_pricing_rounds {
                warn!(%node, rounds, "pricing round limit reached");
                return Ok(match status {
                    LpStatus::Optimal => Some(ColumnGeneration {
                        bound: self.pattern_objective(s, lp),
                        converged: false,
                    }),
                    LpStatus::Infeasible => None,
                });
            }

            let mode = match status {
                LpStatus::Optimal => PricingMode::ReducedCost,
                LpStatus::Infeasible => PricingMode::Farkas,
            };
            let outcome = self.pricer.price(&mut s.ctx, lp, mode)?;
            s.stats.pricing_rounds += 1;
            if mode == PricingMode::Farkas {
                s.stats.farkas_rounds += 1;
            }
            s.stats.columns += outcome.added.len();
            rounds += 1;

            if outcome.found_columns() {
                continue;
            }

            match status {
                LpStatus::Infeasible => return Ok(None),
                LpStatus::Optimal => {
                    let in_use = s.artificials.iter().any(|&a| {
                        tol.is_feas_positive(lp.value(a)) && !tol.is_feas_zero(lp.ub_local(a))
                    });
                    if !in_use {
                        return Ok(Some(ColumnGeneration {
                            bound: self.pattern_objective(s, lp),
                            converged: true,
                        }));
                    }
                    debug!(%node, "artificial columns in use, switching to Farkas pricing");
                    for &a in &s.artificials {
                        lp.fix_var(a, 0.0);
                    }
                }
            }
        }
    }

    fn active_constraints_hold<L: LpBackend>(&self, s: &Search<'_>, lp: &L) -> bool {
        s.active.iter().all(|&id| match &s.tree.node(id).cons {
            Some(cons) => self.conshdlr.check(cons, &s.ctx, lp),
            None => true,
        })
    }

    /// LP objective with the artificial columns' share removed.
    fn pattern_objective<L: LpBackend>(&self, s: &Search<'_>, lp: &L) -> f64 {
        let artificial: f64 = s.artificials.iter().map(|&a| s.big_m * lp.value(a)).sum();
        lp.objective() - artificial
    }

    /// Read the clustering off an integral LP solution.
    fn update_incumbent<L: LpBackend>(&self, s: &mut Search<'_>, lp: &L) {
        let tol = self.config.tolerances;
        let assignments = compute_assignments(&s.ctx, lp);
        let n = self.instance.nlocations();

        let mut members: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (location, row) in assignments.iter().enumerate() {
            let served = |&a: &f64| a >= 1.0 - tol.feastol;
            // An open median stays in its own cluster even if another
            // selected cluster covers it as well.
            let median = if served(&row[location]) {
                Some(location)
            } else {
                row.iter().position(|a| served(a))
            };
            match median {
                Some(median) => members[median].push(location),
                None => {
                    warn!(location, "integral LP solution leaves location unassigned");
                    return;
                }
            }
        }

        let clusters: Vec<Pattern> = members
            .into_iter()
            .enumerate()
            .filter(|(_, locs)| !locs.is_empty())
            .map(|(median, locs)| Pattern::new(self.instance, median, locs))
            .collect();
        self.offer_incumbent(s, clusters, "LP");
    }

    fn offer_incumbent(&self, s: &mut Search<'_>, clusters: Vec<Pattern>, source: &str) {
        debug_assert!(clusters.iter().all(|c| c.respects_capacity(self.instance)));
        debug_assert!(clusters.len() <= self.instance.nclusters());
        let objective = clusters.iter().map(|c| c.cost()).sum::<u64>() as f64;

        let improves = s
            .incumbent
            .as_ref()
            .map_or(true, |inc| objective < inc.objective - self.config.tolerances.feastol);
        if improves {
            info!(objective, clusters = clusters.len(), source, "new incumbent");
            s.incumbent = Some(Incumbent {
                objective,
                clusters,
            });
        }
    }
}
