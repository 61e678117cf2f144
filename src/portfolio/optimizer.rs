//! # Portfolio Optimizer
//!
//! $$
//! \min_{\mathbf{w}}\ -\frac{\mathbb E[R_p]-r_f}{\sigma_p}
//! \quad\text{s.t.}\quad \sum_i w_i = 1,\ \ l \le w_i \le u
//! $$
//!
//! Constrained mean-variance queries over an [`AssetUniverse`]: maximum
//! Sharpe, minimum variance, target-return and target-variance portfolios,
//! and the efficient frontier spanning them.
//!
//! Every solve runs a derivative-free Nelder-Mead search in unconstrained
//! softmax coordinates: candidates map through a shift-stabilized softmax
//! onto the budget hyperplane, weights escaping the box are charged a
//! quadratic penalty, and the best iterate is snapped into the box after
//! the solve. The Sharpe objective is non-convex in the weights; the
//! contract is a deterministic local optimum from the uniform start (the
//! softmax origin), with solver success reported through
//! [`PortfolioResult::converged`].

use argmin::core::CostFunction;
use argmin::core::Executor;
use argmin::core::TerminationReason;
use argmin::core::TerminationStatus;
use argmin::solver::neldermead::NelderMead;
use ndarray::Array1;
use ordered_float::OrderedFloat;
use roots::find_root_brent;
use roots::SimpleConvergency;
use tracing::info;
use tracing::warn;

use super::types::AllocationRow;
use super::types::PortfolioResult;
use super::types::PortfolioSummary;
use super::types::WeightBounds;
use super::universe::dot;
use super::universe::AssetUniverse;
use super::PortfolioError;

/// Number of efficient-frontier points swept by default.
pub const DEFAULT_FRONTIER_POINTS: usize = 25;

const MAX_ITERS: u64 = 5000;
const SD_TOLERANCE: f64 = 1e-12;
const BOX_PENALTY: f64 = 1e6;
const VOL_FLOOR: f64 = 1e-15;
const PENALIZED_COST: f64 = 1e12;
const PROJECTION_ROUNDS: usize = 64;
const BUDGET_TOL: f64 = 1e-12;
const TARGET_FEASIBILITY_TOL: f64 = 1e-9;

/// Map unconstrained solver coordinates onto the unit simplex.
///
/// Shift-stabilized so large coordinates cannot overflow the exponentials;
/// the origin maps to the uniform portfolio.
fn softmax(x: &[f64]) -> Vec<f64> {
  let max_x = x.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
  let exps: Vec<f64> = x.iter().map(|&v| (v - max_x).exp()).collect();
  let sum: f64 = exps.iter().sum();
  if sum < 1e-15 {
    return vec![1.0 / x.len() as f64; x.len()];
  }
  exps.iter().map(|&e| e / sum).collect()
}

/// Quadratic charge for weights that escape the box. Zero everywhere on the
/// long-only box, whose interior the softmax image never leaves.
fn box_penalty(w: &[f64], bounds: WeightBounds) -> f64 {
  w.iter()
    .map(|&v| {
      let below = (bounds.lower - v).max(0.0);
      let above = (v - bounds.upper).max(0.0);
      below * below + above * above
    })
    .sum()
}

/// Clamp a candidate into the weight box, then redistribute the budget
/// deficit or surplus proportionally to each asset's remaining slack until
/// the weights sum to one. Deterministic, and exact on the box.
fn project_box_simplex(x: &[f64], bounds: WeightBounds) -> Vec<f64> {
  let mut w: Vec<f64> = x
    .iter()
    .map(|&v| v.clamp(bounds.lower, bounds.upper))
    .collect();

  for _ in 0..PROJECTION_ROUNDS {
    let gap = 1.0 - w.iter().sum::<f64>();
    if gap.abs() <= BUDGET_TOL {
      break;
    }

    if gap > 0.0 {
      let slack: f64 = w.iter().map(|&v| bounds.upper - v).sum();
      if slack <= f64::EPSILON {
        break;
      }
      let scale = (gap / slack).min(1.0);
      for v in w.iter_mut() {
        *v += (bounds.upper - *v) * scale;
      }
    } else {
      let slack: f64 = w.iter().map(|&v| v - bounds.lower).sum();
      if slack <= f64::EPSILON {
        break;
      }
      let scale = ((-gap) / slack).min(1.0);
      for v in w.iter_mut() {
        *v -= (*v - bounds.lower) * scale;
      }
    }
  }

  w
}

fn blend(a: &[f64], b: &[f64], t: f64) -> Vec<f64> {
  a.iter()
    .zip(b.iter())
    .map(|(&x, &y)| (1.0 - t) * x + t * y)
    .collect()
}

fn bounds_feasible(n: usize, bounds: WeightBounds) -> bool {
  bounds.is_well_formed()
    && n as f64 * bounds.lower <= 1.0 + BUDGET_TOL
    && n as f64 * bounds.upper >= 1.0 - BUDGET_TOL
}

fn reparam_simplex(n: usize) -> Vec<Vec<f64>> {
  let origin = vec![0.0; n];
  let mut simplex = Vec::with_capacity(n + 1);
  simplex.push(origin.clone());
  for i in 0..n {
    let mut vertex = origin.clone();
    vertex[i] = 1.0;
    simplex.push(vertex);
  }
  simplex
}

/// Run Nelder-Mead in the softmax coordinates from the origin (the uniform
/// portfolio) and report the best coordinates together with whether the
/// solver terminated by simplex convergence.
fn run_nelder_mead<C>(cost: C, n: usize) -> (Vec<f64>, bool)
where
  C: CostFunction<Param = Vec<f64>, Output = f64>,
{
  let origin = vec![0.0; n];

  match NelderMead::new(reparam_simplex(n)).with_sd_tolerance(SD_TOLERANCE) {
    Ok(solver) => {
      match Executor::new(cost, solver)
        .configure(|state| state.max_iters(MAX_ITERS))
        .run()
      {
        Ok(res) => {
          let converged = matches!(
            res.state.termination_status,
            TerminationStatus::Terminated(TerminationReason::SolverConverged)
          );
          (res.state.best_param.unwrap_or(origin), converged)
        }
        Err(_) => (origin, false),
      }
    }
    Err(_) => (origin, false),
  }
}

fn negative_sharpe_or_penalty(universe: &AssetUniverse, w: &[f64], risk_free: f64) -> f64 {
  let sd = universe.annualized_std_dev(w);
  if sd <= VOL_FLOOR {
    return PENALIZED_COST;
  }
  -(universe.annualized_return(w) - risk_free) / sd
}

/// Move a feasible candidate onto the target-return hyperplane by convex
/// blending toward the extreme min- or max-return portfolio. Exact because
/// the annualized return is linear in the weights.
fn retarget_return(
  w: Vec<f64>,
  target: f64,
  mu_ann: &[f64],
  w_min: &[f64],
  w_max: &[f64],
) -> Vec<f64> {
  let r = dot(&w, mu_ann);
  let gap = target - r;
  if gap.abs() <= 1e-14 {
    return w;
  }

  if gap > 0.0 {
    let denom = dot(w_max, mu_ann) - r;
    if denom <= f64::EPSILON {
      return w_max.to_vec();
    }
    blend(&w, w_max, (gap / denom).clamp(0.0, 1.0))
  } else {
    let denom = dot(w_min, mu_ann) - r;
    if denom >= -f64::EPSILON {
      return w_min.to_vec();
    }
    blend(&w, w_min, (gap / denom).clamp(0.0, 1.0))
  }
}

struct SharpeCost {
  universe: AssetUniverse,
  bounds: WeightBounds,
  risk_free: f64,
  penalty: f64,
}

impl CostFunction for SharpeCost {
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
    let w = softmax(x);
    Ok(
      negative_sharpe_or_penalty(&self.universe, &w, self.risk_free)
        + self.penalty * box_penalty(&w, self.bounds),
    )
  }
}

struct MinVarianceCost {
  universe: AssetUniverse,
  bounds: WeightBounds,
  penalty: f64,
}

impl CostFunction for MinVarianceCost {
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
    let w = softmax(x);
    Ok(self.universe.variance(&w) + self.penalty * box_penalty(&w, self.bounds))
  }
}

struct TargetReturnCost {
  universe: AssetUniverse,
  bounds: WeightBounds,
  risk_free: f64,
  target: f64,
  penalty: f64,
  w_min: Vec<f64>,
  w_max: Vec<f64>,
}

impl CostFunction for TargetReturnCost {
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
    let w = retarget_return(
      softmax(x),
      self.target,
      self.universe.mu_ann(),
      &self.w_min,
      &self.w_max,
    );
    Ok(
      negative_sharpe_or_penalty(&self.universe, &w, self.risk_free)
        + self.penalty * box_penalty(&w, self.bounds),
    )
  }
}

struct TargetVarianceCost {
  universe: AssetUniverse,
  bounds: WeightBounds,
  target: f64,
  penalty: f64,
}

impl CostFunction for TargetVarianceCost {
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
    let w = softmax(x);
    let diff = self.universe.variance(&w) - self.target;
    Ok(diff * diff + self.penalty * box_penalty(&w, self.bounds))
  }
}

/// Mean-variance optimizer over an immutable asset universe.
///
/// All queries are side-effect-free `&self` calls and safe to run
/// concurrently against the same instance.
#[derive(Clone, Debug)]
pub struct PortfolioOptimizer {
  universe: AssetUniverse,
}

impl PortfolioOptimizer {
  /// Validate the inputs and build the optimizer.
  pub fn new(
    tickers: Vec<String>,
    returns: Vec<Vec<f64>>,
    frequency: usize,
  ) -> Result<Self, PortfolioError> {
    Ok(Self {
      universe: AssetUniverse::new(tickers, returns, frequency)?,
    })
  }

  pub fn from_universe(universe: AssetUniverse) -> Self {
    Self { universe }
  }

  pub fn universe(&self) -> &AssetUniverse {
    &self.universe
  }

  /// Portfolio with the highest Sharpe ratio reachable from the uniform
  /// start.
  ///
  /// Minimizes the negative Sharpe ratio subject to the budget and box
  /// constraints. The objective is non-convex, so the result is a local
  /// optimum; different starting points may yield different optima, and the
  /// deterministic uniform start is the reproducible default.
  pub fn max_sharpe(
    &self,
    risk_free: f64,
    bounds: WeightBounds,
  ) -> Result<PortfolioResult, PortfolioError> {
    self.ensure_solvable()?;
    if let Some(result) = self.reject_infeasible_bounds(bounds, risk_free)? {
      return Ok(result);
    }

    let cost = SharpeCost {
      universe: self.universe.clone(),
      bounds,
      risk_free,
      penalty: BOX_PENALTY,
    };
    let (best, converged) = run_nelder_mead(cost, self.universe.n_assets());
    if !converged {
      warn!("maximum Sharpe optimization stopped before convergence");
    }

    self.assemble(
      project_box_simplex(&softmax(&best), bounds),
      risk_free,
      converged,
    )
  }

  /// Portfolio with the lowest per-period variance.
  ///
  /// A convex sub-problem under box bounds; `risk_free` only populates the
  /// Sharpe field of the result and does not affect the weights.
  pub fn min_variance(
    &self,
    bounds: WeightBounds,
    risk_free: f64,
  ) -> Result<PortfolioResult, PortfolioError> {
    self.ensure_solvable()?;
    if let Some(result) = self.reject_infeasible_bounds(bounds, risk_free)? {
      return Ok(result);
    }

    let (weights, converged) = self.solve_min_variance_weights(bounds);
    if !converged {
      warn!("minimum variance optimization stopped before convergence");
    }

    self.assemble(weights, risk_free, converged)
  }

  /// Portfolio matching a target return or a target variance.
  ///
  /// Exactly one target must be supplied. A return target constrains the
  /// annualized return while minimizing the negative Sharpe ratio; a
  /// variance target is matched against the per-period variance `w' Sigma w`
  /// (the result record still reports annualized variance). Targets outside
  /// the feasible range come back with `converged = false` and the closest
  /// boundary portfolio rather than an error.
  pub fn optimize_for_target(
    &self,
    target_return: Option<f64>,
    target_variance: Option<f64>,
    risk_free: f64,
    bounds: WeightBounds,
  ) -> Result<PortfolioResult, PortfolioError> {
    match (target_return, target_variance) {
      (Some(_), Some(_)) | (None, None) => Err(PortfolioError::AmbiguousTarget),
      (Some(target), None) => self.solve_target_return(target, risk_free, bounds),
      (None, Some(target)) => self.solve_target_variance(target, risk_free, bounds),
    }
  }

  /// Efficient frontier as `num_points` portfolios with ascending target
  /// returns from `r_min - s_min` to the max-Sharpe return.
  ///
  /// The sweep deliberately starts one standard deviation below the
  /// min-variance return; targets on that stretch are infeasible and come
  /// back boundary-clamped with `converged = false`, which keeps the
  /// sequence deterministic and non-decreasing in expected return.
  pub fn frontier(
    &self,
    risk_free: f64,
    bounds: WeightBounds,
    num_points: usize,
  ) -> Result<Vec<PortfolioResult>, PortfolioError> {
    if num_points == 0 {
      return Ok(Vec::new());
    }

    let min_var = self.min_variance(bounds, risk_free)?;
    let max_sharpe = self.max_sharpe(risk_free, bounds)?;
    let start = min_var.expected_return - min_var.std_dev;
    let end = max_sharpe.expected_return;
    info!(
      "sweeping {} frontier targets from {:.6} to {:.6}",
      num_points, start, end
    );

    let mut points = Vec::with_capacity(num_points);
    for &target in Array1::linspace(start, end, num_points).iter() {
      points.push(self.optimize_for_target(Some(target), None, risk_free, bounds)?);
    }

    Ok(points)
  }

  /// Max-Sharpe and min-variance portfolios with a per-ticker side-by-side
  /// weight comparison.
  pub fn summary(
    &self,
    risk_free: f64,
    bounds: WeightBounds,
  ) -> Result<PortfolioSummary, PortfolioError> {
    let min_variance = self.min_variance(bounds, risk_free)?;
    let max_sharpe = self.max_sharpe(risk_free, bounds)?;

    let allocations = self
      .universe
      .tickers()
      .iter()
      .enumerate()
      .map(|(i, ticker)| AllocationRow {
        ticker: ticker.clone(),
        max_sharpe_weight: max_sharpe.weights[i],
        min_variance_weight: min_variance.weights[i],
      })
      .collect();

    Ok(PortfolioSummary {
      max_sharpe,
      min_variance,
      allocations,
    })
  }

  fn uniform_weights(&self) -> Vec<f64> {
    let n = self.universe.n_assets();
    vec![1.0 / n as f64; n]
  }

  fn ensure_solvable(&self) -> Result<(), PortfolioError> {
    if self.universe.max_asset_variance() <= VOL_FLOOR {
      return Err(PortfolioError::DegenerateVariance);
    }
    Ok(())
  }

  /// Infeasible boxes are reported in-band: the clamped uniform portfolio
  /// with `converged = false`. Malformed boxes (reversed or non-finite
  /// edges) clamp against the long-only box instead of panicking.
  fn reject_infeasible_bounds(
    &self,
    bounds: WeightBounds,
    risk_free: f64,
  ) -> Result<Option<PortfolioResult>, PortfolioError> {
    if bounds_feasible(self.universe.n_assets(), bounds) {
      return Ok(None);
    }
    warn!(
      "weight bounds [{}, {}] cannot hold a fully invested portfolio of {} assets",
      bounds.lower,
      bounds.upper,
      self.universe.n_assets()
    );
    let safe = if bounds.is_well_formed() {
      bounds
    } else {
      WeightBounds::long_only()
    };
    let clamped = project_box_simplex(&self.uniform_weights(), safe);
    self.assemble(clamped, risk_free, false).map(Some)
  }

  fn solve_min_variance_weights(&self, bounds: WeightBounds) -> (Vec<f64>, bool) {
    let cost = MinVarianceCost {
      universe: self.universe.clone(),
      bounds,
      penalty: BOX_PENALTY,
    };
    let (best, converged) = run_nelder_mead(cost, self.universe.n_assets());
    (project_box_simplex(&softmax(&best), bounds), converged)
  }

  fn solve_target_return(
    &self,
    target: f64,
    risk_free: f64,
    bounds: WeightBounds,
  ) -> Result<PortfolioResult, PortfolioError> {
    self.ensure_solvable()?;
    if let Some(result) = self.reject_infeasible_bounds(bounds, risk_free)? {
      return Ok(result);
    }

    let (w_min, r_lo, w_max, r_hi) = self.extreme_return_portfolios(bounds);
    if target < r_lo - TARGET_FEASIBILITY_TOL || target > r_hi + TARGET_FEASIBILITY_TOL {
      warn!(
        "target return {:.6} outside feasible range [{:.6}, {:.6}]",
        target, r_lo, r_hi
      );
      let clamped = if target < r_lo { w_min } else { w_max };
      return self.assemble(clamped, risk_free, false);
    }

    let cost = TargetReturnCost {
      universe: self.universe.clone(),
      bounds,
      risk_free,
      target,
      penalty: BOX_PENALTY,
      w_min: w_min.clone(),
      w_max: w_max.clone(),
    };
    let (best, converged) = run_nelder_mead(cost, self.universe.n_assets());
    let weights = retarget_return(
      project_box_simplex(&softmax(&best), bounds),
      target,
      self.universe.mu_ann(),
      &w_min,
      &w_max,
    );

    self.assemble(weights, risk_free, converged)
  }

  fn solve_target_variance(
    &self,
    target: f64,
    risk_free: f64,
    bounds: WeightBounds,
  ) -> Result<PortfolioResult, PortfolioError> {
    self.ensure_solvable()?;
    if let Some(result) = self.reject_infeasible_bounds(bounds, risk_free)? {
      return Ok(result);
    }

    let cost = TargetVarianceCost {
      universe: self.universe.clone(),
      bounds,
      target,
      penalty: BOX_PENALTY,
    };
    let (best, nm_converged) = run_nelder_mead(cost, self.universe.n_assets());
    let mut weights = project_box_simplex(&softmax(&best), bounds);
    weights = self.polish_variance(weights, target, bounds);

    let achieved = self.universe.variance(&weights);
    let hit = variance_target_hit(achieved, target);
    if !hit {
      warn!(
        "target variance {:.6e} not attainable, closest achieved {:.6e}",
        target, achieved
      );
    }

    self.assemble(weights, risk_free, nm_converged && hit)
  }

  /// Refine a variance-targeted candidate by Brent root-finding along the
  /// segment toward a feasible anchor on the other side of the target.
  fn polish_variance(&self, weights: Vec<f64>, target: f64, bounds: WeightBounds) -> Vec<f64> {
    let achieved = self.universe.variance(&weights);
    if variance_target_hit(achieved, target) {
      return weights;
    }

    let anchor = if achieved > target {
      let (w_mv, _) = self.solve_min_variance_weights(bounds);
      if self.universe.variance(&w_mv) > target {
        return weights;
      }
      w_mv
    } else {
      let w_hv = self.high_variance_portfolio(bounds);
      if self.universe.variance(&w_hv) < target {
        return weights;
      }
      w_hv
    };

    let g = |t: f64| {
      let candidate = blend(&weights, &anchor, t);
      self.universe.variance(&candidate) - target
    };
    let mut convergency = SimpleConvergency {
      eps: 1e-12,
      max_iter: 128,
    };
    match find_root_brent(0.0, 1.0, g, &mut convergency) {
      Ok(t) => blend(&weights, &anchor, t.clamp(0.0, 1.0)),
      Err(_) => weights,
    }
  }

  /// Extreme feasible portfolios and returns for the current box: greedy
  /// bang-bang fills ordered by annualized asset return.
  fn extreme_return_portfolios(&self, bounds: WeightBounds) -> (Vec<f64>, f64, Vec<f64>, f64) {
    let mu = self.universe.mu_ann();
    let n = mu.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&i| OrderedFloat(mu[i]));

    let w_min = greedy_fill(&order, n, bounds);
    let reversed: Vec<usize> = order.iter().rev().copied().collect();
    let w_max = greedy_fill(&reversed, n, bounds);

    let r_lo = dot(&w_min, mu);
    let r_hi = dot(&w_max, mu);
    (w_min, r_lo, w_max, r_hi)
  }

  /// Highest-variance bang-bang portfolio among single-asset-seeded greedy
  /// fills; exact for the long-only box, a close anchor otherwise.
  fn high_variance_portfolio(&self, bounds: WeightBounds) -> Vec<f64> {
    let cov = self.universe.covariance();
    let n = cov.len();
    let mut by_var: Vec<usize> = (0..n).collect();
    by_var.sort_by_key(|&i| OrderedFloat(cov[i][i]));
    by_var.reverse();

    let mut best: Option<(f64, Vec<f64>)> = None;
    for seed in 0..n {
      let mut order = vec![seed];
      order.extend(by_var.iter().copied().filter(|&i| i != seed));
      let candidate = greedy_fill(&order, n, bounds);
      let var = self.universe.variance(&candidate);
      if best.as_ref().map(|(v, _)| var > *v).unwrap_or(true) {
        best = Some((var, candidate));
      }
    }

    match best {
      Some((_, w)) => w,
      None => self.uniform_weights(),
    }
  }

  fn assemble(
    &self,
    weights: Vec<f64>,
    risk_free: f64,
    converged: bool,
  ) -> Result<PortfolioResult, PortfolioError> {
    let expected_return = self.universe.annualized_return(&weights);
    let variance = self.universe.annualized_variance(&weights).max(0.0);
    let std_dev = variance.sqrt();
    if std_dev <= VOL_FLOOR {
      return Err(PortfolioError::DegenerateVariance);
    }
    let sharpe_ratio = (expected_return - risk_free) / std_dev;

    Ok(PortfolioResult {
      converged,
      weights,
      sharpe_ratio,
      expected_return,
      variance,
      std_dev,
    })
  }
}

fn greedy_fill(order: &[usize], n: usize, bounds: WeightBounds) -> Vec<f64> {
  let mut w = vec![bounds.lower; n];
  let mut budget = 1.0 - bounds.lower * n as f64;
  for &i in order {
    if budget <= 0.0 {
      break;
    }
    let add = budget.min(bounds.upper - bounds.lower);
    w[i] += add;
    budget -= add;
  }
  w
}

fn variance_target_hit(achieved: f64, target: f64) -> bool {
  (achieved - target).abs() <= f64::max(1e-10, 1e-8 * target.abs())
}
