//! # Portfolio
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Mean-variance portfolio optimization over a fixed asset universe:
//! maximum-Sharpe and minimum-variance allocations, target-return and
//! target-variance allocations, and the efficient frontier between them.

use std::error::Error;
use std::fmt::Display;

pub mod data;
pub mod optimizer;
pub mod types;
pub mod universe;

pub use data::align_return_series;
pub use data::log_returns_series;
pub use optimizer::PortfolioOptimizer;
pub use optimizer::DEFAULT_FRONTIER_POINTS;
pub use types::AllocationRow;
pub use types::PortfolioResult;
pub use types::PortfolioSummary;
pub use types::WeightBounds;
pub use universe::AssetUniverse;

/// Structural failures of portfolio queries.
///
/// Numerical non-convergence is deliberately not represented here; it is
/// reported in-band through [`PortfolioResult::converged`] so the best
/// available iterate stays inspectable.
#[derive(Clone, Debug)]
pub enum PortfolioError {
  /// The universe cannot support an optimization: fewer than two assets,
  /// fewer than two observations per asset, or a shape mismatch.
  InvalidUniverse(String),
  /// `optimize_for_target` needs exactly one of target return or target
  /// variance.
  AmbiguousTarget,
  /// The queried portfolio has zero annualized standard deviation, so its
  /// Sharpe ratio is undefined.
  DegenerateVariance,
}

impl Display for PortfolioError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      PortfolioError::InvalidUniverse(msg) => write!(f, "invalid asset universe: {}", msg),
      PortfolioError::AmbiguousTarget => write!(
        f,
        "exactly one of target return or target variance must be supplied"
      ),
      PortfolioError::DegenerateVariance => write!(
        f,
        "portfolio standard deviation is zero, Sharpe ratio is undefined"
      ),
    }
  }
}

impl Error for PortfolioError {}
