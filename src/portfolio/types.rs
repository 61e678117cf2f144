//! # Portfolio Types
//!
//! $$
//! \mathbf{w}^{*}=\arg\max_{\mathbf{w}} \frac{\mathbb E[R_p]-r_f}{\sigma_p}
//! $$
//!
//! Result containers and per-call knobs shared by the portfolio queries.

use std::fmt::Display;

use prettytable::row;
use prettytable::Table;

/// Uniform per-asset allocation interval.
///
/// The same closed interval applies to every asset; the default is the
/// long-only, no-leverage box `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightBounds {
  pub lower: f64,
  pub upper: f64,
}

impl WeightBounds {
  pub fn new(lower: f64, upper: f64) -> Self {
    Self { lower, upper }
  }

  pub fn long_only() -> Self {
    Self {
      lower: 0.0,
      upper: 1.0,
    }
  }

  pub fn contains(&self, weight: f64) -> bool {
    weight >= self.lower && weight <= self.upper
  }

  /// Whether both edges are finite and correctly ordered.
  pub fn is_well_formed(&self) -> bool {
    self.lower.is_finite() && self.upper.is_finite() && self.lower <= self.upper
  }
}

impl Default for WeightBounds {
  fn default() -> Self {
    Self::long_only()
  }
}

/// Output of a single portfolio optimization query.
#[derive(Clone, Debug, Default)]
pub struct PortfolioResult {
  /// Whether the solver terminated by convergence. On `false` the weights
  /// are the best available iterate and should be treated as diagnostic.
  pub converged: bool,
  /// Final portfolio weights, summing to one within the bounds.
  pub weights: Vec<f64>,
  /// Sharpe ratio `(expected_return - risk_free) / std_dev`.
  pub sharpe_ratio: f64,
  /// Annualized expected portfolio return.
  pub expected_return: f64,
  /// Annualized portfolio variance.
  pub variance: f64,
  /// Annualized portfolio standard deviation.
  pub std_dev: f64,
}

/// One per-ticker row of the side-by-side summary comparison.
#[derive(Clone, Debug)]
pub struct AllocationRow {
  pub ticker: String,
  pub max_sharpe_weight: f64,
  pub min_variance_weight: f64,
}

/// Max-Sharpe and min-variance portfolios with a per-ticker comparison.
///
/// Rendering rounds weights and statistics to four decimals; the stored
/// results keep full precision.
#[derive(Clone, Debug)]
pub struct PortfolioSummary {
  pub max_sharpe: PortfolioResult,
  pub min_variance: PortfolioResult,
  pub allocations: Vec<AllocationRow>,
}

impl PortfolioSummary {
  /// Per-ticker weight comparison table.
  pub fn allocation_table(&self) -> Table {
    let mut table = Table::new();
    table.add_row(row!["Ticker", "Max Sharpe", "Min Variance"]);
    for alloc in &self.allocations {
      table.add_row(row![
        alloc.ticker,
        format!("{:.4}", alloc.max_sharpe_weight),
        format!("{:.4}", alloc.min_variance_weight)
      ]);
    }
    table
  }

  /// Statistics table with one row per optimal portfolio.
  pub fn statistics_table(&self) -> Table {
    let mut table = Table::new();
    table.add_row(row![
      "Portfolio",
      "Sharpe Ratio",
      "Return",
      "Variance",
      "Std Dev"
    ]);
    for (label, result) in [
      ("Max Sharpe", &self.max_sharpe),
      ("Min Variance", &self.min_variance),
    ] {
      table.add_row(row![
        label,
        format!("{:.4}", result.sharpe_ratio),
        format!("{:.4}", result.expected_return),
        format!("{:.4}", result.variance),
        format!("{:.4}", result.std_dev)
      ]);
    }
    table
  }
}

impl Display for PortfolioSummary {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    writeln!(f, "Allocations:")?;
    write!(f, "{}", self.allocation_table())?;
    writeln!(f, "Summary:")?;
    write!(f, "{}", self.statistics_table())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_bounds_are_long_only() {
    let bounds = WeightBounds::default();
    assert_eq!(bounds.lower, 0.0);
    assert_eq!(bounds.upper, 1.0);
    assert!(bounds.contains(0.5));
    assert!(!bounds.contains(1.5));
  }

  #[test]
  fn reversed_or_nan_bounds_are_malformed() {
    assert!(WeightBounds::new(0.0, 0.4).is_well_formed());
    assert!(!WeightBounds::new(0.7, 0.2).is_well_formed());
    assert!(!WeightBounds::new(f64::NAN, 1.0).is_well_formed());
    assert!(!WeightBounds::new(0.0, f64::INFINITY).is_well_formed());
  }

  #[test]
  fn summary_renders_tickers_and_rounded_weights() {
    let summary = PortfolioSummary {
      max_sharpe: PortfolioResult {
        converged: true,
        weights: vec![0.75, 0.25],
        sharpe_ratio: 1.5,
        expected_return: 0.12,
        variance: 0.04,
        std_dev: 0.2,
      },
      min_variance: PortfolioResult {
        converged: true,
        weights: vec![0.25, 0.75],
        sharpe_ratio: 0.9,
        expected_return: 0.08,
        variance: 0.01,
        std_dev: 0.1,
      },
      allocations: vec![
        AllocationRow {
          ticker: "AAA".to_string(),
          max_sharpe_weight: 0.75,
          min_variance_weight: 0.25,
        },
        AllocationRow {
          ticker: "BBB".to_string(),
          max_sharpe_weight: 0.25,
          min_variance_weight: 0.75,
        },
      ],
    };

    let rendered = summary.to_string();
    println!("{}", rendered);
    assert!(rendered.contains("AAA"));
    assert!(rendered.contains("0.7500"));
    assert!(rendered.contains("Max Sharpe"));
    assert!(rendered.contains("Std Dev"));
  }
}
