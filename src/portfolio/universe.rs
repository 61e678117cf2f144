//! # Asset Universe
//!
//! $$
//! \Sigma_{ij} = \frac{1}{M-1}\sum_{t=1}^{M} (r_{it}-\bar r_i)(r_{jt}-\bar r_j)
//! $$
//!
//! Immutable return history with a cached sample covariance matrix and the
//! annualized statistics every optimization objective is built from.

use tracing::debug;

use super::PortfolioError;

pub(crate) fn sample_mean(xs: &[f64]) -> f64 {
  if xs.is_empty() {
    0.0
  } else {
    xs.iter().sum::<f64>() / xs.len() as f64
  }
}

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
  a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

pub(crate) fn mat_vec_mul(mat: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
  mat
    .iter()
    .map(|row| row.iter().zip(v.iter()).map(|(a, b)| a * b).sum())
    .collect()
}

fn sample_covariance(returns: &[Vec<f64>]) -> Vec<Vec<f64>> {
  let n = returns.len();
  let m = returns.first().map(|r| r.len()).unwrap_or(0);
  let means: Vec<f64> = returns.iter().map(|r| sample_mean(r)).collect();
  let mut cov = vec![vec![0.0; n]; n];

  for i in 0..n {
    for j in i..n {
      let mut acc = 0.0;
      for t in 0..m {
        acc += (returns[i][t] - means[i]) * (returns[j][t] - means[j]);
      }
      let c = acc / (m - 1) as f64;
      cov[i][j] = c;
      cov[j][i] = c;
    }
  }

  cov
}

/// Fixed set of assets and their per-period return history.
///
/// Constructed once per optimization session and never mutated; it is safe to
/// share across threads and run queries against concurrently.
#[derive(Clone, Debug)]
pub struct AssetUniverse {
  tickers: Vec<String>,
  returns: Vec<Vec<f64>>,
  frequency: usize,
  covariance: Vec<Vec<f64>>,
  mu_ann: Vec<f64>,
}

impl AssetUniverse {
  /// Validate the return history and cache the sample covariance.
  pub fn new(
    tickers: Vec<String>,
    returns: Vec<Vec<f64>>,
    frequency: usize,
  ) -> Result<Self, PortfolioError> {
    if tickers.len() < 2 {
      return Err(PortfolioError::InvalidUniverse(format!(
        "at least two assets are required, got {}",
        tickers.len()
      )));
    }
    if returns.len() != tickers.len() {
      return Err(PortfolioError::InvalidUniverse(format!(
        "{} tickers but {} return rows",
        tickers.len(),
        returns.len()
      )));
    }
    if frequency == 0 {
      return Err(PortfolioError::InvalidUniverse(
        "annualization frequency must be positive".to_string(),
      ));
    }

    let m = returns[0].len();
    if m < 2 {
      return Err(PortfolioError::InvalidUniverse(format!(
        "at least two observations per asset are required, got {}",
        m
      )));
    }
    for (i, row) in returns.iter().enumerate() {
      if row.len() != m {
        return Err(PortfolioError::InvalidUniverse(format!(
          "return rows have unequal lengths ({} vs {} at row {})",
          m,
          row.len(),
          i
        )));
      }
    }

    let covariance = sample_covariance(&returns);
    let mu_ann: Vec<f64> = returns
      .iter()
      .map(|row| row.iter().sum::<f64>() * frequency as f64)
      .collect();

    debug!(
      "constructed asset universe with {} assets and {} observations each",
      tickers.len(),
      m
    );

    Ok(Self {
      tickers,
      returns,
      frequency,
      covariance,
      mu_ann,
    })
  }

  pub fn tickers(&self) -> &[String] {
    &self.tickers
  }

  pub fn frequency(&self) -> usize {
    self.frequency
  }

  pub fn covariance(&self) -> &[Vec<f64>] {
    &self.covariance
  }

  pub fn n_assets(&self) -> usize {
    self.tickers.len()
  }

  pub fn n_observations(&self) -> usize {
    self.returns[0].len()
  }

  /// Annualized per-asset return contributions, `frequency` times the
  /// row-wise sum of each asset's return history.
  pub(crate) fn mu_ann(&self) -> &[f64] {
    &self.mu_ann
  }

  /// Annualized portfolio return, `frequency * sum_t (w . r_t)`.
  pub fn annualized_return(&self, weights: &[f64]) -> f64 {
    dot(weights, &self.mu_ann)
  }

  /// Per-period portfolio variance `w' Sigma w`.
  pub fn variance(&self, weights: &[f64]) -> f64 {
    let sigma_w = mat_vec_mul(&self.covariance, weights);
    dot(weights, &sigma_w)
  }

  pub fn annualized_variance(&self, weights: &[f64]) -> f64 {
    self.variance(weights) * self.frequency as f64
  }

  pub fn annualized_std_dev(&self, weights: &[f64]) -> f64 {
    self.annualized_variance(weights).max(0.0).sqrt()
  }

  /// Largest single-asset variance; zero means no feasible portfolio can
  /// carry any variance at all.
  pub(crate) fn max_asset_variance(&self) -> f64 {
    (0..self.covariance.len())
      .map(|i| self.covariance[i][i])
      .fold(0.0, f64::max)
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_relative_eq;

  use super::*;
  use crate::portfolio::PortfolioError;

  fn two_asset_universe() -> AssetUniverse {
    AssetUniverse::new(
      vec!["AAA".to_string(), "BBB".to_string()],
      vec![vec![0.01, 0.03], vec![0.02, 0.00]],
      12,
    )
    .unwrap()
  }

  #[test]
  fn rejects_single_asset() {
    let err = AssetUniverse::new(vec!["AAA".to_string()], vec![vec![0.01, 0.02]], 12).unwrap_err();
    assert!(matches!(err, PortfolioError::InvalidUniverse(_)));
  }

  #[test]
  fn rejects_single_observation() {
    let err = AssetUniverse::new(
      vec!["AAA".to_string(), "BBB".to_string()],
      vec![vec![0.01], vec![0.02]],
      12,
    )
    .unwrap_err();
    assert!(matches!(err, PortfolioError::InvalidUniverse(_)));
  }

  #[test]
  fn rejects_shape_mismatch() {
    let err = AssetUniverse::new(
      vec!["AAA".to_string(), "BBB".to_string()],
      vec![vec![0.01, 0.02]],
      12,
    )
    .unwrap_err();
    assert!(matches!(err, PortfolioError::InvalidUniverse(_)));

    let err = AssetUniverse::new(
      vec!["AAA".to_string(), "BBB".to_string()],
      vec![vec![0.01, 0.02], vec![0.02, 0.00, 0.01]],
      12,
    )
    .unwrap_err();
    assert!(matches!(err, PortfolioError::InvalidUniverse(_)));
  }

  #[test]
  fn rejects_zero_frequency() {
    let err = AssetUniverse::new(
      vec!["AAA".to_string(), "BBB".to_string()],
      vec![vec![0.01, 0.02], vec![0.02, 0.00]],
      0,
    )
    .unwrap_err();
    assert!(matches!(err, PortfolioError::InvalidUniverse(_)));
  }

  #[test]
  fn covariance_matches_hand_computation() {
    let universe = two_asset_universe();
    let cov = universe.covariance();

    assert_relative_eq!(cov[0][0], 2e-4, epsilon = 1e-12);
    assert_relative_eq!(cov[1][1], 2e-4, epsilon = 1e-12);
    assert_relative_eq!(cov[0][1], -2e-4, epsilon = 1e-12);
    assert_relative_eq!(cov[1][0], -2e-4, epsilon = 1e-12);
  }

  #[test]
  fn annualized_return_scales_row_sums() {
    let universe = two_asset_universe();
    // row sums 0.04 and 0.02, frequency 12
    let w = vec![0.5, 0.5];
    assert_relative_eq!(universe.annualized_return(&w), 12.0 * 0.03, epsilon = 1e-12);
  }

  #[test]
  fn annualized_std_dev_squares_to_variance() {
    let universe = two_asset_universe();
    let w = vec![0.3, 0.7];
    let sd = universe.annualized_std_dev(&w);
    assert_relative_eq!(sd * sd, universe.annualized_variance(&w), epsilon = 1e-12);
  }
}
