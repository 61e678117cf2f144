//! # Portfolio Data Utilities
//!
//! $$
//! r_t = \ln\frac{P_t}{P_{t-1}}
//! $$
//!
//! Helpers that turn raw price series into the aligned return rows an
//! [`AssetUniverse`](super::AssetUniverse) is built from.

/// Convert close prices to log-return series.
///
/// Non-positive prices are skipped, so the output can be shorter than
/// `closes.len() - 1`.
pub fn log_returns_series(closes: &[f64]) -> Vec<f64> {
  let mut out = Vec::with_capacity(closes.len().saturating_sub(1));
  for i in 1..closes.len() {
    if closes[i - 1] > 0.0 && closes[i] > 0.0 {
      out.push((closes[i] / closes[i - 1]).ln());
    }
  }
  out
}

/// Align multiple return series to a common tail length.
///
/// Keeps the most recent observations of each series so every row has the
/// length of the shortest input.
pub fn align_return_series(all_returns: &[Vec<f64>]) -> Vec<Vec<f64>> {
  let min_len = all_returns.iter().map(|r| r.len()).min().unwrap_or(0);
  all_returns
    .iter()
    .map(|r| r[r.len().saturating_sub(min_len)..].to_vec())
    .collect()
}
