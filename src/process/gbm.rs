use impl_new_derive::ImplNew;
use ndarray::Array1;
use ndarray_rand::RandomExt;
use rand_distr::Normal;

use crate::traits::ProcessExt;

/// Geometric Brownian motion sampled with the exact log-Euler scheme.
///
/// Each step multiplies by $\exp((\mu - \sigma^2/2)\,dt + \sigma\,dW)$, so
/// paths stay strictly positive for any positive start value.
#[derive(ImplNew)]
pub struct GBM {
  pub mu: f64,
  pub sigma: f64,
  pub n: usize,
  pub x0: Option<f64>,
  pub t: Option<f64>,
}

impl ProcessExt for GBM {
  type Output = Array1<f64>;

  fn sample(&self) -> Self::Output {
    let dt = self.t.unwrap_or(1.0) / (self.n - 1) as f64;
    let gn = Array1::random(self.n - 1, Normal::new(0.0, dt.sqrt()).unwrap());

    let mut gbm = Array1::<f64>::zeros(self.n);
    gbm[0] = self.x0.unwrap_or(1.0);

    let drift = (self.mu - 0.5 * self.sigma.powi(2)) * dt;
    for i in 1..self.n {
      gbm[i] = gbm[i - 1] * (drift + self.sigma * gn[i - 1]).exp();
    }

    gbm
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::process::N;
  use crate::process::X0;

  #[test]
  fn gbm_length_equals_n() {
    let gbm = GBM::new(0.25, 0.5, N, Some(X0), Some(1.0));
    assert_eq!(gbm.sample().len(), N);
  }

  #[test]
  fn gbm_starts_with_x0() {
    let gbm = GBM::new(0.25, 0.5, N, Some(X0), Some(1.0));
    assert_eq!(gbm.sample()[0], X0);
  }

  #[test]
  fn gbm_paths_stay_positive() {
    let gbm = GBM::new(0.25, 0.5, N, Some(X0), Some(1.0));
    for value in gbm.sample() {
      assert!(value > 0.0);
    }
  }

  #[test]
  fn gbm_samples_in_parallel() {
    let gbm = GBM::new(0.25, 0.5, N, Some(X0), Some(1.0));
    let paths = gbm.sample_par(4);

    assert_eq!(paths.len(), 4);
    for path in paths {
      assert!(path.iter().all(|&v| v > 0.0));
    }
  }
}
