use impl_new_derive::ImplNew;
use ndarray::Array1;
use ndarray_rand::RandomExt;
use rand_distr::Normal;

use crate::traits::ProcessExt;

/// Arithmetic Brownian motion with drift `mu` and diffusion `sigma`.
#[derive(ImplNew)]
pub struct BM {
  pub mu: f64,
  pub sigma: f64,
  pub n: usize,
  pub x0: Option<f64>,
  pub t: Option<f64>,
}

impl ProcessExt for BM {
  type Output = Array1<f64>;

  fn sample(&self) -> Self::Output {
    let dt = self.t.unwrap_or(1.0) / (self.n - 1) as f64;
    let gn = Array1::random(self.n - 1, Normal::new(0.0, dt.sqrt()).unwrap());

    let mut bm = Array1::<f64>::zeros(self.n);
    bm[0] = self.x0.unwrap_or(0.0);

    for i in 1..self.n {
      bm[i] = bm[i - 1] + self.mu * dt + self.sigma * gn[i - 1];
    }

    bm
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::process::N;
  use crate::process::X0;

  #[test]
  fn bm_length_equals_n() {
    let bm = BM::new(0.05, 0.2, N, Some(X0), Some(1.0));
    assert_eq!(bm.sample().len(), N);
  }

  #[test]
  fn bm_starts_with_x0() {
    let bm = BM::new(0.05, 0.2, N, Some(X0), Some(1.0));
    assert_eq!(bm.sample()[0], X0);
  }

  #[test]
  fn bm_defaults_to_zero_start() {
    let bm = BM::new(0.0, 1.0, N, None, None);
    assert_eq!(bm.sample()[0], 0.0);
  }

  #[test]
  fn bm_samples_in_parallel() {
    let bm = BM::new(0.05, 0.2, N, Some(X0), Some(1.0));
    let paths = bm.sample_par(8);

    assert_eq!(paths.len(), 8);
    for path in paths {
      assert_eq!(path.len(), N);
    }
  }
}
