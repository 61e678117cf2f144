//! # Traits
//!
//! $$
//! \text{Trait contracts: }\mathcal{A}:\text{parameters}\to\text{paths/prices}
//! $$
//!
//! Sampling and pricing seams shared across the crate.

use rayon::prelude::*;

use crate::pricing::OptionType;

/// Stochastic process that can generate one path per call.
pub trait ProcessExt: Send + Sync {
  type Output: Send;

  /// Generate a single path.
  fn sample(&self) -> Self::Output;

  /// Generate `m` independent paths in parallel.
  fn sample_par(&self, m: usize) -> Vec<Self::Output> {
    (0..m).into_par_iter().map(|_| self.sample()).collect()
  }
}

/// Closed-form option pricer.
pub trait PricerExt: TimeExt {
  /// Price the call and the put in one pass.
  fn calculate_call_put(&self) -> (f64, f64);

  /// Price the option selected by the pricer's option type.
  fn calculate_price(&self) -> f64;

  fn derivatives(&self) -> Vec<f64> {
    vec![]
  }

  fn implied_volatility(&self, _price: f64, _option_type: OptionType) -> f64 {
    0.0
  }
}

/// Time-to-maturity, either explicit or derived from a date pair.
pub trait TimeExt {
  fn tau(&self) -> Option<f64>;

  fn eval(&self) -> Option<chrono::NaiveDate> {
    None
  }

  fn expiration(&self) -> Option<chrono::NaiveDate> {
    None
  }

  /// Year fraction to expiry, `days / 365` when derived from dates.
  fn tau_or_from_dates(&self) -> f64 {
    if let Some(tau) = self.tau() {
      return tau;
    }
    match (self.eval(), self.expiration()) {
      (Some(e), Some(x)) => x.signed_duration_since(e).num_days() as f64 / 365.0,
      _ => panic!("either tau or both eval and expiration must be set"),
    }
  }

  fn calculate_tau_in_years(&self) -> f64 {
    self.tau_or_from_dates()
  }
}
