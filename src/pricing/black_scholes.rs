use implied_vol::implied_black_volatility;
use statrs::distribution::Continuous;
use statrs::distribution::ContinuousCDF;
use statrs::distribution::Normal;

use crate::pricing::OptionType;
use crate::traits::PricerExt;
use crate::traits::TimeExt;

/// Risk-free rate assumed by [`BlackScholes::builder`] when none is given.
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.03;

/// European option priced in closed form with a continuous dividend yield.
///
/// Time to maturity comes from `tau` when set, otherwise from the
/// `eval`/`expiration` date pair on an ACT/365 basis.
pub struct BlackScholes {
  /// Underlying price
  pub s: f64,
  /// Volatility
  pub v: f64,
  /// Strike price
  pub k: f64,
  /// Risk-free rate
  pub r: f64,
  /// Dividend yield
  pub q: Option<f64>,
  /// Time to maturity in years
  pub tau: Option<f64>,
  /// Evaluation date
  pub eval: Option<chrono::NaiveDate>,
  /// Expiration date
  pub expiration: Option<chrono::NaiveDate>,
  /// Option type
  pub option_type: OptionType,
}

impl BlackScholes {
  #[allow(clippy::too_many_arguments)]
  pub fn new(
    s: f64,
    v: f64,
    k: f64,
    r: f64,
    q: Option<f64>,
    tau: Option<f64>,
    eval: Option<chrono::NaiveDate>,
    expiration: Option<chrono::NaiveDate>,
    option_type: OptionType,
  ) -> Self {
    Self {
      s,
      v,
      k,
      r,
      q,
      tau,
      eval,
      expiration,
      option_type,
    }
  }

  pub fn builder(s: f64, v: f64, k: f64) -> BlackScholesBuilder {
    BlackScholesBuilder {
      s,
      v,
      k,
      r: DEFAULT_RISK_FREE_RATE,
      q: None,
      tau: None,
      eval: None,
      expiration: None,
      option_type: OptionType::Call,
    }
  }
}

pub struct BlackScholesBuilder {
  s: f64,
  v: f64,
  k: f64,
  r: f64,
  q: Option<f64>,
  tau: Option<f64>,
  eval: Option<chrono::NaiveDate>,
  expiration: Option<chrono::NaiveDate>,
  option_type: OptionType,
}

impl BlackScholesBuilder {
  pub fn r(mut self, r: f64) -> Self {
    self.r = r;
    self
  }
  pub fn q(mut self, q: f64) -> Self {
    self.q = Some(q);
    self
  }
  pub fn tau(mut self, tau: f64) -> Self {
    self.tau = Some(tau);
    self
  }
  pub fn eval(mut self, eval: chrono::NaiveDate) -> Self {
    self.eval = Some(eval);
    self
  }
  pub fn expiration(mut self, expiration: chrono::NaiveDate) -> Self {
    self.expiration = Some(expiration);
    self
  }
  pub fn option_type(mut self, option_type: OptionType) -> Self {
    self.option_type = option_type;
    self
  }
  pub fn build(self) -> BlackScholes {
    BlackScholes {
      s: self.s,
      v: self.v,
      k: self.k,
      r: self.r,
      q: self.q,
      tau: self.tau,
      eval: self.eval,
      expiration: self.expiration,
      option_type: self.option_type,
    }
  }
}

impl PricerExt for BlackScholes {
  fn calculate_call_put(&self) -> (f64, f64) {
    let (d1, d2) = self.d1_d2();
    let n = Normal::default();
    let tau = self.tau_or_from_dates();

    let call = self.s * ((self.b() - self.r) * tau).exp() * n.cdf(d1)
      - self.k * (-self.r * tau).exp() * n.cdf(d2);
    let put = -self.s * ((self.b() - self.r) * tau).exp() * n.cdf(-d1)
      + self.k * (-self.r * tau).exp() * n.cdf(-d2);

    (call, put)
  }

  fn calculate_price(&self) -> f64 {
    let (call, put) = self.calculate_call_put();
    match self.option_type {
      OptionType::Call => call,
      OptionType::Put => put,
    }
  }

  /// Invert the Black formula on the forward so the returned volatility
  /// reproduces the quoted spot price exactly.
  fn implied_volatility(&self, price: f64, option_type: OptionType) -> f64 {
    let tau = self.tau_or_from_dates();
    let forward = self.s * (self.b() * tau).exp();
    let undiscounted = price * (self.r * tau).exp();

    implied_black_volatility(
      undiscounted,
      forward,
      self.k,
      tau,
      option_type == OptionType::Call,
    )
  }

  fn derivatives(&self) -> Vec<f64> {
    vec![
      self.delta(),
      self.gamma(),
      self.theta(),
      self.vega(),
      self.rho(),
    ]
  }
}

impl TimeExt for BlackScholes {
  fn tau(&self) -> Option<f64> {
    self.tau
  }

  fn eval(&self) -> Option<chrono::NaiveDate> {
    self.eval
  }

  fn expiration(&self) -> Option<chrono::NaiveDate> {
    self.expiration
  }
}

impl BlackScholes {
  fn d1_d2(&self) -> (f64, f64) {
    let tau = self.tau_or_from_dates();
    let d1 = (1.0 / (self.v * tau.sqrt()))
      * ((self.s / self.k).ln() + (self.b() + 0.5 * self.v.powi(2)) * tau);
    let d2 = d1 - self.v * tau.sqrt();

    (d1, d2)
  }

  /// Cost of carry, risk-free rate less the dividend yield.
  fn b(&self) -> f64 {
    self.r - self.q.unwrap_or(0.0)
  }

  /// Calculate the delta
  pub fn delta(&self) -> f64 {
    let (d1, _) = self.d1_d2();
    let n = Normal::default();
    let tau = self.tau_or_from_dates();
    let exp_bt = ((self.b() - self.r) * tau).exp();

    if self.option_type == OptionType::Call {
      exp_bt * n.cdf(d1)
    } else {
      exp_bt * (n.cdf(d1) - 1.0)
    }
  }

  /// Calculate the gamma
  pub fn gamma(&self) -> f64 {
    let (d1, _) = self.d1_d2();
    let n = Normal::default();
    let tau = self.tau_or_from_dates();

    ((self.b() - self.r) * tau).exp() * n.pdf(d1) / (self.s * self.v * tau.sqrt())
  }

  /// Calculate the theta
  pub fn theta(&self) -> f64 {
    let (d1, d2) = self.d1_d2();
    let n = Normal::default();
    let tau = self.tau_or_from_dates();

    let exp_bt = ((self.b() - self.r) * tau).exp();
    let exp_rt = (-self.r * tau).exp();

    let first_term = -self.s * exp_bt * n.pdf(d1) * self.v / (2.0 * tau.sqrt());

    if self.option_type == OptionType::Call {
      let second_term = -(self.b() - self.r) * self.s * exp_bt * n.cdf(d1);
      let third_term = -self.r * self.k * exp_rt * n.cdf(d2);
      first_term + second_term + third_term
    } else {
      let second_term = (self.b() - self.r) * self.s * exp_bt * n.cdf(-d1);
      let third_term = -self.r * self.k * exp_rt * n.cdf(-d2);
      first_term + second_term + third_term
    }
  }

  /// Calculate the vega
  pub fn vega(&self) -> f64 {
    let (d1, _) = self.d1_d2();
    let n = Normal::default();
    let tau = self.tau_or_from_dates();

    self.s * ((self.b() - self.r) * tau).exp() * n.pdf(d1) * tau.sqrt()
  }

  /// Calculate the rho
  pub fn rho(&self) -> f64 {
    let (_, d2) = self.d1_d2();
    let n = Normal::default();
    let tau = self.tau_or_from_dates();

    let exp_rt = (-self.r * tau).exp();

    if self.option_type == OptionType::Call {
      self.k * tau * exp_rt * n.cdf(d2)
    } else {
      -self.k * tau * exp_rt * n.cdf(-d2)
    }
  }
}
