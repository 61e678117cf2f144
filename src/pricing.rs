//! # Pricing
//!
//! $$
//! C = S e^{-q\tau} N(d_1) - K e^{-r\tau} N(d_2)
//! $$
//!
//! Closed-form European option pricing under Black-Scholes-Merton dynamics
//! with a continuous dividend yield, the first-order sensitivities, and a
//! rational implied-volatility inversion.

pub mod black_scholes;

pub use black_scholes::BlackScholes;

/// Option type.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug)]
pub enum OptionType {
  #[default]
  Call,
  Put,
}
