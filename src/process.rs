//! # Process
//!
//! $$
//! dS_t = \mu S_t\,dt + \sigma S_t\,dW_t
//! $$
//!
//! Gaussian path generators for synthetic price data: arithmetic Brownian
//! motion with drift and geometric Brownian motion sampled with the exact
//! log-Euler discretization, so path statistics match the continuous-time
//! dynamics at every step size.

pub mod bm;
pub mod gbm;

pub use bm::BM;
pub use gbm::GBM;

/// Default number of time steps.
pub const N: usize = 1000;
/// Default initial value.
pub const X0: f64 = 100.0;
