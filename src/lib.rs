//! # Quantitative Finance Toolkit
//!
//! `quantkit_rs` bundles portfolio construction, option pricing, technical
//! indicators and stochastic path generation behind one consistent API.
//!
//! ## Modules
//!
//! | Module         | Description                                                                        |
//! |----------------|------------------------------------------------------------------------------------|
//! | [`indicators`] | Technical indicators (SMA, EMA, HMA, RSI, Bollinger Bands, Ichimoku).              |
//! | [`portfolio`]  | Mean-variance portfolio optimization: max Sharpe, min variance, targets, frontier. |
//! | [`pricing`]    | Closed-form Black-Scholes-Merton pricing, greeks and implied volatility.           |
//! | [`process`]    | Brownian and geometric Brownian path generators for synthetic price data.          |
//! | [`traits`]     | Shared sampling, pricing and day-count abstractions.                               |
//!
//! ## Features
//!
//! - `jemalloc`: route allocations through `tikv-jemallocator`
//! - `mimalloc`: route allocations through `mimalloc`
//!
//! ## Example Usage
//!
//! ```rust
//! use quantkit_rs::portfolio::{PortfolioOptimizer, WeightBounds};
//!
//! let optimizer = PortfolioOptimizer::new(
//!   vec!["AAA".to_string(), "BBB".to_string()],
//!   vec![vec![0.01, 0.03, -0.01, 0.02], vec![0.02, 0.00, 0.01, 0.01]],
//!   252,
//! )?;
//! let result = optimizer.max_sharpe(0.02, WeightBounds::default())?;
//! println!("{:?}", result.weights);
//! # Ok::<(), quantkit_rs::portfolio::PortfolioError>(())
//! ```

#[cfg(all(feature = "jemalloc", feature = "mimalloc"))]
compile_error!("feature \"jemalloc\" and feature \"mimalloc\" cannot be enabled at the same time");

#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod indicators;
pub mod portfolio;
pub mod pricing;
pub mod process;
pub mod traits;
