use anyhow::Result;
use quantkit_rs::indicators::rsi;
use quantkit_rs::indicators::DEFAULT_PERIOD;
use quantkit_rs::portfolio::align_return_series;
use quantkit_rs::portfolio::log_returns_series;
use quantkit_rs::portfolio::PortfolioOptimizer;
use quantkit_rs::portfolio::WeightBounds;
use quantkit_rs::portfolio::DEFAULT_FRONTIER_POINTS;
use quantkit_rs::pricing::BlackScholes;
use quantkit_rs::process::GBM;
use quantkit_rs::traits::PricerExt;
use quantkit_rs::traits::ProcessExt;

fn main() -> Result<()> {
  // two years of synthetic daily closes for three notional tickers
  let configs = [
    ("BLUE", 0.08, 0.15),
    ("GROW", 0.15, 0.35),
    ("BOND", 0.04, 0.05),
  ];

  let mut tickers = Vec::new();
  let mut prices_by_ticker = Vec::new();
  let mut returns = Vec::new();
  for (ticker, mu, sigma) in configs {
    let prices = GBM::new(mu, sigma, 2 * 252 + 1, Some(100.0), Some(2.0))
      .sample()
      .to_vec();
    tickers.push(ticker.to_string());
    returns.push(log_returns_series(&prices));
    prices_by_ticker.push(prices);
  }

  // log_returns_series drops non-positive closes, so the rows can disagree
  // in length; align them to a common tail before building the universe
  let returns = align_return_series(&returns);
  let optimizer = PortfolioOptimizer::new(tickers, returns, 252)?;
  let bounds = WeightBounds::default();

  let summary = optimizer.summary(0.02, bounds)?;
  println!("{summary}");

  let frontier = optimizer.frontier(0.02, bounds, DEFAULT_FRONTIER_POINTS)?;
  println!("Efficient frontier ({} points):", frontier.len());
  for point in &frontier {
    println!(
      "  return {:>9.4}  std dev {:>8.4}  sharpe {:>8.4}  converged {}",
      point.expected_return, point.std_dev, point.sharpe_ratio, point.converged
    );
  }

  if let Some(momentum) = rsi(&prices_by_ticker[0], DEFAULT_PERIOD).last_value() {
    println!("\nRSI({DEFAULT_PERIOD}) on BLUE closes: {momentum:.2}");
  }

  let pricer = BlackScholes::builder(100.0, 0.2, 105.0)
    .r(0.05)
    .q(0.01)
    .tau(0.5)
    .build();
  let (call, put) = pricer.calculate_call_put();
  println!("Black-Scholes 6M 105-strike: call {call:.4}, put {put:.4}");

  Ok(())
}
