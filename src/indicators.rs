//! # Indicators
//!
//! $$
//! RSI = 100 - \frac{100}{1 + \bar{g}/\bar{l}}
//! $$
//!
//! Technical indicators over price series: simple, exponential and Hull
//! moving averages, Wilder-smoothed RSI, Bollinger Bands and the Ichimoku
//! cloud. Outputs keep the input length, with `None` during the warmup
//! stretch where the window is not yet filled.

/// Default lookback window shared by the single-series indicators.
pub const DEFAULT_PERIOD: usize = 14;

/// Indicator output aligned 1:1 with its input series.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
  /// Lookback window the line was computed with.
  pub period: Option<usize>,
  pub values: Vec<Option<f64>>,
}

impl Line {
  pub fn new(period: Option<usize>, values: Vec<Option<f64>>) -> Self {
    Self { period, values }
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  /// Most recent computed value, if the warmup has completed.
  pub fn last_value(&self) -> Option<f64> {
    self.values.last().copied().flatten()
  }
}

/// Simple moving average.
pub fn sma(series: &[f64], period: usize) -> Line {
  assert!(period > 0, "period must be positive");
  let mut values = vec![None; series.len()];

  if series.len() >= period {
    let mut window_sum: f64 = series[..period].iter().sum();
    values[period - 1] = Some(window_sum / period as f64);
    for i in period..series.len() {
      window_sum += series[i] - series[i - period];
      values[i] = Some(window_sum / period as f64);
    }
  }

  Line::new(Some(period), values)
}

/// Exponential moving average, seeded with the simple average of the first
/// window and smoothed with $\alpha = 2/(p+1)$ afterwards.
pub fn ema(series: &[f64], period: usize) -> Line {
  assert!(period > 0, "period must be positive");
  let mut values = vec![None; series.len()];

  if series.len() >= period {
    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev = series[..period].iter().sum::<f64>() / period as f64;
    values[period - 1] = Some(prev);
    for i in period..series.len() {
      prev = alpha * series[i] + (1.0 - alpha) * prev;
      values[i] = Some(prev);
    }
  }

  Line::new(Some(period), values)
}

/// Hull moving average, $WMA_{\sqrt p}(2\,WMA_{p/2} - WMA_p)$.
pub fn hma(series: &[f64], period: usize) -> Line {
  assert!(period > 1, "period must exceed one");
  let half_period = (period / 2).max(1);
  let sqrt_period = ((period as f64).sqrt() as usize).max(1);

  let mut values = vec![None; series.len()];
  if series.len() >= period {
    let half = wma_tail(series, half_period);
    let full = wma_tail(series, period);
    let offset = period - half_period;
    let diff: Vec<f64> = full
      .iter()
      .enumerate()
      .map(|(k, &f)| 2.0 * half[k + offset] - f)
      .collect();

    let smoothed = wma_tail(&diff, sqrt_period);
    for (k, &v) in smoothed.iter().enumerate() {
      values[period + sqrt_period - 2 + k] = Some(v);
    }
  }

  Line::new(Some(period), values)
}

/// Relative strength index with Wilder smoothing. A window without losses
/// reads 100.
pub fn rsi(series: &[f64], period: usize) -> Line {
  assert!(period > 0, "period must be positive");
  let mut values = vec![None; series.len()];
  if series.len() <= period {
    return Line::new(Some(period), values);
  }

  let mut avg_gain = 0.0;
  let mut avg_loss = 0.0;
  for i in 1..=period {
    let change = series[i] - series[i - 1];
    if change > 0.0 {
      avg_gain += change;
    } else {
      avg_loss -= change;
    }
  }
  avg_gain /= period as f64;
  avg_loss /= period as f64;
  values[period] = Some(rsi_value(avg_gain, avg_loss));

  for i in (period + 1)..series.len() {
    let change = series[i] - series[i - 1];
    let (gain, loss) = if change > 0.0 {
      (change, 0.0)
    } else {
      (0.0, -change)
    };
    avg_gain = (avg_gain * (period as f64 - 1.0) + gain) / period as f64;
    avg_loss = (avg_loss * (period as f64 - 1.0) + loss) / period as f64;
    values[i] = Some(rsi_value(avg_gain, avg_loss));
  }

  Line::new(Some(period), values)
}

/// Bollinger Bands around a simple moving average.
#[derive(Clone, Debug)]
pub struct BollingerBands {
  pub period: usize,
  pub stdev_multiplier: f64,
  pub top: Line,
  pub mid: Line,
  pub bot: Line,
}

/// Simple moving average with bands `stdev_multiplier` population standard
/// deviations above and below.
pub fn bollinger_bands(series: &[f64], period: usize, stdev_multiplier: f64) -> BollingerBands {
  assert!(period > 0, "period must be positive");
  let mid = sma(series, period);
  let mut top = vec![None; series.len()];
  let mut bot = vec![None; series.len()];

  for i in period.saturating_sub(1)..series.len() {
    if let Some(mean) = mid.values[i] {
      let window = &series[i + 1 - period..=i];
      let variance = window.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / period as f64;
      let band = stdev_multiplier * variance.sqrt();
      top[i] = Some(mean + band);
      bot[i] = Some(mean - band);
    }
  }

  BollingerBands {
    period,
    stdev_multiplier,
    top: Line::new(Some(period), top),
    mid,
    bot: Line::new(Some(period), bot),
  }
}

/// Window lengths and displacement of the Ichimoku cloud.
#[derive(Clone, Copy, Debug)]
pub struct IchimokuConfig {
  pub tenkan_period: usize,
  pub kijun_period: usize,
  pub chikou_lag: usize,
  pub senkou_b_period: usize,
  pub displacement: usize,
}

impl Default for IchimokuConfig {
  fn default() -> Self {
    Self {
      tenkan_period: 9,
      kijun_period: 26,
      chikou_lag: 26,
      senkou_b_period: 52,
      displacement: 26,
    }
  }
}

/// Ichimoku cloud lines, each aligned to the input index.
///
/// The cloud spans are displaced forward and the lag line backward, so their
/// warmup `None` stretches differ per line.
#[derive(Clone, Debug)]
pub struct Ichimoku {
  pub conversion: Line,
  pub base: Line,
  pub lag: Line,
  pub cloud_fast: Line,
  pub cloud_slow: Line,
}

pub fn ichimoku(highs: &[f64], lows: &[f64], closes: &[f64], config: IchimokuConfig) -> Ichimoku {
  assert!(
    highs.len() == lows.len() && lows.len() == closes.len(),
    "OHLC series must share a length"
  );
  assert!(
    config.tenkan_period > 0 && config.kijun_period > 0 && config.senkou_b_period > 0,
    "window periods must be positive"
  );
  let len = closes.len();

  let conversion = midpoint_line(highs, lows, config.tenkan_period);
  let base = midpoint_line(highs, lows, config.kijun_period);

  let mut lag = vec![None; len];
  for i in 0..len.saturating_sub(config.chikou_lag) {
    lag[i] = Some(closes[i + config.chikou_lag]);
  }

  let mut cloud_fast = vec![None; len];
  for i in config.displacement..len {
    if let (Some(c), Some(b)) = (
      conversion[i - config.displacement],
      base[i - config.displacement],
    ) {
      cloud_fast[i] = Some(0.5 * (c + b));
    }
  }

  let span_b = midpoint_line(highs, lows, config.senkou_b_period);
  let mut cloud_slow = vec![None; len];
  for i in config.displacement..len {
    if let Some(v) = span_b[i - config.displacement] {
      cloud_slow[i] = Some(v);
    }
  }

  Ichimoku {
    conversion: Line::new(Some(config.tenkan_period), conversion),
    base: Line::new(Some(config.kijun_period), base),
    lag: Line::new(Some(config.chikou_lag), lag),
    cloud_fast: Line::new(Some(config.kijun_period), cloud_fast),
    cloud_slow: Line::new(Some(config.senkou_b_period), cloud_slow),
  }
}

/// Weighted moving average values aligned to `series[period - 1..]`.
fn wma_tail(series: &[f64], period: usize) -> Vec<f64> {
  if series.len() < period {
    return Vec::new();
  }
  let denom = (period * (period + 1)) as f64 / 2.0;
  (period - 1..series.len())
    .map(|i| {
      let mut acc = 0.0;
      for j in 0..period {
        acc += series[i + 1 - period + j] * (j + 1) as f64;
      }
      acc / denom
    })
    .collect()
}

fn midpoint_line(highs: &[f64], lows: &[f64], period: usize) -> Vec<Option<f64>> {
  let mut values = vec![None; highs.len()];
  for i in period.saturating_sub(1)..highs.len() {
    let hi = highs[i + 1 - period..=i]
      .iter()
      .copied()
      .fold(f64::NEG_INFINITY, f64::max);
    let lo = lows[i + 1 - period..=i]
      .iter()
      .copied()
      .fold(f64::INFINITY, f64::min);
    values[i] = Some(0.5 * (hi + lo));
  }
  values
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
  if avg_loss == 0.0 {
    return 100.0;
  }
  100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  #[test]
  fn sma_warms_up_then_averages() {
    let line = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);

    assert_eq!(line.period, Some(3));
    assert_eq!(line.values[0], None);
    assert_eq!(line.values[1], None);
    assert_abs_diff_eq!(line.values[2].unwrap(), 2.0);
    assert_abs_diff_eq!(line.values[3].unwrap(), 3.0);
    assert_abs_diff_eq!(line.values[4].unwrap(), 4.0);
    assert_abs_diff_eq!(line.last_value().unwrap(), 4.0);
  }

  #[test]
  fn ema_seeds_with_simple_average() {
    let line = ema(&[2.0, 4.0, 6.0, 8.0], 3);

    assert_eq!(line.values[1], None);
    assert_abs_diff_eq!(line.values[2].unwrap(), 4.0);
    // alpha = 0.5 for period 3
    assert_abs_diff_eq!(line.values[3].unwrap(), 6.0);
  }

  #[test]
  fn hma_tracks_linear_series_exactly() {
    let series: Vec<f64> = (1..=10).map(|v| v as f64).collect();
    let line = hma(&series, 4);

    assert_eq!(line.values[3], None);
    for i in 4..series.len() {
      assert_abs_diff_eq!(line.values[i].unwrap(), series[i], epsilon = 1e-12);
    }
  }

  #[test]
  fn rsi_reads_100_without_losses() {
    let line = rsi(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);

    assert_eq!(line.values[2], None);
    assert_abs_diff_eq!(line.values[3].unwrap(), 100.0);
    assert_abs_diff_eq!(line.values[4].unwrap(), 100.0);
  }

  #[test]
  fn rsi_matches_hand_computation() {
    let series = [44.0, 44.34, 44.09, 44.15, 43.61, 44.33];
    let line = rsi(&series, 5);

    assert_eq!(line.values[4], None);
    assert_abs_diff_eq!(line.values[5].unwrap(), 58.63874345549738, epsilon = 1e-9);
  }

  #[test]
  fn bollinger_bands_sit_symmetrically_around_sma() {
    let bb = bollinger_bands(&[1.0, 2.0, 3.0, 4.0], 3, 2.0);

    let std = (2.0f64 / 3.0).sqrt();
    assert_abs_diff_eq!(bb.mid.values[2].unwrap(), 2.0);
    assert_abs_diff_eq!(bb.top.values[2].unwrap(), 2.0 + 2.0 * std, epsilon = 1e-12);
    assert_abs_diff_eq!(bb.bot.values[2].unwrap(), 2.0 - 2.0 * std, epsilon = 1e-12);
    assert_abs_diff_eq!(bb.top.values[3].unwrap(), 3.0 + 2.0 * std, epsilon = 1e-12);
  }

  #[test]
  fn ichimoku_lines_warm_up_at_their_own_pace() {
    let flat = vec![5.0; 100];
    let cloud = ichimoku(&flat, &flat, &flat, IchimokuConfig::default());

    assert_eq!(cloud.conversion.values[7], None);
    assert_abs_diff_eq!(cloud.conversion.values[8].unwrap(), 5.0);
    assert_eq!(cloud.base.values[24], None);
    assert_abs_diff_eq!(cloud.base.values[25].unwrap(), 5.0);

    // lag line is the close displaced backward
    assert_abs_diff_eq!(cloud.lag.values[73].unwrap(), 5.0);
    assert_eq!(cloud.lag.values[74], None);

    // spans are displaced forward past their own window warmup
    assert_eq!(cloud.cloud_fast.values[50], None);
    assert_abs_diff_eq!(cloud.cloud_fast.values[51].unwrap(), 5.0);
    assert_eq!(cloud.cloud_slow.values[76], None);
    assert_abs_diff_eq!(cloud.cloud_slow.values[77].unwrap(), 5.0);
  }

  #[test]
  fn short_series_stay_unfilled() {
    let line = sma(&[1.0, 2.0], 14);
    assert!(line.values.iter().all(Option::is_none));

    let line = rsi(&[1.0, 2.0, 3.0], DEFAULT_PERIOD);
    assert!(line.values.iter().all(Option::is_none));
  }
}
