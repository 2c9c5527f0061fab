// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   MACD      = EMA(close, fast) - EMA(close, slow)
//   Signal    = EMA(MACD, signal)
//   Histogram = MACD - Signal
//
// Standard parameters: 12 / 26 / 9. All three EMAs use the recursive form
// seeded by the first value, so every line is defined from the first bar.
// =============================================================================

use super::ema::calculate_ema;
use super::rolling::{defined, finite};

/// The three MACD lines, one entry per close.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub histogram: Vec<Option<f64>>,
}

pub fn calculate_macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let values = defined(closes);
    let fast_ema = calculate_ema(&values, fast);
    let slow_ema = calculate_ema(&values, slow);

    let macd: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(f, s)| finite((*f)? - (*s)?))
        .collect();

    let signal_line = calculate_ema(&macd, signal);

    let histogram = macd
        .iter()
        .zip(signal_line.iter())
        .map(|(m, s)| finite((*m)? - (*s)?))
        .collect();

    MacdSeries {
        macd,
        signal: signal_line,
        histogram,
    }
}
