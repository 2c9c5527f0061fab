// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
//   SMA_t(n) = (close_{t-n+1} + ... + close_t) / n
//
// Undefined for the first n - 1 bars.

use super::rolling::{defined, rolling_mean};

/// Compute the SMA series, one entry per close.
pub fn calculate_sma(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling_mean(&defined(closes), period)
}
