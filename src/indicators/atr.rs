// =============================================================================
// Average True Range (ATR)
// =============================================================================
//
// ATR measures market volatility by decomposing the entire range of a bar.
//
// True Range (TR) for each bar:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// The first bar has no previous close, so its TR is undefined. ATR is the
// simple rolling mean of `period` TR values; the first ATR therefore lands on
// bar index `period`.
//
// Default period: 14
// =============================================================================

use super::rolling::{finite, rolling_mean};
use crate::types::PriceBar;

/// Per-bar true range. Entry 0 is always `None`.
pub fn true_range(bars: &[PriceBar]) -> Vec<Option<f64>> {
    (0..bars.len())
        .map(|i| {
            if i == 0 {
                return None;
            }
            let high = bars[i].high;
            let low = bars[i].low;
            let prev_close = bars[i - 1].close;

            let hl = high - low;
            let hc = (high - prev_close).abs();
            let lc = (low - prev_close).abs();

            finite(hl.max(hc).max(lc))
        })
        .collect()
}

/// Compute the ATR series, one entry per bar.
pub fn calculate_atr(bars: &[PriceBar], period: usize) -> Vec<Option<f64>> {
    rolling_mean(&true_range(bars), period)
}
