// =============================================================================
// Rolling Volatility: annualised standard deviation of log returns
// =============================================================================
//
//   r_t   = ln(close_t / close_{t-1})
//   vol_t = sample_std(r over `window` returns) * annualization
//
// With the defaults (window 20, annualization √252) the first value lands on
// bar index 20. A non-positive close makes the surrounding returns undefined.

use super::rolling::{finite, rolling_sample_std};

/// Default annualisation factor for daily bars.
pub fn trading_days_annualization() -> f64 {
    252.0_f64.sqrt()
}

/// Per-bar log return. Entry 0 is always `None`.
pub fn log_returns(closes: &[f64]) -> Vec<Option<f64>> {
    (0..closes.len())
        .map(|i| {
            if i == 0 {
                return None;
            }
            let (prev, cur) = (closes[i - 1], closes[i]);
            if prev <= 0.0 || cur <= 0.0 {
                return None;
            }
            finite((cur / prev).ln())
        })
        .collect()
}

/// Compute the annualised rolling volatility series.
pub fn calculate_volatility(closes: &[f64], window: usize, annualization: f64) -> Vec<Option<f64>> {
    rolling_sample_std(&log_returns(closes), window)
        .into_iter()
        .map(|s| finite(s? * annualization))
        .collect()
}
