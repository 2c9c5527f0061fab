// =============================================================================
// Relative Strength Index (RSI): simple rolling averages
// =============================================================================
//
// RSI measures the speed and magnitude of recent price changes to evaluate
// whether an asset is overbought or oversold.
//
// Step 1: Compute price changes (deltas) from consecutive closes. Bar 0 has
//         no predecessor and counts as a zero gain and a zero loss.
// Step 2: gain = simple mean of the positive deltas over `period` deltas
//         loss = simple mean of |negative deltas| over the same window
//         (no Wilder smoothing).
// Step 3: RS  = gain / loss
//         RSI = 100 - 100 / (1 + RS)
//
// Thresholds:  RSI > 70 => overbought,  RSI < 30 => oversold.
// =============================================================================

use super::rolling::{finite, rolling_mean};

/// Compute the RSI series, one entry per close.
///
/// The first defined value sits at index `period - 1`; bar 0 enters the
/// window as a zero delta.
///
/// # Edge cases
/// - `period == 0` => all `None`
/// - loss average zero with a positive gain average => 100.0
/// - both averages zero (flat window) => `None`
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut gains: Vec<Option<f64>> = Vec::with_capacity(closes.len());
    let mut losses: Vec<Option<f64>> = Vec::with_capacity(closes.len());

    for i in 0..closes.len() {
        if i == 0 {
            gains.push(Some(0.0));
            losses.push(Some(0.0));
            continue;
        }
        let delta = closes[i] - closes[i - 1];
        gains.push(finite(delta.max(0.0)));
        losses.push(finite((-delta).max(0.0)));
    }

    let avg_gain = rolling_mean(&gains, period);
    let avg_loss = rolling_mean(&losses, period);

    avg_gain
        .iter()
        .zip(avg_loss.iter())
        .map(|(g, l)| rsi_from_averages((*g)?, (*l)?))
        .collect()
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        return None;
    }
    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    finite(100.0 - 100.0 / (1.0 + rs)).map(|v| v.clamp(0.0, 100.0))
}
