// =============================================================================
// Average Directional Index (ADX)
// =============================================================================
//
// ADX quantifies trend **strength** regardless of direction.
//
// Calculation pipeline:
//   1. Compute +DM (positive directional movement) and -DM per bar.
//   2. Compute True Range (TR) per bar.
//   3. Apply Wilder's running-sum smoothing (period) to +DM, -DM, and TR.
//   4. Derive +DI = smoothed(+DM) / smoothed(TR) * 100
//            -DI = smoothed(-DM) / smoothed(TR) * 100
//   5. DX  = |+DI - -DI| / (+DI + -DI) * 100
//   6. ADX = simple rolling mean of DX over `period` bars.
//
// The first DX lands on bar `period`, the first ADX on bar `2 * period - 1`.
//
// Interpretation:
//   ADX > 25  => trending market
//   ADX < 20  => ranging / choppy market
// =============================================================================

use super::atr::true_range;
use super::rolling::{finite, rolling_mean};
use crate::types::PriceBar;

/// Directional movement for the transition into bar `i` (`i >= 1`).
///
/// Each side is zeroed unless it is positive and exceeds the opposing move.
fn directional_movement(bars: &[PriceBar], i: usize) -> (f64, f64) {
    let up_move = bars[i].high - bars[i - 1].high;
    let down_move = bars[i - 1].low - bars[i].low;

    let pdm = if up_move > down_move && up_move > 0.0 {
        up_move
    } else {
        0.0
    };
    let mdm = if down_move > up_move && down_move > 0.0 {
        down_move
    } else {
        0.0
    };
    (pdm, mdm)
}

/// Compute the DX series, one entry per bar.
pub fn calculate_dx(bars: &[PriceBar], period: usize) -> Vec<Option<f64>> {
    let n = bars.len();
    let mut out = vec![None; n];
    if period == 0 || n < period + 1 {
        return out;
    }

    let tr = true_range(bars);
    let period_f = period as f64;

    // ------------------------------------------------------------------
    // Seed: plain sums over the first `period` transitions (bars 1..=period)
    // ------------------------------------------------------------------
    let mut smooth_plus_dm = 0.0;
    let mut smooth_minus_dm = 0.0;
    let mut smooth_tr = 0.0;
    for i in 1..=period {
        let (pdm, mdm) = directional_movement(bars, i);
        smooth_plus_dm += pdm;
        smooth_minus_dm += mdm;
        smooth_tr += tr[i].unwrap_or(0.0);
    }
    out[period] = compute_dx(smooth_plus_dm, smooth_minus_dm, smooth_tr);

    // ------------------------------------------------------------------
    // Wilder's smoothing for the remaining bars
    // ------------------------------------------------------------------
    for i in period + 1..n {
        let (pdm, mdm) = directional_movement(bars, i);
        smooth_plus_dm = smooth_plus_dm - smooth_plus_dm / period_f + pdm;
        smooth_minus_dm = smooth_minus_dm - smooth_minus_dm / period_f + mdm;
        smooth_tr = smooth_tr - smooth_tr / period_f + tr[i].unwrap_or(0.0);

        out[i] = compute_dx(smooth_plus_dm, smooth_minus_dm, smooth_tr);
    }

    out
}

/// Compute the ADX series, one entry per bar.
///
/// A bar is `None` when the history is too short or any DX in its window was
/// undefined (zero smoothed true range).
pub fn calculate_adx(bars: &[PriceBar], period: usize) -> Vec<Option<f64>> {
    rolling_mean(&calculate_dx(bars, period), period)
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Compute DX from smoothed +DM, -DM, and TR values.
///
/// Returns `None` if the smoothed true range is zero or the result is
/// non-finite; 0.0 when both directional indicators are zero.
fn compute_dx(smooth_plus_dm: f64, smooth_minus_dm: f64, smooth_tr: f64) -> Option<f64> {
    if smooth_tr == 0.0 {
        return None;
    }

    let plus_di = (smooth_plus_dm / smooth_tr) * 100.0;
    let minus_di = (smooth_minus_dm / smooth_tr) * 100.0;

    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        return Some(0.0);
    }

    finite(((plus_di - minus_di).abs() / di_sum) * 100.0)
}
