// =============================================================================
// Rolling-window primitives
// =============================================================================
//
// Every indicator in this crate emits one `Option<f64>` per input bar. A
// window produces a value only when it is complete and every element in it is
// defined, mirroring `min_periods = window` semantics.

/// Map a possibly non-finite number to `None`.
#[inline]
pub fn finite(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}

/// Lift a slice of plain values into the optional representation.
pub fn defined(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().map(|&v| finite(v)).collect()
}

/// Collect the window ending at `end` (inclusive) if every element is defined.
fn full_window(values: &[Option<f64>], end: usize, window: usize) -> Option<Vec<f64>> {
    if window == 0 || end + 1 < window {
        return None;
    }
    values[end + 1 - window..=end].iter().copied().collect()
}

/// Trailing simple mean over `window` elements.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            let w = full_window(values, i, window)?;
            finite(w.iter().sum::<f64>() / window as f64)
        })
        .collect()
}

/// Trailing sample standard deviation (ddof = 1). Needs `window >= 2`.
pub fn rolling_sample_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if window < 2 {
                return None;
            }
            let w = full_window(values, i, window)?;
            sample_std(&w)
        })
        .collect()
}

/// Sample standard deviation of a slice (ddof = 1).
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    finite(variance.max(0.0).sqrt())
}

/// Extremum over a centered window.
///
/// Bar `i` covers `[i - window / 2, i - window / 2 + window - 1]`, so with an
/// even window the look-back is one bar longer than the look-ahead. Bars whose
/// window would run past either end of the series yield `None`.
pub fn centered_extreme(values: &[f64], window: usize, pick_max: bool) -> Vec<Option<f64>> {
    let n = values.len();
    let back = window / 2;
    (0..n)
        .map(|i| {
            if window == 0 || i < back || i - back + window > n {
                return None;
            }
            let slice = &values[i - back..i - back + window];
            let folded = if pick_max {
                slice.iter().copied().fold(f64::NEG_INFINITY, f64::max)
            } else {
                slice.iter().copied().fold(f64::INFINITY, f64::min)
            };
            finite(folded)
        })
        .collect()
}

/// Most recent defined value of `series`.
pub fn latest(series: &[Option<f64>]) -> Option<f64> {
    series.iter().rev().find_map(|v| *v)
}
