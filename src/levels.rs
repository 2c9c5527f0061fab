// =============================================================================
// Support / Resistance Estimator
// =============================================================================
//
// Support    = centered rolling minimum of `low`
// Resistance = centered rolling maximum of `high`
//
// Bar i covers [i - window/2, i - window/2 + window - 1]: with the default
// window of 20 that is 10 bars back and 9 ahead. The trailing `count` defined
// values of each series are rounded to cents, deduplicated and sorted
// ascending.
//
// CAVEAT: the centered window reads bars that lie in the future relative to
// the bar it is labelled with. The levels are only meaningful for
// retrospective reporting and must not drive a live signal.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::indicators::rolling::centered_extreme;
use crate::runtime_config::LevelParams;
use crate::types::TimeSeries;

/// Candidate support and resistance prices, each ascending and distinct.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelSet {
    pub support: Vec<f64>,
    pub resistance: Vec<f64>,
}

/// Estimate levels for `series`. Too short a series yields empty sets.
pub fn estimate_levels(series: &TimeSeries, params: &LevelParams) -> LevelSet {
    let lows = centered_extreme(&series.lows(), params.window, false);
    let highs = centered_extreme(&series.highs(), params.window, true);

    LevelSet {
        support: trailing_levels(&lows, params.count),
        resistance: trailing_levels(&highs, params.count),
    }
}

/// Take the last `count` defined values, round to 2 dp, dedupe, sort.
fn trailing_levels(values: &[Option<f64>], count: usize) -> Vec<f64> {
    let mut tail: Vec<f64> = values
        .iter()
        .rev()
        .filter_map(|v| *v)
        .take(count)
        .map(round_cents)
        .collect();

    tail.sort_by(f64::total_cmp);
    tail.dedup();
    tail
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
