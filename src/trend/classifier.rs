// =============================================================================
// Trend Classifier
// =============================================================================
//
// Direction comes from the slope of the long SMA:
//
//   slope = (SMA[last] - SMA[last - lookback]) / lookback
//
//   slope >  threshold  =>  UP
//   slope < -threshold  =>  DOWN
//   otherwise           =>  SIDEWAYS
//
// Both SMA points must be defined, so with the defaults (SMA20, lookback 20)
// at least 40 bars are required; anything shorter is UNKNOWN.
//
// Strength is ADX / 100, clamped to [0, 1]. When ADX is undefined the
// strength is 0.0 (explicit degraded default).
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::adx::calculate_adx;
use crate::indicators::rolling::latest;
use crate::runtime_config::TrendParams;
use crate::types::{PriceBar, TrendDirection};

/// Direction and strength of the prevailing trend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendInfo {
    pub direction: TrendDirection,
    /// Normalised ADX in [0, 1].
    pub strength: f64,
    /// Raw slope the direction was derived from, when defined.
    pub slope: Option<f64>,
}

impl Default for TrendInfo {
    fn default() -> Self {
        Self {
            direction: TrendDirection::Unknown,
            strength: 0.0,
            slope: None,
        }
    }
}

/// Stateless classifier; holds only its parameters.
#[derive(Debug, Clone, Default)]
pub struct TrendClassifier {
    params: TrendParams,
}

impl TrendClassifier {
    pub fn new(params: TrendParams) -> Self {
        Self { params }
    }

    /// Classify the trend of `bars` given the precomputed long-SMA series.
    ///
    /// `sma_long` must have one entry per bar.
    pub fn classify(&self, bars: &[PriceBar], sma_long: &[Option<f64>]) -> TrendInfo {
        let slope = sma_slope(sma_long, self.params.slope_lookback);
        let direction = match slope {
            Some(s) => direction_from_slope(s, self.params.slope_threshold),
            None => TrendDirection::Unknown,
        };
        let strength = trend_strength(bars, self.params.adx_period);

        debug!(
            direction = %direction,
            slope = ?slope,
            strength = format!("{:.4}", strength),
            "trend classified"
        );

        TrendInfo {
            direction,
            strength,
            slope,
        }
    }
}

/// Slope of `sma` between the last bar and `lookback` bars earlier.
pub fn sma_slope(sma: &[Option<f64>], lookback: usize) -> Option<f64> {
    if lookback == 0 || sma.len() <= lookback {
        return None;
    }
    let last = sma.len() - 1;
    let now = sma[last]?;
    let then = sma[last - lookback]?;
    let slope = (now - then) / lookback as f64;
    slope.is_finite().then_some(slope)
}

/// Map a slope to a direction using a symmetric dead band.
pub fn direction_from_slope(slope: f64, threshold: f64) -> TrendDirection {
    if slope > threshold {
        TrendDirection::Up
    } else if slope < -threshold {
        TrendDirection::Down
    } else {
        TrendDirection::Sideways
    }
}

/// Most recent ADX scaled to [0, 1]; 0.0 when never defined.
pub fn trend_strength(bars: &[PriceBar], adx_period: usize) -> f64 {
    match latest(&calculate_adx(bars, adx_period)) {
        Some(adx) => (adx / 100.0).clamp(0.0, 1.0),
        None => 0.0,
    }
}
