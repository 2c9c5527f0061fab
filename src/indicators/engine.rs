// =============================================================================
// Indicator Engine: full rolling series and the latest-value snapshot
// =============================================================================
//
// `compute_series` runs every indicator over a validated `TimeSeries` and
// keeps the complete per-bar output. `IndicatorSnapshot` reads the most
// recent defined value of each series; it is what scoring and downstream
// consumers see.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::atr::calculate_atr;
use super::bollinger::{calculate_bollinger, BollingerSeries};
use super::macd::{calculate_macd, MacdSeries};
use super::rolling::{defined, latest, rolling_mean};
use super::rsi::calculate_rsi;
use super::sma::calculate_sma;
use super::volatility::calculate_volatility;
use crate::runtime_config::IndicatorWindows;
use crate::types::TimeSeries;

/// Every rolling indicator over the series, one entry per bar.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub sma_short: Vec<Option<f64>>,
    pub sma_medium: Vec<Option<f64>>,
    pub sma_long: Vec<Option<f64>>,
    pub sma_trend: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
    pub macd: MacdSeries,
    pub bollinger: BollingerSeries,
    pub atr: Vec<Option<f64>>,
    pub volatility: Vec<Option<f64>>,
    pub volume_average: Vec<Option<f64>>,
}

/// Latest value of each indicator. `None` means undefined, never zero.
///
/// Field names follow the default windows; the values reflect whatever
/// windows the engine was configured with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub sma_5: Option<f64>,
    pub sma_10: Option<f64>,
    pub sma_20: Option<f64>,
    pub sma_60: Option<f64>,
    pub rsi_14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub bollinger_upper: Option<f64>,
    pub bollinger_middle: Option<f64>,
    pub bollinger_lower: Option<f64>,
    pub atr: Option<f64>,
    pub volatility: Option<f64>,
    /// Volume of the final bar.
    pub volume: Option<f64>,
    /// Most recent rolling average volume.
    pub volume_avg: Option<f64>,
}

/// Run all indicators over `series`.
pub fn compute_series(series: &TimeSeries, windows: &IndicatorWindows) -> IndicatorSeries {
    let closes = series.closes();
    let volumes = series.volumes();

    let out = IndicatorSeries {
        sma_short: calculate_sma(&closes, windows.sma_short),
        sma_medium: calculate_sma(&closes, windows.sma_medium),
        sma_long: calculate_sma(&closes, windows.sma_long),
        sma_trend: calculate_sma(&closes, windows.sma_trend),
        rsi: calculate_rsi(&closes, windows.rsi),
        macd: calculate_macd(
            &closes,
            windows.macd_fast,
            windows.macd_slow,
            windows.macd_signal,
        ),
        bollinger: calculate_bollinger(&closes, windows.bollinger, windows.bollinger_std),
        atr: calculate_atr(series.bars(), windows.atr),
        volatility: calculate_volatility(&closes, windows.volatility, windows.annualization),
        volume_average: rolling_mean(&defined(&volumes), windows.volume_average),
    };

    trace!(bars = series.len(), "indicator series computed");
    out
}

impl IndicatorSnapshot {
    /// Read the most recent defined value of every series.
    pub fn from_series(series: &IndicatorSeries, last_volume: f64) -> Self {
        Self {
            sma_5: latest(&series.sma_short),
            sma_10: latest(&series.sma_medium),
            sma_20: latest(&series.sma_long),
            sma_60: latest(&series.sma_trend),
            rsi_14: latest(&series.rsi),
            macd: latest(&series.macd.macd),
            macd_signal: latest(&series.macd.signal),
            macd_hist: latest(&series.macd.histogram),
            bollinger_upper: latest(&series.bollinger.upper),
            bollinger_middle: latest(&series.bollinger.middle),
            bollinger_lower: latest(&series.bollinger.lower),
            atr: latest(&series.atr),
            volatility: latest(&series.volatility),
            volume: Some(last_volume),
            volume_avg: latest(&series.volume_average),
        }
    }

    /// Compute the snapshot directly from a series.
    pub fn compute(series: &TimeSeries, windows: &IndicatorWindows) -> Self {
        let full = compute_series(series, windows);
        Self::from_series(&full, series.last().volume as f64)
    }
}
