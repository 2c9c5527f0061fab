// =============================================================================
// Runtime Configuration: analysis windows, scoring heuristics, anomaly knobs
// =============================================================================
//
// Every tunable constant of the engine lives here: indicator windows, the
// score/risk/suggestion cutoffs, and the anomaly detector parameters. The
// defaults reproduce the reference behaviour exactly.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash. All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::anomaly::AnomalyFeature;
use crate::error::AnalysisError;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_sma_short() -> usize {
    5
}

fn default_sma_medium() -> usize {
    10
}

fn default_sma_long() -> usize {
    20
}

fn default_sma_trend() -> usize {
    60
}

fn default_period_14() -> usize {
    14
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_window_20() -> usize {
    20
}

fn default_bollinger_std() -> f64 {
    2.0
}

fn default_annualization() -> f64 {
    252.0_f64.sqrt()
}

fn default_slope_threshold() -> f64 {
    0.01
}

fn default_level_count() -> usize {
    3
}

fn default_base_score() -> f64 {
    50.0
}

fn default_stacking_points() -> f64 {
    10.0
}

fn default_points_5() -> f64 {
    5.0
}

fn default_rsi_overbought() -> f64 {
    70.0
}

fn default_rsi_oversold() -> f64 {
    30.0
}

fn default_score_max() -> f64 {
    100.0
}

fn default_volatility_weight() -> f64 {
    0.4
}

fn default_weight_03() -> f64 {
    0.3
}

fn default_risk_low_below() -> f64 {
    30.0
}

fn default_risk_medium_below() -> f64 {
    60.0
}

fn default_buy_score() -> f64 {
    70.0
}

fn default_sell_score() -> f64 {
    30.0
}

fn default_variance_target() -> f64 {
    0.95
}

fn default_anomaly_threshold() -> f64 {
    3.0
}

fn default_anomaly_features() -> Vec<AnomalyFeature> {
    vec![AnomalyFeature::Close, AnomalyFeature::Volume]
}

// =============================================================================
// IndicatorWindows
// =============================================================================

/// Look-back windows for the indicator engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorWindows {
    #[serde(default = "default_sma_short")]
    pub sma_short: usize,

    #[serde(default = "default_sma_medium")]
    pub sma_medium: usize,

    /// Also the SMA the trend slope is measured on.
    #[serde(default = "default_sma_long")]
    pub sma_long: usize,

    /// Long-horizon average reported alongside the snapshot.
    #[serde(default = "default_sma_trend")]
    pub sma_trend: usize,

    #[serde(default = "default_period_14")]
    pub rsi: usize,

    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,

    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,

    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,

    #[serde(default = "default_window_20")]
    pub bollinger: usize,

    /// Band half-width in standard deviations.
    #[serde(default = "default_bollinger_std")]
    pub bollinger_std: f64,

    #[serde(default = "default_period_14")]
    pub atr: usize,

    #[serde(default = "default_window_20")]
    pub volatility: usize,

    /// Multiplier applied to the daily log-return deviation.
    #[serde(default = "default_annualization")]
    pub annualization: f64,

    #[serde(default = "default_window_20")]
    pub volume_average: usize,
}

impl Default for IndicatorWindows {
    fn default() -> Self {
        Self {
            sma_short: default_sma_short(),
            sma_medium: default_sma_medium(),
            sma_long: default_sma_long(),
            sma_trend: default_sma_trend(),
            rsi: default_period_14(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            bollinger: default_window_20(),
            bollinger_std: default_bollinger_std(),
            atr: default_period_14(),
            volatility: default_window_20(),
            annualization: default_annualization(),
            volume_average: default_window_20(),
        }
    }
}

// =============================================================================
// TrendParams / LevelParams
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendParams {
    /// Bars between the two SMA points the slope is taken over.
    #[serde(default = "default_window_20")]
    pub slope_lookback: usize,

    /// |slope| above this is a trend; at or below is sideways.
    #[serde(default = "default_slope_threshold")]
    pub slope_threshold: f64,

    #[serde(default = "default_period_14")]
    pub adx_period: usize,
}

impl Default for TrendParams {
    fn default() -> Self {
        Self {
            slope_lookback: default_window_20(),
            slope_threshold: default_slope_threshold(),
            adx_period: default_period_14(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelParams {
    /// Centered rolling window over lows/highs.
    #[serde(default = "default_window_20")]
    pub window: usize,

    /// How many trailing extrema to keep per side.
    #[serde(default = "default_level_count")]
    pub count: usize,
}

impl Default for LevelParams {
    fn default() -> Self {
        Self {
            window: default_window_20(),
            count: default_level_count(),
        }
    }
}

// =============================================================================
// ScoringParams
// =============================================================================

/// Heuristic constants of the technical score, risk level and suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringParams {
    #[serde(default = "default_base_score")]
    pub base_score: f64,

    /// Awarded (or deducted) for bullish (bearish) SMA stacking.
    #[serde(default = "default_stacking_points")]
    pub stacking_points: f64,

    #[serde(default = "default_rsi_overbought")]
    pub rsi_overbought: f64,

    #[serde(default = "default_rsi_oversold")]
    pub rsi_oversold: f64,

    #[serde(default = "default_points_5")]
    pub rsi_points: f64,

    #[serde(default = "default_points_5")]
    pub macd_points: f64,

    #[serde(default = "default_points_5")]
    pub volume_points: f64,

    #[serde(default)]
    pub score_min: f64,

    #[serde(default = "default_score_max")]
    pub score_max: f64,

    /// Weight of the annualised volatility (raw fraction, 0.23 = 23 %).
    #[serde(default = "default_volatility_weight")]
    pub volatility_weight: f64,

    /// Weight of `score_max - technical_score`.
    #[serde(default = "default_weight_03")]
    pub score_weight: f64,

    /// Weight of `trend_strength * 100`.
    #[serde(default = "default_weight_03")]
    pub trend_weight: f64,

    #[serde(default = "default_risk_low_below")]
    pub risk_low_below: f64,

    #[serde(default = "default_risk_medium_below")]
    pub risk_medium_below: f64,

    #[serde(default = "default_buy_score")]
    pub buy_score: f64,

    #[serde(default = "default_sell_score")]
    pub sell_score: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            base_score: default_base_score(),
            stacking_points: default_stacking_points(),
            rsi_overbought: default_rsi_overbought(),
            rsi_oversold: default_rsi_oversold(),
            rsi_points: default_points_5(),
            macd_points: default_points_5(),
            volume_points: default_points_5(),
            score_min: 0.0,
            score_max: default_score_max(),
            volatility_weight: default_volatility_weight(),
            score_weight: default_weight_03(),
            trend_weight: default_weight_03(),
            risk_low_below: default_risk_low_below(),
            risk_medium_below: default_risk_medium_below(),
            buy_score: default_buy_score(),
            sell_score: default_sell_score(),
        }
    }
}

// =============================================================================
// AnomalyParams
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyParams {
    /// Run the detector as part of every analysis.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Cumulative explained-variance ratio the retained components must reach.
    #[serde(default = "default_variance_target")]
    pub variance_target: f64,

    /// Mean squared reconstruction error (standardised units) above which a
    /// bar is flagged.
    #[serde(default = "default_anomaly_threshold")]
    pub threshold: f64,

    #[serde(default = "default_anomaly_features")]
    pub features: Vec<AnomalyFeature>,
}

impl Default for AnomalyParams {
    fn default() -> Self {
        Self {
            enabled: true,
            variance_target: default_variance_target(),
            threshold: default_anomaly_threshold(),
            features: default_anomaly_features(),
        }
    }
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level configuration for the analysis engine.
///
/// Every field has a serde default so that older JSON files missing new fields
/// will still deserialise correctly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub indicators: IndicatorWindows,

    #[serde(default)]
    pub trend: TrendParams,

    #[serde(default)]
    pub levels: LevelParams,

    #[serde(default)]
    pub scoring: ScoringParams,

    #[serde(default)]
    pub anomaly: AnomalyParams,
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read analysis config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse analysis config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("rejected analysis config from {}", path.display()))?;

        info!(
            path = %path.display(),
            anomaly_enabled = config.anomaly.enabled,
            "analysis config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise analysis config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "analysis config saved (atomic)");
        Ok(())
    }

    /// Reject values no indicator can work with.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let w = &self.indicators;
        let windows = [
            ("indicators.sma_short", w.sma_short),
            ("indicators.sma_medium", w.sma_medium),
            ("indicators.sma_long", w.sma_long),
            ("indicators.sma_trend", w.sma_trend),
            ("indicators.rsi", w.rsi),
            ("indicators.macd_fast", w.macd_fast),
            ("indicators.macd_slow", w.macd_slow),
            ("indicators.macd_signal", w.macd_signal),
            ("indicators.atr", w.atr),
            ("indicators.volume_average", w.volume_average),
            ("trend.slope_lookback", self.trend.slope_lookback),
            ("trend.adx_period", self.trend.adx_period),
            ("levels.window", self.levels.window),
        ];
        if let Some((name, _)) = windows.iter().find(|(_, v)| *v == 0) {
            return Err(invalid(format!("{name} must be at least 1")));
        }
        for (name, value) in [
            ("indicators.bollinger", w.bollinger),
            ("indicators.volatility", w.volatility),
        ] {
            if value < 2 {
                return Err(invalid(format!("{name} must be at least 2")));
            }
        }

        if !w.bollinger_std.is_finite() || w.bollinger_std < 0.0 {
            return Err(invalid(format!(
                "indicators.bollinger_std must be a non-negative number, got {}",
                w.bollinger_std
            )));
        }
        if !w.annualization.is_finite() || w.annualization <= 0.0 {
            return Err(invalid(format!(
                "indicators.annualization must be positive, got {}",
                w.annualization
            )));
        }

        let a = &self.anomaly;
        if !(a.variance_target > 0.0 && a.variance_target <= 1.0) {
            return Err(invalid(format!(
                "anomaly.variance_target must be in (0, 1], got {}",
                a.variance_target
            )));
        }
        if !a.threshold.is_finite() || a.threshold < 0.0 {
            return Err(invalid(format!(
                "anomaly.threshold must be a non-negative number, got {}",
                a.threshold
            )));
        }
        if a.enabled && a.features.is_empty() {
            return Err(invalid("anomaly.features must not be empty".to_string()));
        }

        let s = &self.scoring;
        if s.score_min > s.score_max {
            return Err(invalid(format!(
                "scoring.score_min {} exceeds scoring.score_max {}",
                s.score_min, s.score_max
            )));
        }
        if s.sell_score >= s.buy_score {
            return Err(invalid(format!(
                "scoring.sell_score {} must be below scoring.buy_score {}",
                s.sell_score, s.buy_score
            )));
        }

        Ok(())
    }
}

fn invalid(message: String) -> AnalysisError {
    AnalysisError::InvalidConfig { message }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.indicators.sma_short, 5);
        assert_eq!(cfg.indicators.sma_medium, 10);
        assert_eq!(cfg.indicators.sma_long, 20);
        assert_eq!(cfg.indicators.rsi, 14);
        assert_eq!(
            (cfg.indicators.macd_fast, cfg.indicators.macd_slow, cfg.indicators.macd_signal),
            (12, 26, 9)
        );
        assert_eq!(cfg.indicators.bollinger, 20);
        assert_eq!(cfg.indicators.atr, 14);
        assert_eq!(cfg.indicators.volatility, 20);
        assert!((cfg.indicators.annualization - 252.0_f64.sqrt()).abs() < f64::EPSILON);
        assert_eq!(cfg.trend.adx_period, 14);
        assert_eq!(cfg.levels.window, 20);
        assert!((cfg.anomaly.variance_target - 0.95).abs() < f64::EPSILON);
        assert!((cfg.anomaly.threshold - 3.0).abs() < f64::EPSILON);
        assert_eq!(
            cfg.anomaly.features,
            vec![AnomalyFeature::Close, AnomalyFeature::Volume]
        );
        assert!((cfg.scoring.base_score - 50.0).abs() < f64::EPSILON);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, RuntimeConfig::default());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "indicators": { "rsi": 9 }, "anomaly": { "threshold": 1.5 } }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.indicators.rsi, 9);
        assert_eq!(cfg.indicators.sma_long, 20);
        assert!((cfg.anomaly.threshold - 1.5).abs() < f64::EPSILON);
        assert!(cfg.anomaly.enabled);
    }

    #[test]
    fn validate_rejects_zero_window() {
        let mut cfg = RuntimeConfig::default();
        cfg.indicators.rsi = 0;
        assert!(matches!(cfg.validate(), Err(AnalysisError::InvalidConfig { .. })));
    }

    #[test]
    fn validate_rejects_bad_variance_target() {
        let mut cfg = RuntimeConfig::default();
        cfg.anomaly.variance_target = 1.5;
        assert!(cfg.validate().is_err());
        cfg.anomaly.variance_target = 0.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_negative_band_width() {
        let mut cfg = RuntimeConfig::default();
        cfg.indicators.bollinger_std = -1.0;
        assert!(matches!(cfg.validate(), Err(AnalysisError::InvalidConfig { .. })));
        cfg.indicators.bollinger_std = 0.0;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_annualization() {
        for value in [0.0, -252.0, f64::NAN, f64::INFINITY] {
            let mut cfg = RuntimeConfig::default();
            cfg.indicators.annualization = value;
            assert!(cfg.validate().is_err(), "accepted annualization {value}");
        }
    }

    #[test]
    fn validate_rejects_crossed_suggestion_thresholds() {
        let mut cfg = RuntimeConfig::default();
        cfg.scoring.sell_score = 70.0;
        assert!(matches!(cfg.validate(), Err(AnalysisError::InvalidConfig { .. })));
        cfg.scoring.sell_score = 80.0;
        assert!(cfg.validate().is_err());
        cfg.scoring.sell_score = 69.0;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis_config.json");

        let mut cfg = RuntimeConfig::default();
        cfg.scoring.buy_score = 75.0;
        cfg.anomaly.features = vec![AnomalyFeature::High, AnomalyFeature::Low];
        cfg.save(&path).unwrap();

        let loaded = RuntimeConfig::load(&path).unwrap();
        assert_eq!(loaded, cfg);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn load_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(RuntimeConfig::load(dir.path().join("missing.json")).is_err());
    }
}
