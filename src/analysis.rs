// =============================================================================
// Analysis Orchestrator
// =============================================================================
//
// Pipeline for one symbol:
//
//   bars ─► indicators ─┬─► trend ──┐
//                       └─► levels  ├─► scoring ─► AnalysisResult
//   bars ─► anomaly detector (optional) ────────────┘
//
// The orchestrator holds only immutable configuration. Every sub-model with
// fitted state (scaler, PCA) is created inside `analyze`, so the orchestrator
// can be shared across threads and used for many symbols at once.
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::anomaly::{AnomalyDetector, AnomalyReport};
use crate::error::AnalysisError;
use crate::indicators::{compute_series, IndicatorSnapshot};
use crate::levels::{estimate_levels, LevelSet};
use crate::runtime_config::RuntimeConfig;
use crate::signals::{ScoreContribution, TechnicalScorer};
use crate::trend::{TrendClassifier, TrendInfo};
use crate::types::{PriceBar, RiskLevel, TimeSeries, TradingSuggestion};

/// Everything the engine derives for one symbol at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub symbol: String,
    /// Date of the final bar the analysis is anchored on.
    pub as_of: NaiveDate,
    pub bars_analyzed: usize,
    pub indicators: IndicatorSnapshot,
    pub trend: TrendInfo,
    pub levels: LevelSet,
    pub technical_score: f64,
    pub score_contributions: Vec<ScoreContribution>,
    pub risk_score: Option<f64>,
    pub risk_level: RiskLevel,
    pub trading_suggestion: TradingSuggestion,
    /// `None` when detection was not requested.
    pub anomalies: Option<AnomalyReport>,
}

impl AnalysisResult {
    /// The opaque context blob handed to downstream predictors.
    pub fn technical_data(&self) -> serde_json::Value {
        normalize_json(serde_json::json!({
            "symbol": self.symbol,
            "as_of": self.as_of,
            "indicators": self.indicators,
            "trend": self.trend,
            "levels": self.levels,
            "technical_score": self.technical_score,
            "risk_level": self.risk_level,
            "trading_suggestion": self.trading_suggestion,
        }))
    }
}

/// Replace non-finite numbers with `null`, recursively.
///
/// Applied to every blob handed to consumers that assemble their own JSON
/// around the result.
pub fn normalize_json(value: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) if !f.is_finite() => Value::Null,
            _ => Value::Number(n),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_json).collect()),
        Value::Object(map) => {
            Value::Object(map.into_iter().map(|(k, v)| (k, normalize_json(v))).collect())
        }
        other => other,
    }
}

/// Façade running every stage of the analysis.
#[derive(Debug, Clone, Default)]
pub struct AnalysisOrchestrator {
    config: RuntimeConfig,
}

impl AnalysisOrchestrator {
    /// Build an orchestrator after validating `config`.
    pub fn new(config: RuntimeConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Analyse `series`, running anomaly detection when the config enables it.
    pub fn analyze(&self, symbol: &str, series: &TimeSeries) -> AnalysisResult {
        self.analyze_with(symbol, series, self.config.anomaly.enabled)
    }

    /// Validate raw bars, then analyse them.
    pub fn analyze_bars(
        &self,
        symbol: &str,
        bars: Vec<PriceBar>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let series = TimeSeries::new(bars)?;
        Ok(self.analyze(symbol, &series))
    }

    /// Analyse `series`, choosing explicitly whether to detect anomalies.
    pub fn analyze_with(&self, symbol: &str, series: &TimeSeries, detect_anomalies: bool) -> AnalysisResult {
        let cfg = &self.config;

        // --- 1. Indicators ---------------------------------------------------
        let full = compute_series(series, &cfg.indicators);
        let indicators = IndicatorSnapshot::from_series(&full, series.last().volume as f64);

        // --- 2. Trend and levels --------------------------------------------
        let trend = TrendClassifier::new(cfg.trend.clone()).classify(series.bars(), &full.sma_long);
        let levels = estimate_levels(series, &cfg.levels);

        // --- 3. Scoring ------------------------------------------------------
        let scoring = TechnicalScorer::new(cfg.scoring.clone()).evaluate(&indicators, &trend);

        // --- 4. Anomalies (fresh detector per call) --------------------------
        let anomalies = detect_anomalies.then(|| AnomalyDetector::new(cfg.anomaly.clone()).detect(series));

        debug!(
            symbol,
            bars = series.len(),
            trend = %trend.direction,
            levels_support = levels.support.len(),
            levels_resistance = levels.resistance.len(),
            "analysis stages complete"
        );

        info!(
            symbol,
            as_of = %series.last().date,
            score = scoring.technical_score,
            risk = %scoring.risk_level,
            suggestion = %scoring.trading_suggestion,
            anomalies = anomalies.as_ref().map_or(0, |a| a.flagged.len()),
            "analysis finished"
        );

        AnalysisResult {
            symbol: symbol.to_string(),
            as_of: series.last().date,
            bars_analyzed: series.len(),
            indicators,
            trend,
            levels,
            technical_score: scoring.technical_score,
            score_contributions: scoring.contributions,
            risk_score: scoring.risk_score,
            risk_level: scoring.risk_level,
            trading_suggestion: scoring.trading_suggestion,
            anomalies,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_support::{bars_from_closes, day, series_from_closes};
    use crate::types::TrendDirection;

    fn orchestrator() -> AnalysisOrchestrator {
        AnalysisOrchestrator::new(RuntimeConfig::default()).unwrap()
    }

    fn wavy(n: usize, phase: f64) -> TimeSeries {
        let bars = (0..n)
            .map(|i| {
                let x = i as f64;
                let close = 100.0 + (x * 0.3 + phase).sin() * 6.0 + x * 0.05;
                PriceBar {
                    date: day(i),
                    open: close - 0.4,
                    high: close + 1.2,
                    low: close - 1.1,
                    close,
                    volume: 10_000 + ((x * 0.7 + phase).cos() * 3_000.0) as u64,
                }
            })
            .collect();
        TimeSeries::new(bars).unwrap()
    }

    fn rising_with_spike() -> TimeSeries {
        let closes: Vec<f64> = (0..60).map(|i| 50.0 + i as f64).collect();
        let mut bars = bars_from_closes(&closes, 0.5);
        bars[59].volume = 5_000;
        TimeSeries::new(bars).unwrap()
    }

    #[test]
    fn constant_series_holds() {
        let result = orchestrator().analyze("FLAT", &series_from_closes(&[100.0; 30]));
        assert_eq!(result.indicators.volatility, Some(0.0));
        assert_eq!(result.indicators.rsi_14, None);
        // 30 bars is short of the 40 the slope needs, so the trend is unknown
        // rather than sideways; the suggestion still lands in the hold band.
        assert_eq!(result.trend.direction, TrendDirection::Unknown);
        // 50 - 5 (MACD not above signal); volume equals its average.
        assert!((result.technical_score - 45.0).abs() < 1e-10);
        assert_eq!(result.trading_suggestion, TradingSuggestion::Hold);
        assert!(result.anomalies.as_ref().unwrap().is_empty());
    }

    #[test]
    fn long_constant_series_is_sideways() {
        let result = orchestrator().analyze("FLAT", &series_from_closes(&[100.0; 45]));
        assert_eq!(result.trend.direction, TrendDirection::Sideways);
        assert_eq!(result.trading_suggestion, TradingSuggestion::Hold);
        assert_eq!(result.levels.support, vec![99.0]);
        assert_eq!(result.levels.resistance, vec![101.0]);
    }

    #[test]
    fn rising_series_with_volume_spike() {
        let result = orchestrator().analyze_with("UP", &rising_with_spike(), false);
        let rules: Vec<&str> = result.score_contributions.iter().map(|c| c.rule.as_str()).collect();
        assert!(rules.contains(&"sma_bullish_stack"));
        assert!(rules.contains(&"macd_above_signal"));
        assert!(rules.contains(&"volume_above_average"));
        assert!(rules.contains(&"rsi_overbought"));
        assert_eq!(result.trend.direction, TrendDirection::Up);
        // 50 + 10 + 5 + 5 - 5
        assert!((result.technical_score - 65.0).abs() < 1e-10);
        assert!(result.anomalies.is_none());
        assert_eq!(result.trading_suggestion, TradingSuggestion::Hold);
    }

    #[test]
    fn rising_series_buys_without_overbought_penalty() {
        let mut cfg = RuntimeConfig::default();
        cfg.scoring.rsi_overbought = 100.0;
        let engine = AnalysisOrchestrator::new(cfg).unwrap();

        let result = engine.analyze_with("UP", &rising_with_spike(), false);
        // 50 + 10 + 5 + 5
        assert!((result.technical_score - 70.0).abs() < 1e-10);
        assert_eq!(result.trend.direction, TrendDirection::Up);
        // Full ADX pushes risk into the medium band, which still allows a buy.
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert_eq!(result.trading_suggestion, TradingSuggestion::Buy);
    }

    #[test]
    fn short_series_still_returns_partial_result() {
        let result = orchestrator().analyze("NEW", &series_from_closes(&[10.0, 11.0, 12.0, 13.0, 14.0]));
        assert!((result.indicators.sma_5.unwrap() - 12.0).abs() < 1e-10);
        assert_eq!(result.indicators.sma_20, None);
        assert_eq!(result.risk_level, RiskLevel::Unknown);
        assert_eq!(result.trend.strength, 0.0);
        assert!(result.levels.support.is_empty());
        assert!((0.0..=100.0).contains(&result.technical_score));
    }

    #[test]
    fn analyze_bars_rejects_malformed_input() {
        let mut bars = bars_from_closes(&[1.0, 2.0, 3.0], 0.5);
        bars[2].date = bars[0].date;
        assert!(orchestrator().analyze_bars("BAD", bars).is_err());
    }

    #[test]
    fn new_rejects_invalid_config() {
        let mut cfg = RuntimeConfig::default();
        cfg.levels.window = 0;
        assert!(AnalysisOrchestrator::new(cfg).is_err());
    }

    #[test]
    fn repeated_calls_are_byte_identical() {
        let series = wavy(120, 0.0);
        let engine = orchestrator();
        let a = serde_json::to_string(&engine.analyze("AAA", &series)).unwrap();
        let b = serde_json::to_string(&engine.analyze("AAA", &series)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn concurrent_symbols_do_not_contaminate_each_other() {
        let engine = orchestrator();
        let first = wavy(150, 0.0);
        let second = wavy(90, 2.5);

        let solo_first = engine.analyze("AAA", &first);
        let solo_second = engine.analyze("BBB", &second);

        let (par_first, par_second) = std::thread::scope(|s| {
            let h1 = s.spawn(|| engine.analyze("AAA", &first));
            let h2 = s.spawn(|| engine.analyze("BBB", &second));
            (h1.join().unwrap(), h2.join().unwrap())
        });

        assert_eq!(solo_first, par_first);
        assert_eq!(solo_second, par_second);
    }

    #[test]
    fn score_stays_bounded_across_shapes() {
        let engine = orchestrator();
        let shapes: Vec<Vec<f64>> = vec![
            vec![100.0; 80],
            (0..80).map(|i| 100.0 + i as f64 * 3.0).collect(),
            (0..80).map(|i| 400.0 - i as f64 * 3.0).collect(),
            (0..80).map(|i| if i % 2 == 0 { 90.0 } else { 110.0 }).collect(),
        ];
        for closes in shapes {
            let result = engine.analyze("X", &series_from_closes(&closes));
            assert!((0.0..=100.0).contains(&result.technical_score));
            assert!((0.0..=1.0).contains(&result.trend.strength));
        }
    }

    #[test]
    fn json_output_uses_null_for_undefined() {
        let result = orchestrator().analyze("NEW", &series_from_closes(&[10.0, 11.0, 12.0]));
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["indicators"]["rsi_14"].is_null());
        assert!(json["risk_score"].is_null());
        assert_eq!(json["risk_level"], "unknown");
        assert_eq!(json["trend"]["direction"], "unknown");
    }

    #[test]
    fn technical_data_blob_shape() {
        let result = orchestrator().analyze("AAA", &wavy(80, 1.0));
        let blob = result.technical_data();
        for key in [
            "symbol",
            "as_of",
            "indicators",
            "trend",
            "levels",
            "technical_score",
            "risk_level",
            "trading_suggestion",
        ] {
            assert!(blob.get(key).is_some(), "missing {key}");
        }
        assert!(blob.get("anomalies").is_none());
    }

    #[test]
    fn normalize_json_keeps_finite_numbers() {
        let value = serde_json::json!({ "a": [1.5, null, { "b": 2 }], "c": "x" });
        assert_eq!(normalize_json(value.clone()), value);
    }
}
