// =============================================================================
// Technical Scorer: rule-based score, risk bucket and trading suggestion
// =============================================================================
//
// Score (starts at `base_score`, clamped to [score_min, score_max]):
//   SMA stacking   short > medium > long  => +stacking_points
//                  short < medium < long  => -stacking_points
//   RSI            > overbought           => -rsi_points
//                  < oversold             => +rsi_points
//   MACD           macd > signal          => +macd_points
//                  otherwise / undefined  => -macd_points
//   Volume         last > rolling average => +volume_points
//
// Risk composite:
//   risk = w_vol * volatility + w_score * (score_max - score) + w_trend * strength * 100
//   risk < low_below => LOW, < medium_below => MEDIUM, else HIGH.
//   Undefined volatility => UNKNOWN.
//
// Suggestion (first match wins):
//   score >= buy_score  && risk != HIGH && trend UP   => BUY
//   score <= sell_score && trend DOWN                 => SELL
//   sell_score < score < buy_score                    => HOLD
//   otherwise                                         => UNDETERMINED
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::IndicatorSnapshot;
use crate::runtime_config::ScoringParams;
use crate::trend::TrendInfo;
use crate::types::{RiskLevel, TradingSuggestion, TrendDirection};

/// The points a single rule added to (or removed from) the score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreContribution {
    pub rule: String,
    pub points: f64,
}

/// Output of the scoring stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub technical_score: f64,
    /// Composite risk value; `None` when volatility is undefined.
    pub risk_score: Option<f64>,
    pub risk_level: RiskLevel,
    pub trading_suggestion: TradingSuggestion,
    pub contributions: Vec<ScoreContribution>,
}

/// Deterministic rule scorer. Holds only its parameters.
#[derive(Debug, Clone, Default)]
pub struct TechnicalScorer {
    params: ScoringParams,
}

impl TechnicalScorer {
    pub fn new(params: ScoringParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ScoringParams {
        &self.params
    }

    /// Run score → risk → suggestion.
    pub fn evaluate(&self, snapshot: &IndicatorSnapshot, trend: &TrendInfo) -> ScoringResult {
        let (technical_score, contributions) = self.technical_score(snapshot);
        let risk_score = self.risk_score(snapshot.volatility, technical_score, trend.strength);
        let risk_level = self.risk_level(risk_score);
        let trading_suggestion = self.suggest(technical_score, risk_level, trend.direction);

        debug!(
            score = technical_score,
            risk_score = ?risk_score,
            risk_level = %risk_level,
            suggestion = %trading_suggestion,
            "scoring complete"
        );

        ScoringResult {
            technical_score,
            risk_score,
            risk_level,
            trading_suggestion,
            contributions,
        }
    }

    /// Bounded technical score plus the rules that fired.
    pub fn technical_score(&self, snap: &IndicatorSnapshot) -> (f64, Vec<ScoreContribution>) {
        let p = &self.params;
        let mut contributions = Vec::with_capacity(4);
        let mut push = |rule: &str, points: f64| {
            contributions.push(ScoreContribution {
                rule: rule.to_string(),
                points,
            });
        };

        // --- Moving-average stacking ---------------------------------------
        if let (Some(short), Some(medium), Some(long)) = (snap.sma_5, snap.sma_10, snap.sma_20) {
            if short > medium && medium > long {
                push("sma_bullish_stack", p.stacking_points);
            } else if short < medium && medium < long {
                push("sma_bearish_stack", -p.stacking_points);
            }
        }

        // --- RSI ----------------------------------------------------------
        if let Some(rsi) = snap.rsi_14 {
            if rsi > p.rsi_overbought {
                push("rsi_overbought", -p.rsi_points);
            } else if rsi < p.rsi_oversold {
                push("rsi_oversold", p.rsi_points);
            }
        }

        // --- MACD (undefined counts against) -------------------------------
        match (snap.macd, snap.macd_signal) {
            (Some(macd), Some(signal)) if macd > signal => {
                push("macd_above_signal", p.macd_points);
            }
            _ => push("macd_not_above_signal", -p.macd_points),
        }

        // --- Volume -------------------------------------------------------
        if let (Some(volume), Some(avg)) = (snap.volume, snap.volume_avg) {
            if volume > avg {
                push("volume_above_average", p.volume_points);
            }
        }

        let raw = p.base_score + contributions.iter().map(|c| c.points).sum::<f64>();
        (raw.clamp(p.score_min, p.score_max), contributions)
    }

    /// Composite risk value, or `None` when volatility is undefined.
    pub fn risk_score(&self, volatility: Option<f64>, score: f64, strength: f64) -> Option<f64> {
        let p = &self.params;
        let volatility = volatility?;
        let risk = p.volatility_weight * volatility
            + p.score_weight * (p.score_max - score)
            + p.trend_weight * (strength * 100.0);
        risk.is_finite().then_some(risk)
    }

    pub fn risk_level(&self, risk_score: Option<f64>) -> RiskLevel {
        match risk_score {
            None => RiskLevel::Unknown,
            Some(r) if r < self.params.risk_low_below => RiskLevel::Low,
            Some(r) if r < self.params.risk_medium_below => RiskLevel::Medium,
            Some(_) => RiskLevel::High,
        }
    }

    pub fn suggest(&self, score: f64, risk: RiskLevel, trend: TrendDirection) -> TradingSuggestion {
        let p = &self.params;
        if score >= p.buy_score && risk != RiskLevel::High && trend == TrendDirection::Up {
            TradingSuggestion::Buy
        } else if score <= p.sell_score && trend == TrendDirection::Down {
            TradingSuggestion::Sell
        } else if score > p.sell_score && score < p.buy_score {
            TradingSuggestion::Hold
        } else {
            TradingSuggestion::Undetermined
        }
    }
}
