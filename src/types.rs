// =============================================================================
// Shared types used across the analysis engine
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// A single daily OHLCV bar as delivered by the crawler/storage layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Validated, date-ascending series of bars for one symbol.
///
/// The only way to obtain one is through [`TimeSeries::new`] (or the JSON
/// helpers that call it), so every indicator downstream may assume strictly
/// increasing dates and finite prices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    bars: Vec<PriceBar>,
}

impl TimeSeries {
    /// Validate `bars` and wrap them.
    ///
    /// Rejects empty input, non-finite prices, `high < low`, duplicated dates
    /// and dates that go backwards. Nothing is reordered or repaired.
    pub fn new(bars: Vec<PriceBar>) -> Result<Self, AnalysisError> {
        if bars.is_empty() {
            return Err(AnalysisError::EmptySeries);
        }

        for (index, bar) in bars.iter().enumerate() {
            let fields = [
                ("open", bar.open),
                ("high", bar.high),
                ("low", bar.low),
                ("close", bar.close),
            ];
            if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
                return Err(AnalysisError::MalformedBar {
                    index,
                    reason: format!("{name} is not finite ({value})"),
                });
            }
            if bar.high < bar.low {
                return Err(AnalysisError::MalformedBar {
                    index,
                    reason: format!("high {} below low {}", bar.high, bar.low),
                });
            }

            if index > 0 {
                let previous = bars[index - 1].date;
                if bar.date == previous {
                    return Err(AnalysisError::DuplicateDate {
                        index,
                        date: bar.date,
                    });
                }
                if bar.date < previous {
                    return Err(AnalysisError::NonMonotonicDates {
                        index,
                        date: bar.date,
                        previous,
                    });
                }
            }
        }

        Ok(Self { bars })
    }

    /// Decode a JSON array of bars and validate it.
    ///
    /// Missing columns surface as [`AnalysisError::MalformedInput`].
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        let bars: Vec<PriceBar> = serde_json::from_str(json)?;
        Self::new(bars)
    }

    /// Same as [`TimeSeries::from_json`] for an already-parsed value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, AnalysisError> {
        let bars: Vec<PriceBar> = serde_json::from_value(value)?;
        Self::new(bars)
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a constructed series; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> &PriceBar {
        // Non-empty by construction.
        &self.bars[self.bars.len() - 1]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume as f64).collect()
    }
}

/// Direction of the SMA20 slope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Sideways,
    #[default]
    Unknown,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
            Self::Sideways => write!(f, "sideways"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Composite risk bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    #[default]
    Unknown,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Discrete trading suggestion. `Hold` covers the "hold / watch" band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradingSuggestion {
    Buy,
    Sell,
    Hold,
    /// No rule matched; needs further observation.
    #[default]
    Undetermined,
}

impl std::fmt::Display for TradingSuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
            Self::Hold => write!(f, "hold"),
            Self::Undetermined => write!(f, "undetermined"),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn accepts_ordered_series() {
        let series = series_from_closes(&[1.0, 2.0, 3.0]);
        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.last().close, 3.0);
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(TimeSeries::new(Vec::new()), Err(AnalysisError::EmptySeries));
    }

    #[test]
    fn rejects_duplicate_date() {
        let mut bars = bars_from_closes(&[1.0, 2.0, 3.0], 0.5);
        bars[2].date = bars[1].date;
        assert!(matches!(
            TimeSeries::new(bars),
            Err(AnalysisError::DuplicateDate { index: 2, .. })
        ));
    }

    #[test]
    fn rejects_backwards_date() {
        let mut bars = bars_from_closes(&[1.0, 2.0, 3.0], 0.5);
        bars.swap(0, 2);
        assert!(matches!(
            TimeSeries::new(bars),
            Err(AnalysisError::NonMonotonicDates { index: 1, .. })
        ));
    }

    #[test]
    fn rejects_nan_price() {
        let mut bars = bars_from_closes(&[1.0, 2.0, 3.0], 0.5);
        bars[1].close = f64::NAN;
        assert!(matches!(
            TimeSeries::new(bars),
            Err(AnalysisError::MalformedBar { index: 1, .. })
        ));
    }

    #[test]
    fn rejects_inverted_range() {
        let mut bars = bars_from_closes(&[1.0, 2.0], 0.5);
        bars[0].high = 0.0;
        assert!(matches!(
            TimeSeries::new(bars),
            Err(AnalysisError::MalformedBar { index: 0, .. })
        ));
    }

    #[test]
    fn json_missing_column_is_malformed_input() {
        let json = r#"[{ "date": "2024-01-02", "open": 1.0, "high": 2.0, "low": 0.5, "volume": 10 }]"#;
        assert!(matches!(
            TimeSeries::from_json(json),
            Err(AnalysisError::MalformedInput(_))
        ));
    }

    #[test]
    fn json_roundtrip_of_valid_bars() {
        let json = r#"[
            { "date": "2024-01-02", "open": 1.0, "high": 2.0, "low": 0.5, "close": 1.5, "volume": 10 },
            { "date": "2024-01-03", "open": 1.5, "high": 2.5, "low": 1.0, "close": 2.0, "volume": 12 }
        ]"#;
        let series = TimeSeries::from_json(json).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.volumes(), vec![10.0, 12.0]);
    }

    #[test]
    fn enums_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&TrendDirection::Sideways).unwrap(), "\"sideways\"");
        assert_eq!(serde_json::to_string(&RiskLevel::Unknown).unwrap(), "\"unknown\"");
        assert_eq!(serde_json::to_string(&TradingSuggestion::Hold).unwrap(), "\"hold\"");
        assert_eq!(TradingSuggestion::Undetermined.to_string(), "undetermined");
    }

    #[test]
    fn enums_default_to_undetermined_states() {
        assert_eq!(TrendDirection::default(), TrendDirection::Unknown);
        assert_eq!(RiskLevel::default(), RiskLevel::Unknown);
        assert_eq!(TradingSuggestion::default(), TradingSuggestion::Undetermined);
    }
}
