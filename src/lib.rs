// =============================================================================
// Quant Analysis Engine
// =============================================================================
//
// Technical analysis over daily OHLCV bars: rolling indicators, trend,
// support/resistance, rule-based scoring and PCA anomaly detection, wired
// together by `AnalysisOrchestrator`.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
pub mod analysis;
pub mod anomaly;
pub mod error;
pub mod fundamentals;
pub mod indicators;
pub mod levels;
pub mod runtime_config;
pub mod signals;
pub mod stats;
pub mod trend;
pub mod types;

pub use analysis::{normalize_json, AnalysisOrchestrator, AnalysisResult};
pub use error::AnalysisError;
pub use runtime_config::RuntimeConfig;
pub use types::{PriceBar, RiskLevel, TimeSeries, TradingSuggestion, TrendDirection};
