// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators used by the
// analysis engine. Every series function returns one `Option<f64>` per input
// bar so callers are forced to handle insufficient-data and numerical
// edge-case scenarios explicitly.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod engine;
pub mod macd;
pub mod rolling;
pub mod rsi;
pub mod sma;
pub mod volatility;

pub use engine::{compute_series, IndicatorSeries, IndicatorSnapshot};
