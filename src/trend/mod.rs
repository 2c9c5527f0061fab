// =============================================================================
// Trend Module
// =============================================================================
//
// Trend direction (SMA slope) and trend strength (normalised ADX).

pub mod classifier;

pub use classifier::{TrendClassifier, TrendInfo};
