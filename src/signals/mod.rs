// =============================================================================
// Signals Module
// =============================================================================
//
// Rule-based technical scoring: bounded score, risk bucket and trading
// suggestion derived from the indicator snapshot and trend.

pub mod technical_score;

pub use technical_score::{ScoreContribution, ScoringResult, TechnicalScorer};
