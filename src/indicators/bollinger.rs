// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the rolling *sample* standard
// deviation (ddof = 1) over the same window.

use super::rolling::{defined, finite, rolling_mean, rolling_sample_std};

/// The three Bollinger bands, one entry per close.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BollingerSeries {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Calculate Bollinger Bands for the given closing prices.
///
/// All three bands are `None` for the first `period - 1` bars, and for every
/// bar when `period < 2` (the sample deviation is undefined).
pub fn calculate_bollinger(closes: &[f64], period: usize, num_std: f64) -> BollingerSeries {
    let values = defined(closes);
    let middle = rolling_mean(&values, period);
    let std_dev = rolling_sample_std(&values, period);

    let mut upper = Vec::with_capacity(closes.len());
    let mut lower = Vec::with_capacity(closes.len());
    let mut mid = Vec::with_capacity(closes.len());

    for (m, s) in middle.iter().zip(std_dev.iter()) {
        match (m, s) {
            (Some(m), Some(s)) => {
                upper.push(finite(m + num_std * s));
                mid.push(Some(*m));
                lower.push(finite(m - num_std * s));
            }
            _ => {
                upper.push(None);
                mid.push(None);
                lower.push(None);
            }
        }
    }

    BollingerSeries {
        upper,
        middle: mid,
        lower,
    }
}
