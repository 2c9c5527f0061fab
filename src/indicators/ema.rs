// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula (recursive form, no finite-history renormalisation):
//   alpha  = 2 / (span + 1)
//   EMA_0  = x_0
//   EMA_t  = x_t * alpha + EMA_{t-1} * (1 - alpha)
//
// Leading undefined inputs are skipped: the recursion is seeded by the first
// defined value. An undefined value after the seed carries the previous EMA
// forward without emitting it.
// =============================================================================

use super::rolling::finite;

/// Compute the EMA series for `values` with the given `span`.
///
/// # Edge cases
/// - `span == 0` => every entry is `None`
/// - entries before the first defined input are `None`
/// - an undefined input yields `None` at that bar but does not reset the EMA
pub fn calculate_ema(values: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    if span == 0 {
        return vec![None; values.len()];
    }

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev: Option<f64> = None;

    values
        .iter()
        .map(|value| {
            let x = (*value)?;
            let next = match prev {
                None => x,
                Some(p) => x * alpha + p * (1.0 - alpha),
            };
            let next = finite(next)?;
            prev = Some(next);
            Some(next)
        })
        .collect()
}
