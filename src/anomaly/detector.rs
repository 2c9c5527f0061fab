// =============================================================================
// Anomaly Detector: PCA reconstruction error
// =============================================================================
//
// For the chosen feature columns:
//   1. standardise every column (scaler fitted on this window only)
//   2. fit PCA and keep enough components to reach the variance target
//   3. reconstruct the standardised rows from the retained components
//   4. error_i = mean over features of (x_ij - x̂_ij)^2
//   5. flag rows with error_i > threshold
//
// The scaler and projector are locals of `detect`; two calls never share
// fitted state. Too few rows (<= number of features) or a window with no
// variance yields an empty report rather than an error.
// =============================================================================

use chrono::NaiveDate;
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::pca::Pca;
use super::scaler::StandardScaler;
use crate::runtime_config::AnomalyParams;
use crate::types::{PriceBar, TimeSeries};

/// Bar column fed into the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalyFeature {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl AnomalyFeature {
    pub fn extract(self, bar: &PriceBar) -> f64 {
        match self {
            Self::Open => bar.open,
            Self::High => bar.high,
            Self::Low => bar.low,
            Self::Close => bar.close,
            Self::Volume => bar.volume as f64,
        }
    }
}

/// One bar whose reconstruction error exceeded the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyFlag {
    pub index: usize,
    pub date: NaiveDate,
    pub error: f64,
}

/// Result of one detection pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub flagged: Vec<AnomalyFlag>,
    /// Principal components kept; 0 when the detector did not run.
    pub components_retained: usize,
    pub threshold: f64,
}

impl AnomalyReport {
    pub fn is_empty(&self) -> bool {
        self.flagged.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnomalyDetector {
    params: AnomalyParams,
}

impl AnomalyDetector {
    pub fn new(params: AnomalyParams) -> Self {
        Self { params }
    }

    /// Build the feature matrix for `series` (rows = bars).
    pub fn feature_matrix(&self, series: &TimeSeries) -> Array2<f64> {
        let features = &self.params.features;
        let bars = series.bars();
        Array2::from_shape_fn((bars.len(), features.len()), |(i, j)| {
            features[j].extract(&bars[i])
        })
    }

    /// Flag outlier bars of `series`.
    pub fn detect(&self, series: &TimeSeries) -> AnomalyReport {
        let matrix = self.feature_matrix(series);
        let mut report = AnomalyReport {
            threshold: self.params.threshold,
            ..AnomalyReport::default()
        };

        let Some((errors, retained)) = reconstruction_errors(&matrix, self.params.variance_target)
        else {
            debug!(rows = matrix.nrows(), "anomaly detection skipped");
            return report;
        };

        report.components_retained = retained;
        report.flagged = errors
            .iter()
            .enumerate()
            .filter(|(_, e)| **e > self.params.threshold)
            .map(|(index, &error)| AnomalyFlag {
                index,
                date: series.bars()[index].date,
                error,
            })
            .collect();

        debug!(
            rows = matrix.nrows(),
            retained,
            flagged = report.flagged.len(),
            "anomaly detection complete"
        );
        report
    }
}

/// Per-row mean squared reconstruction error in standardised units, plus the
/// number of retained components.
///
/// Returns `None` when there are not more rows than features, or the matrix
/// has no variance.
pub fn reconstruction_errors(matrix: &Array2<f64>, variance_target: f64) -> Option<(Vec<f64>, usize)> {
    let (rows, cols) = matrix.dim();
    if cols == 0 || rows <= cols || matrix.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let (_, scaled) = StandardScaler::fit_transform(matrix)?;
    let pca = Pca::fit(&scaled, variance_target)?;
    let rebuilt = pca.inverse_transform(&pca.transform(&scaled));

    let errors = (&scaled - &rebuilt)
        .mapv(|d| d * d)
        .mean_axis(Axis(1))?
        .to_vec();

    Some((errors, pca.n_components()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::test_support::day;

    /// Closes and volume move in lockstep except for a volume spike at
    /// `spike_at`.
    fn lockstep_series(n: usize, spike_at: Option<usize>) -> TimeSeries {
        let bars = (0..n)
            .map(|i| {
                let close = 10.0 + i as f64 * 0.1;
                let mut volume = 1_000 + i as u64 * 10;
                if Some(i) == spike_at {
                    volume += 5_000;
                }
                PriceBar {
                    date: day(i),
                    open: close,
                    high: close + 0.05,
                    low: close - 0.05,
                    close,
                    volume,
                }
            })
            .collect();
        TimeSeries::new(bars).unwrap()
    }

    #[test]
    fn flags_the_volume_spike() {
        let series = lockstep_series(400, Some(200));
        let report = AnomalyDetector::default().detect(&series);
        assert_eq!(report.components_retained, 1);
        assert_eq!(report.flagged.len(), 1);
        assert_eq!(report.flagged[0].index, 200);
        assert_eq!(report.flagged[0].date, day(200));
        assert!(report.flagged[0].error > 3.0);
    }

    #[test]
    fn clean_lockstep_series_has_no_anomalies() {
        let series = lockstep_series(100, None);
        let report = AnomalyDetector::default().detect(&series);
        assert!(report.is_empty());
        assert_eq!(report.components_retained, 1);
    }

    #[test]
    fn too_few_rows_returns_empty() {
        let series = lockstep_series(2, None);
        let report = AnomalyDetector::default().detect(&series);
        assert!(report.is_empty());
        assert_eq!(report.components_retained, 0);
        assert!((report.threshold - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn constant_window_returns_empty() {
        let bars = (0..30)
            .map(|i| PriceBar {
                date: day(i),
                open: 5.0,
                high: 5.0,
                low: 5.0,
                close: 5.0,
                volume: 100,
            })
            .collect();
        let series = TimeSeries::new(bars).unwrap();
        assert!(AnomalyDetector::default().detect(&series).is_empty());
    }

    #[test]
    fn lower_threshold_flags_more() {
        let series = lockstep_series(400, Some(200));
        let strict = AnomalyDetector::new(AnomalyParams {
            threshold: 0.0,
            ..AnomalyParams::default()
        });
        let report = strict.detect(&series);
        assert!(report.flagged.len() > 1);
    }

    #[test]
    fn feature_matrix_follows_configured_columns() {
        let series = lockstep_series(3, None);
        let detector = AnomalyDetector::new(AnomalyParams {
            features: vec![AnomalyFeature::Volume, AnomalyFeature::High],
            ..AnomalyParams::default()
        });
        let m = detector.feature_matrix(&series);
        assert_eq!(m.dim(), (3, 2));
        assert_eq!(m[[1, 0]], 1_010.0);
        assert!((m[[1, 1]] - 10.15).abs() < 1e-12);
    }

    #[test]
    fn errors_are_mean_over_features() {
        let series = lockstep_series(400, Some(200));
        let detector = AnomalyDetector::default();
        let (errors, retained) = reconstruction_errors(&detector.feature_matrix(&series), 0.95).unwrap();
        assert_eq!(retained, 1);
        assert_eq!(errors.len(), 400);
        assert!(errors.iter().all(|e| *e >= 0.0));
        let max_index = errors
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(max_index, 200);
    }
}
