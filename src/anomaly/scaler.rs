// =============================================================================
// Standard Scaler: zero mean, unit variance per column
// =============================================================================
//
// Uses the population standard deviation. A zero-variance column keeps a
// scale of 1.0, so it standardises to all zeros instead of dividing by zero.

use ndarray::{Array1, Array2, Axis};

#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    /// Fit column statistics. Returns `None` for a matrix without rows.
    pub fn fit(data: &Array2<f64>) -> Option<Self> {
        let mean = data.mean_axis(Axis(0))?;
        let scale = data
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > f64::EPSILON && s.is_finite() { s } else { 1.0 });
        Some(Self { mean, scale })
    }

    pub fn transform(&self, data: &Array2<f64>) -> Array2<f64> {
        (data - &self.mean) / &self.scale
    }

    pub fn fit_transform(data: &Array2<f64>) -> Option<(Self, Array2<f64>)> {
        let scaler = Self::fit(data)?;
        let scaled = scaler.transform(data);
        Some((scaler, scaled))
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn scale(&self) -> &Array1<f64> {
        &self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn standardises_columns() {
        let data = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]];
        let (scaler, scaled) = StandardScaler::fit_transform(&data).unwrap();
        assert!((scaler.mean()[0] - 2.0).abs() < 1e-12);
        assert!((scaler.mean()[1] - 20.0).abs() < 1e-12);

        for col in scaled.axis_iter(Axis(1)) {
            let mean = col.sum() / col.len() as f64;
            let var = col.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / col.len() as f64;
            assert!(mean.abs() < 1e-12);
            assert!((var - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn constant_column_becomes_zero() {
        let data = array![[5.0, 1.0], [5.0, 2.0], [5.0, 3.0]];
        let (scaler, scaled) = StandardScaler::fit_transform(&data).unwrap();
        assert_eq!(scaler.scale()[0], 1.0);
        assert!(scaled.column(0).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn empty_matrix_cannot_be_fitted() {
        let data = Array2::<f64>::zeros((0, 2));
        assert!(StandardScaler::fit(&data).is_none());
    }
}
