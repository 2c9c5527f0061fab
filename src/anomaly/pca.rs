// =============================================================================
// Principal Component Analysis
// =============================================================================
//
// 1. Centre the data and form the sample covariance matrix.
// 2. Diagonalise it with nalgebra's symmetric eigen-decomposition (one
//    row/column per feature).
// 3. Sort eigenpairs by descending eigenvalue and keep the smallest number of
//    components whose cumulative explained-variance ratio reaches the target.
//
// The fitted projector is a plain value; nothing is cached between fits.
// =============================================================================

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2, Axis};
use tracing::trace;

/// Slack on the variance target to absorb rounding in the ratio sum.
const TARGET_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct Pca {
    mean: Array1<f64>,
    /// Retained principal axes, one per row (k x d).
    components: Array2<f64>,
    explained_variance_ratio: Vec<f64>,
}

impl Pca {
    /// Fit on `data` (rows = samples). Returns `None` with fewer than two rows
    /// or when the data carries no variance at all.
    pub fn fit(data: &Array2<f64>, variance_target: f64) -> Option<Self> {
        let (n, d) = data.dim();
        if n < 2 || d == 0 {
            return None;
        }

        let mean = data.mean_axis(Axis(0))?;
        let centered = data - &mean;
        let covariance = centered.t().dot(&centered) / (n - 1) as f64;

        let (values, vectors) = symmetric_eigen(&covariance);

        let mut order: Vec<usize> = (0..d).collect();
        order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));

        let total: f64 = values.iter().map(|v| v.max(0.0)).sum();
        if total <= 0.0 || !total.is_finite() {
            return None;
        }

        let ratios: Vec<f64> = order.iter().map(|&i| values[i].max(0.0) / total).collect();

        let mut cumulative = 0.0;
        let mut keep = d;
        for (k, ratio) in ratios.iter().enumerate() {
            cumulative += ratio;
            if cumulative + TARGET_TOLERANCE >= variance_target {
                keep = k + 1;
                break;
            }
        }

        let mut components = Array2::<f64>::zeros((keep, d));
        for (row, &idx) in order.iter().take(keep).enumerate() {
            components.row_mut(row).assign(&vectors.column(idx));
        }

        trace!(features = d, retained = keep, "pca fitted");

        Some(Self {
            mean,
            components,
            explained_variance_ratio: ratios[..keep].to_vec(),
        })
    }

    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }

    pub fn explained_variance_ratio(&self) -> &[f64] {
        &self.explained_variance_ratio
    }

    /// Project onto the retained axes (n x k).
    pub fn transform(&self, data: &Array2<f64>) -> Array2<f64> {
        (data - &self.mean).dot(&self.components.t())
    }

    /// Map projected scores back to feature space (n x d).
    pub fn inverse_transform(&self, projected: &Array2<f64>) -> Array2<f64> {
        projected.dot(&self.components) + &self.mean
    }
}

/// Eigen-decomposition of a symmetric matrix.
///
/// Returns eigenvalues (unsorted) and the matrix whose columns are the
/// corresponding unit eigenvectors.
fn symmetric_eigen(a: &Array2<f64>) -> (Vec<f64>, Array2<f64>) {
    let n = a.nrows();
    let matrix = DMatrix::from_fn(n, n, |i, j| a[[i, j]]);
    let eigen = SymmetricEigen::new(matrix);

    let values = eigen.eigenvalues.iter().copied().collect();
    let vectors = Array2::from_shape_fn((n, n), |(i, j)| eigen.eigenvectors[(i, j)]);
    (values, vectors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn rank_two_data_over_five_features() {
        let data = Array2::from_shape_fn((20, 5), |(i, j)| {
            let a = i as f64;
            let b = ((i * i) % 7) as f64;
            match j {
                0 => a,
                1 => 2.0 * a,
                2 => b,
                3 => a + b,
                _ => -b,
            }
        });
        let pca = Pca::fit(&data, 0.999).unwrap();
        assert_eq!(pca.n_components(), 2);

        let ratios = pca.explained_variance_ratio();
        assert!(ratios[0] >= ratios[1]);
        assert!((ratios.iter().sum::<f64>() - 1.0).abs() < 1e-9);

        let gram = pca.components.dot(&pca.components.t());
        for ((i, j), v) in gram.indexed_iter() {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert!((v - expected).abs() < 1e-9);
        }

        let rebuilt = pca.inverse_transform(&pca.transform(&data));
        for (a, b) in rebuilt.iter().zip(data.iter()) {
            assert!((a - b).abs() < 1e-8);
        }
    }

    #[test]
    fn perfectly_correlated_needs_one_component() {
        let data = array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0], [4.0, 8.0]];
        let pca = Pca::fit(&data, 0.95).unwrap();
        assert_eq!(pca.n_components(), 1);
        assert!((pca.explained_variance_ratio()[0] - 1.0).abs() < 1e-12);

        let rebuilt = pca.inverse_transform(&pca.transform(&data));
        for (a, b) in rebuilt.iter().zip(data.iter()) {
            assert!((a - b).abs() < 1e-10);
        }
    }

    #[test]
    fn uncorrelated_keeps_both() {
        let data = array![[1.0, 0.0], [-1.0, 0.0], [0.0, 1.0], [0.0, -1.0]];
        let pca = Pca::fit(&data, 0.95).unwrap();
        assert_eq!(pca.n_components(), 2);
    }

    #[test]
    fn constant_data_cannot_be_fitted() {
        let data = array![[1.0, 1.0], [1.0, 1.0], [1.0, 1.0]];
        assert!(Pca::fit(&data, 0.95).is_none());
    }
}
