// =============================================================================
// Anomaly Detection Module
// =============================================================================
//
// Multivariate outlier detection on raw bars:
// - Standard scaling (per-call fit)
// - PCA with a variance-retention target
// - Per-row reconstruction error against a threshold

pub mod detector;
pub mod pca;
pub mod scaler;

pub use detector::{reconstruction_errors, AnomalyDetector, AnomalyFeature, AnomalyFlag, AnomalyReport};
pub use pca::Pca;
pub use scaler::StandardScaler;
