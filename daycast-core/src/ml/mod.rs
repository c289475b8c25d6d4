//! Binary classifiers behind a fit / predict / score contract.
//!
//! The controller only ever talks to `dyn Classifier`, so any model that
//! accepts the feature matrix layout (`FeatureColumn::ALL` order) and labels
//! in {0, 1} can replace the random forest.

pub mod forest;
pub mod split;
pub mod tree;

pub use forest::{ForestParams, RandomForestClassifier};
pub use split::train_test_split;
pub use tree::{DecisionTreeClassifier, MaxFeatures, TreeParams};

use ndarray::ArrayView2;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("model has not been fitted")]
    NotFitted,

    #[error("dimension mismatch: {rows} feature rows but {labels} labels")]
    DimensionMismatch { rows: usize, labels: usize },

    #[error("feature count mismatch: fitted on {expected} columns, got {actual}")]
    FeatureCountMismatch { expected: usize, actual: usize },

    #[error("cannot fit or score on an empty set")]
    EmptyInput,

    #[error("invalid label {0}: expected 0 or 1")]
    InvalidLabel(u8),

    #[error("invalid split: {0}")]
    InvalidSplit(String),
}

/// Three-operation classifier contract.
pub trait Classifier: Send + Sync {
    /// Human-readable model name.
    fn name(&self) -> &str;

    /// Fit from scratch on `x` (rows = samples) and binary labels `y`.
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[u8]) -> Result<(), ModelError>;

    /// Predict one binary label per row of `x`.
    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Vec<u8>, ModelError>;

    /// Fraction of rows whose predicted label equals the true label.
    fn score(&self, x: ArrayView2<'_, f64>, y: &[u8]) -> Result<f64, ModelError> {
        check_labels(x, y)?;
        let predicted = self.predict(x)?;
        Ok(accuracy(&predicted, y))
    }
}

/// Accuracy of `predicted` against `actual`; 0.0 for empty input.
pub fn accuracy(predicted: &[u8], actual: &[u8]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let hits = predicted
        .iter()
        .zip(actual)
        .filter(|(p, a)| p == a)
        .count();
    hits as f64 / actual.len() as f64
}

/// Validate a feature matrix / label pair before fitting or scoring.
pub(crate) fn check_labels(x: ArrayView2<'_, f64>, y: &[u8]) -> Result<(), ModelError> {
    if x.nrows() != y.len() {
        return Err(ModelError::DimensionMismatch {
            rows: x.nrows(),
            labels: y.len(),
        });
    }
    if y.is_empty() {
        return Err(ModelError::EmptyInput);
    }
    if let Some(&bad) = y.iter().find(|&&l| l > 1) {
        return Err(ModelError::InvalidLabel(bad));
    }
    Ok(())
}
