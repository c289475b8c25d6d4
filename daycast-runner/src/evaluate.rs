//! Split & validation controller.
//!
//! Given a feature table of n rows:
//! 1. Row n-1 is held out as the validate row. It never enters training.
//! 2. Rows 0..n-1 are shuffled with the run seed and split 80/20 into
//!    train and test (the split is not chronological).
//! 3. The classifier is fit on train and scored on test.
//! 4. The validate row is predicted and compared with its known target.

use daycast_core::domain::{Direction, ValidationOutcome};
use daycast_core::features::FeatureTable;
use daycast_core::ml::{
    train_test_split, Classifier, ForestParams, ModelError, RandomForestClassifier,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the prediction stage. These never abort a run; the runner
/// reports them in the response alongside the raw data.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Not enough data: {rows} feature rows, need at least {min_rows}")]
    InsufficientData { rows: usize, min_rows: usize },
    #[error(transparent)]
    Model(#[from] ModelError),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluateConfig {
    pub seed: u64,
    pub test_fraction: f64,
    pub min_rows: usize,
}

impl Default for EvaluateConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.2,
            min_rows: 30,
        }
    }
}

/// Row indices for each partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
    pub validate: usize,
}

/// Partition `n` rows: the last row validates, the rest are shuffled into
/// train and test.
pub fn split_rows(n: usize, config: &EvaluateConfig) -> Result<Split, PredictionError> {
    if n < config.min_rows {
        return Err(PredictionError::InsufficientData {
            rows: n,
            min_rows: config.min_rows,
        });
    }
    let (train, test) = train_test_split(n - 1, config.test_fraction, config.seed)?;
    Ok(Split {
        train,
        test,
        validate: n - 1,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_direction: Direction,
    pub validation_outcome: ValidationOutcome,
    pub actual_direction: Direction,
    pub test_accuracy: f64,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Evaluate with the default random forest, seeded from `config`.
pub fn evaluate(table: &FeatureTable, config: &EvaluateConfig) -> Result<PredictionResult, PredictionError> {
    let mut forest = RandomForestClassifier::new(ForestParams {
        seed: config.seed,
        ..ForestParams::default()
    });
    evaluate_with(table, &mut forest, config)
}

/// Evaluate with any classifier. The classifier is untouched when the table
/// is too short.
pub fn evaluate_with(
    table: &FeatureTable,
    classifier: &mut dyn Classifier,
    config: &EvaluateConfig,
) -> Result<PredictionResult, PredictionError> {
    let split = split_rows(table.len(), config)?;
    tracing::debug!(
        train = split.train.len(),
        test = split.test.len(),
        classifier = classifier.name(),
        "split feature rows"
    );

    let x_train = table.matrix_for(&split.train);
    let y_train = table.targets_for(&split.train);
    classifier.fit(x_train.view(), &y_train)?;

    let x_test = table.matrix_for(&split.test);
    let y_test = table.targets_for(&split.test);
    let test_accuracy = classifier.score(x_test.view(), &y_test)?;

    let x_validate = table.matrix_for(&[split.validate]);
    let predicted = classifier
        .predict(x_validate.view())?
        .first()
        .copied()
        .ok_or(ModelError::EmptyInput)?;
    let predicted_direction = Direction::from_label(predicted);
    let actual_direction = Direction::from_label(table.rows()[split.validate].target);

    let result = PredictionResult {
        predicted_direction,
        validation_outcome: ValidationOutcome::compare(predicted_direction, actual_direction),
        actual_direction,
        test_accuracy,
        train_rows: split.train.len(),
        test_rows: split.test.len(),
    };
    tracing::info!(
        prediction = %result.predicted_direction,
        outcome = %result.validation_outcome,
        accuracy = result.test_accuracy,
        "evaluated last day"
    );
    Ok(result)
}
