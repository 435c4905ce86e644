//! Data transformation: fit the preprocessor and build training matrices.

use std::path::{Path, PathBuf};

use ndarray::{concatenate, Array1, Array2, Axis};
use tracing::info;

use crate::artifact;
use crate::config::PipelineConfig;
use crate::dataset::{Dataset, StudentRecord, TARGET_COLUMN};
use crate::error::{Result, ScorecastError};
use crate::preprocess::Preprocessor;

/// Artifact kind tag for the persisted preprocessor.
pub const PREPROCESSOR_KIND: &str = "preprocessor";

/// Fits the preprocessor on the training split and produces the transformed
/// train and test matrices, each with the target appended as the last
/// column.
#[derive(Debug, Clone)]
pub struct DataTransformation {
    config: PipelineConfig,
}

impl DataTransformation {
    /// Creates a transformation stage with the given configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Builds the unfitted column-wise preprocessor.
    pub fn build_preprocessor(&self) -> Preprocessor {
        Preprocessor::new(self.config.unseen_category_policy)
    }

    /// Runs the transformation stage.
    ///
    /// Reads the two split datasets, separates the `math_score` target from
    /// the feature columns, fits the preprocessor on training features only,
    /// applies it (without refitting) to both splits, appends each target as
    /// the final matrix column, and persists the fitted preprocessor.
    ///
    /// Returns `(train_matrix, test_matrix, preprocessor_path)`.
    pub fn run(
        &self,
        train_path: &Path,
        test_path: &Path,
    ) -> Result<(Array2<f64>, Array2<f64>, PathBuf)> {
        let train = Dataset::from_csv(train_path)?;
        let test = Dataset::from_csv(test_path)?;
        info!(
            train_rows = train.len(),
            test_rows = test.len(),
            "split datasets loaded"
        );

        let y_train = extract_targets(train.records())?;
        let y_test = extract_targets(test.records())?;

        let mut preprocessor = self.build_preprocessor();
        preprocessor.fit(train.records())?;
        info!(
            output_dim = preprocessor.output_dim()?,
            "preprocessor fitted on training features"
        );

        let x_train = preprocessor.transform(train.records())?;
        let x_test = preprocessor.transform(test.records())?;

        let train_matrix = append_target(x_train, y_train)?;
        let test_matrix = append_target(x_test, y_test)?;

        let preprocessor_path = self.config.artifacts.preprocessor_path();
        artifact::save_object(&preprocessor_path, PREPROCESSOR_KIND, &preprocessor)?;
        info!(path = %preprocessor_path.display(), "preprocessor artifact saved");

        Ok((train_matrix, test_matrix, preprocessor_path))
    }
}

/// Pulls the target column out of split records, erroring on any row where
/// it is absent.
fn extract_targets(records: &[StudentRecord]) -> Result<Array1<f64>> {
    let mut targets = Vec::with_capacity(records.len());
    for (row, record) in records.iter().enumerate() {
        let value = record
            .math_score
            .ok_or_else(|| ScorecastError::MissingTarget {
                column: TARGET_COLUMN.to_string(),
                row,
            })?;
        targets.push(value);
    }
    Ok(Array1::from_vec(targets))
}

/// Appends the target vector as the final matrix column.
fn append_target(features: Array2<f64>, targets: Array1<f64>) -> Result<Array2<f64>> {
    if features.nrows() != targets.len() {
        return Err(ScorecastError::DimensionMismatch {
            expected: features.nrows(),
            actual: targets.len(),
        });
    }
    let column = targets.insert_axis(Axis(1));
    concatenate(Axis(1), &[features.view(), column.view()])
        .map_err(|e| ScorecastError::training(format!("failed to append target column: {e}")))
}
