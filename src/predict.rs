//! Inference: load persisted artifacts and predict a single record.

use ndarray::Axis;
use tracing::debug;

use crate::artifact;
use crate::config::PipelineConfig;
use crate::dataset::StudentRecord;
use crate::error::Result;
use crate::models::{Regressor, TrainedModel};
use crate::preprocess::Preprocessor;
use crate::trainer::MODEL_KIND;
use crate::transform::PREPROCESSOR_KIND;

/// Predicts a math score for one record using the artifacts of the latest
/// training run.
///
/// Artifacts are re-read on every call so predictions always reflect the
/// files on disk; the pipeline never writes to them.
#[derive(Debug, Clone)]
pub struct PredictPipeline {
    config: PipelineConfig,
}

impl PredictPipeline {
    /// Creates a predict pipeline reading artifacts from the configured
    /// directory.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Transforms the record with the persisted preprocessor and applies the
    /// persisted model. Returns the unrounded prediction.
    pub fn predict(&self, record: &StudentRecord) -> Result<f64> {
        let mut preprocessor: Preprocessor = artifact::load_object(
            &self.config.artifacts.preprocessor_path(),
            PREPROCESSOR_KIND,
        )?;
        preprocessor.set_policy(self.config.unseen_category_policy);
        let model: TrainedModel =
            artifact::load_object(&self.config.artifacts.model_path(), MODEL_KIND)?;

        let features = preprocessor.transform_record(record)?;
        let matrix = features.insert_axis(Axis(0));
        let predictions = model.predict(&matrix)?;
        let prediction = predictions[0];
        debug!(model = model.name(), prediction, "single-record prediction");
        Ok(prediction)
    }
}

/// Named fields as they arrive from a form submission, assembled into the
/// record structure the pipeline expects.
///
/// Fields map straight through to their columns; in particular the reading
/// and writing scores are never transposed.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictRequest {
    /// Student gender.
    pub gender: String,
    /// Race/ethnicity group label.
    pub ethnicity: String,
    /// Highest parental education level.
    pub parental_education: String,
    /// Lunch type.
    pub lunch: String,
    /// Test preparation course status.
    pub test_prep: String,
    /// Reading exam score.
    pub reading_score: f64,
    /// Writing exam score.
    pub writing_score: f64,
}

impl PredictRequest {
    /// Builds the pipeline's record structure, with no target attached.
    pub fn into_record(self) -> StudentRecord {
        StudentRecord {
            gender: self.gender,
            race_ethnicity: self.ethnicity,
            parental_level_of_education: self.parental_education,
            lunch: self.lunch,
            test_preparation_course: self.test_prep,
            reading_score: Some(self.reading_score),
            writing_score: Some(self.writing_score),
            math_score: None,
        }
    }
}

/// Rounds a prediction to two decimals for display. Internal computation
/// keeps full precision; this is presentation only.
///
/// Rounding is half-up in decimal terms: 72.345 must display as 72.35 even
/// though its nearest f64 sits just below the binary midpoint.
pub fn display_score(value: f64) -> f64 {
    let shifted = value * 100.0;
    let nudged = shifted + 1e-6_f64.copysign(shifted);
    nudged.round() / 100.0
}
