//! The offline training pipeline: ingestion → transformation → training.

use std::path::Path;

use tracing::info;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::ingestion::DataIngestion;
use crate::trainer::ModelTrainer;
use crate::transform::DataTransformation;

/// One-shot sequential training run.
///
/// The three stages execute in order and share nothing but the artifact
/// directory. Artifact writes are not transactional: a run that fails
/// between stages can leave a fresh preprocessor beside a stale model, and
/// the next successful run overwrites both.
#[derive(Debug, Clone)]
pub struct TrainingPipeline {
    config: PipelineConfig,
}

impl TrainingPipeline {
    /// Creates a training pipeline with the given configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Runs the full pipeline against a source CSV and returns the selected
    /// model's test R².
    pub fn run(&self, source: &Path) -> Result<f64> {
        info!(
            artifact_dir = %self.config.artifact_dir().display(),
            "training run started (artifact writes are not transactional)"
        );

        let ingestion = DataIngestion::new(self.config.clone());
        let (train_path, test_path) = ingestion.run(source)?;

        let transformation = DataTransformation::new(self.config.clone());
        let (train_matrix, test_matrix, _) = transformation.run(&train_path, &test_path)?;

        let trainer = ModelTrainer::new(self.config.clone());
        let score = trainer.run(&train_matrix, &test_matrix)?;

        info!(r2 = score, "training run complete");
        Ok(score)
    }
}
