//! Pipeline configuration.
//!
//! File-path constants and tuning knobs live in explicit configuration
//! structures handed to each component at construction, so no stage depends
//! on hidden shared state. Defaults reproduce the canonical run (seed 42,
//! 80/20 split, 0.6 quality floor, `artifacts/` directory); every field can
//! be overridden through the `with_*` builders.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Locations of the persisted pipeline artifacts.
///
/// All five artifacts live under a single directory and are overwritten on
/// each training run; no history is kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Directory holding every artifact produced by a training run.
    pub dir: PathBuf,
}

impl ArtifactConfig {
    /// Creates a config rooted at the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the raw dataset snapshot written by ingestion.
    pub fn raw_data_path(&self) -> PathBuf {
        self.dir.join("data.csv")
    }

    /// Path of the training split written by ingestion.
    pub fn train_data_path(&self) -> PathBuf {
        self.dir.join("train.csv")
    }

    /// Path of the test split written by ingestion.
    pub fn test_data_path(&self) -> PathBuf {
        self.dir.join("test.csv")
    }

    /// Path of the fitted preprocessor artifact.
    pub fn preprocessor_path(&self) -> PathBuf {
        self.dir.join("preprocessor.json")
    }

    /// Path of the selected model artifact.
    pub fn model_path(&self) -> PathBuf {
        self.dir.join("model.json")
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self::new("artifacts")
    }
}

/// Policy for categorical values seen at transform time but absent from the
/// fit-time vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnseenCategoryPolicy {
    /// Encode the unknown value as an all-zero indicator block.
    ZeroEncode,
    /// Fail the transform with an error.
    Reject,
}

/// Configuration shared by every pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Artifact locations.
    pub artifacts: ArtifactConfig,
    /// Fraction of rows held out for the test split.
    pub test_fraction: f64,
    /// Seed driving the split shuffle and every stochastic candidate model.
    pub seed: u64,
    /// Minimum held-out R² a model must reach to be persisted.
    pub quality_floor: f64,
    /// How to encode categorical values unseen at fit time.
    pub unseen_category_policy: UnseenCategoryPolicy,
}

impl PipelineConfig {
    /// Creates a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the artifact directory.
    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts = ArtifactConfig::new(dir);
        self
    }

    /// Sets the test split fraction.
    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the quality floor.
    pub fn with_quality_floor(mut self, floor: f64) -> Self {
        self.quality_floor = floor;
        self
    }

    /// Sets the unseen-category policy.
    pub fn with_unseen_category_policy(mut self, policy: UnseenCategoryPolicy) -> Self {
        self.unseen_category_policy = policy;
        self
    }

    /// Returns the artifact directory.
    pub fn artifact_dir(&self) -> &Path {
        &self.artifacts.dir
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            artifacts: ArtifactConfig::default(),
            test_fraction: 0.2,
            seed: 42,
            quality_floor: 0.6,
            unseen_category_policy: UnseenCategoryPolicy::ZeroEncode,
        }
    }
}
