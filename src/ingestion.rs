//! Data ingestion: raw snapshot and train/test split.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::PipelineConfig;
use crate::dataset::Dataset;
use crate::error::Result;

/// Reads the source dataset, persists a raw snapshot, and writes the
/// deterministic train/test split artifacts.
#[derive(Debug, Clone)]
pub struct DataIngestion {
    config: PipelineConfig,
}

impl DataIngestion {
    /// Creates an ingestion stage with the given configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Runs ingestion against a source CSV file.
    ///
    /// Writes `data.csv` (unmodified snapshot), `train.csv`, and `test.csv`
    /// under the artifact directory, then returns the train and test paths
    /// for the transformation stage.
    ///
    /// The split shuffles with the configured seed, so the same source file
    /// and config always produce the same partition.
    pub fn run(&self, source: &Path) -> Result<(PathBuf, PathBuf)> {
        info!(source = %source.display(), "reading source dataset");
        let dataset = Dataset::from_csv(source)?;
        info!(rows = dataset.len(), "dataset loaded");

        let raw_path = self.config.artifacts.raw_data_path();
        dataset.to_csv(&raw_path)?;

        let (train, test) =
            dataset.train_test_split(self.config.test_fraction, self.config.seed)?;
        info!(
            train_rows = train.len(),
            test_rows = test.len(),
            seed = self.config.seed,
            "train/test split complete"
        );

        let train_path = self.config.artifacts.train_data_path();
        let test_path = self.config.artifacts.test_data_path();
        train.to_csv(&train_path)?;
        test.to_csv(&test_path)?;

        info!(
            raw = %raw_path.display(),
            train = %train_path.display(),
            test = %test_path.display(),
            "ingestion complete"
        );
        Ok((train_path, test_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::StudentRecord;

    fn write_source(dir: &Path, rows: usize) -> PathBuf {
        let records = (0..rows)
            .map(|i| StudentRecord {
                gender: if i % 2 == 0 { "female" } else { "male" }.to_string(),
                race_ethnicity: "group C".to_string(),
                parental_level_of_education: "some college".to_string(),
                lunch: "standard".to_string(),
                test_preparation_course: "none".to_string(),
                reading_score: Some(50.0 + i as f64),
                writing_score: Some(45.0 + i as f64),
                math_score: Some(40.0 + i as f64),
            })
            .collect();
        let path = dir.join("stud.csv");
        Dataset::new(records).to_csv(&path).unwrap();
        path
    }

    #[test]
    fn test_run_writes_three_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path(), 10);
        let config = PipelineConfig::default().with_artifact_dir(dir.path().join("artifacts"));

        let ingestion = DataIngestion::new(config.clone());
        let (train_path, test_path) = ingestion.run(&source).unwrap();

        assert!(config.artifacts.raw_data_path().exists());
        assert!(train_path.exists());
        assert!(test_path.exists());

        let train = Dataset::from_csv(&train_path).unwrap();
        let test = Dataset::from_csv(&test_path).unwrap();
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);
    }

    #[test]
    fn test_raw_snapshot_matches_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path(), 6);
        let config = PipelineConfig::default().with_artifact_dir(dir.path().join("artifacts"));

        DataIngestion::new(config.clone()).run(&source).unwrap();

        let original = Dataset::from_csv(&source).unwrap();
        let snapshot = Dataset::from_csv(config.artifacts.raw_data_path()).unwrap();
        assert_eq!(original, snapshot);
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let dir = tempfile::tempdir().unwrap();
        let source = write_source(dir.path(), 15);

        let config_a = PipelineConfig::default().with_artifact_dir(dir.path().join("a"));
        let config_b = PipelineConfig::default().with_artifact_dir(dir.path().join("b"));
        let (train_a, _) = DataIngestion::new(config_a).run(&source).unwrap();
        let (train_b, _) = DataIngestion::new(config_b).run(&source).unwrap();

        let bytes_a = std::fs::read(train_a).unwrap();
        let bytes_b = std::fs::read(train_b).unwrap();
        assert_eq!(bytes_a, bytes_b);
    }

    #[test]
    fn test_missing_source_errors() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default().with_artifact_dir(dir.path().join("artifacts"));
        let result = DataIngestion::new(config).run(&dir.path().join("absent.csv"));
        assert!(result.is_err());
    }
}
