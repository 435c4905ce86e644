//! Student exam records and dataset handling.
//!
//! The dataset schema is fixed: five categorical columns, two numeric score
//! columns, and an optional `math_score` target that is present in training
//! data and absent from inference input. Missing cells (empty CSV fields)
//! are allowed in every feature column and handled later by imputation.
//!
//! # Example
//!
//! ```no_run
//! use scorecast::dataset::Dataset;
//!
//! fn main() -> scorecast::Result<()> {
//!     let dataset = Dataset::from_csv("notebook/data/stud.csv")?;
//!     let (train, test) = dataset.train_test_split(0.2, 42)?;
//!     assert_eq!(train.len() + test.len(), dataset.len());
//!     Ok(())
//! }
//! ```

use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScorecastError};

/// Numeric feature columns, in canonical order.
pub const NUMERIC_COLUMNS: [&str; 2] = ["reading_score", "writing_score"];

/// Categorical feature columns, in canonical order.
pub const CATEGORICAL_COLUMNS: [&str; 5] = [
    "gender",
    "race_ethnicity",
    "parental_level_of_education",
    "lunch",
    "test_preparation_course",
];

/// The training target column.
pub const TARGET_COLUMN: &str = "math_score";

/// One student's exam record.
///
/// Categorical fields hold whatever string the source data carries; an empty
/// string is treated as missing. The target is `None` for inference input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// Student gender.
    pub gender: String,
    /// Race/ethnicity group label.
    pub race_ethnicity: String,
    /// Highest parental education level.
    pub parental_level_of_education: String,
    /// Lunch type (standard / free-reduced).
    pub lunch: String,
    /// Whether a test preparation course was completed.
    pub test_preparation_course: String,
    /// Reading exam score.
    pub reading_score: Option<f64>,
    /// Writing exam score.
    pub writing_score: Option<f64>,
    /// Math exam score, the training target. Absent in inference input.
    #[serde(default)]
    pub math_score: Option<f64>,
}

impl StudentRecord {
    /// Returns the value of a categorical column, or `None` if the cell is
    /// empty (missing).
    pub fn categorical(&self, column: &str) -> Result<Option<&str>> {
        let value = match column {
            "gender" => &self.gender,
            "race_ethnicity" => &self.race_ethnicity,
            "parental_level_of_education" => &self.parental_level_of_education,
            "lunch" => &self.lunch,
            "test_preparation_course" => &self.test_preparation_course,
            _ => {
                return Err(ScorecastError::ColumnNotFound {
                    column: column.to_string(),
                })
            }
        };
        if value.is_empty() {
            Ok(None)
        } else {
            Ok(Some(value.as_str()))
        }
    }

    /// Returns the value of a numeric column, or `None` if missing.
    pub fn numeric(&self, column: &str) -> Result<Option<f64>> {
        match column {
            "reading_score" => Ok(self.reading_score),
            "writing_score" => Ok(self.writing_score),
            _ => Err(ScorecastError::ColumnNotFound {
                column: column.to_string(),
            }),
        }
    }
}

/// An ordered collection of [`StudentRecord`]s with the fixed schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<StudentRecord>,
}

impl Dataset {
    /// Creates a dataset from a vector of records.
    pub fn new(records: Vec<StudentRecord>) -> Self {
        Self { records }
    }

    /// Reads a dataset from a CSV file with a header row.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader =
            csv::Reader::from_path(path).map_err(|e| ScorecastError::csv(path, e))?;
        let mut records = Vec::new();
        for row in reader.deserialize() {
            let record: StudentRecord = row.map_err(|e| ScorecastError::csv(path, e))?;
            records.push(record);
        }
        Ok(Self { records })
    }

    /// Writes the dataset to a CSV file, creating parent directories as
    /// needed.
    pub fn to_csv(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ScorecastError::io(parent, e))?;
            }
        }
        let mut writer =
            csv::Writer::from_path(path).map_err(|e| ScorecastError::csv(path, e))?;
        for record in &self.records {
            writer
                .serialize(record)
                .map_err(|e| ScorecastError::csv(path, e))?;
        }
        writer
            .flush()
            .map_err(|e| ScorecastError::io(path, e))?;
        Ok(())
    }

    /// Returns the records in order.
    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    /// Consumes the dataset, returning its records.
    pub fn into_records(self) -> Vec<StudentRecord> {
        self.records
    }

    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the dataset has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Splits the dataset into disjoint train and test portions.
    ///
    /// The split shuffles row indices with a seeded RNG, so the same input,
    /// fraction, and seed always yield the same partition. Both portions are
    /// guaranteed non-empty.
    ///
    /// # Arguments
    ///
    /// * `test_fraction` - Fraction of rows held out for testing.
    /// * `seed` - RNG seed for the shuffle.
    pub fn train_test_split(&self, test_fraction: f64, seed: u64) -> Result<(Dataset, Dataset)> {
        let n = self.records.len();
        if n < 2 {
            return Err(ScorecastError::DatasetTooSmall { rows: n });
        }

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let test_len = ((n as f64) * test_fraction).round() as usize;
        let test_len = test_len.clamp(1, n - 1);

        let test_records: Vec<StudentRecord> = indices[..test_len]
            .iter()
            .map(|&i| self.records[i].clone())
            .collect();
        let train_records: Vec<StudentRecord> = indices[test_len..]
            .iter()
            .map(|&i| self.records[i].clone())
            .collect();

        Ok((Dataset::new(train_records), Dataset::new(test_records)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample_record(reading: f64, writing: f64, math: Option<f64>) -> StudentRecord {
        StudentRecord {
            gender: "female".to_string(),
            race_ethnicity: "group B".to_string(),
            parental_level_of_education: "bachelor's degree".to_string(),
            lunch: "standard".to_string(),
            test_preparation_course: "none".to_string(),
            reading_score: Some(reading),
            writing_score: Some(writing),
            math_score: math,
        }
    }

    fn sample_dataset(n: usize) -> Dataset {
        let records = (0..n)
            .map(|i| sample_record(50.0 + i as f64, 40.0 + i as f64, Some(60.0 + i as f64)))
            .collect();
        Dataset::new(records)
    }

    #[test]
    fn test_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");

        let dataset = sample_dataset(5);
        dataset.to_csv(&path).unwrap();
        let reloaded = Dataset::from_csv(&path).unwrap();

        assert_eq!(dataset, reloaded);
    }

    #[test]
    fn test_csv_missing_cells_deserialize_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(
            &path,
            "gender,race_ethnicity,parental_level_of_education,lunch,\
             test_preparation_course,reading_score,writing_score,math_score\n\
             female,group A,,standard,none,72,,70\n",
        )
        .unwrap();

        let dataset = Dataset::from_csv(&path).unwrap();
        let record = &dataset.records()[0];
        assert_eq!(record.reading_score, Some(72.0));
        assert_eq!(record.writing_score, None);
        assert_eq!(record.categorical("parental_level_of_education").unwrap(), None);
        assert_eq!(record.categorical("lunch").unwrap(), Some("standard"));
    }

    #[test]
    fn test_split_is_deterministic() {
        let dataset = sample_dataset(20);
        let (train_a, test_a) = dataset.train_test_split(0.2, 42).unwrap();
        let (train_b, test_b) = dataset.train_test_split(0.2, 42).unwrap();
        assert_eq!(train_a, train_b);
        assert_eq!(test_a, test_b);
    }

    #[test]
    fn test_split_changes_with_seed() {
        let dataset = sample_dataset(20);
        let (_, test_a) = dataset.train_test_split(0.2, 42).unwrap();
        let (_, test_b) = dataset.train_test_split(0.2, 43).unwrap();
        assert_ne!(test_a, test_b);
    }

    #[test]
    fn test_split_partition_is_disjoint_and_complete() {
        let dataset = sample_dataset(25);
        let (train, test) = dataset.train_test_split(0.2, 42).unwrap();

        assert_eq!(test.len(), 5);
        assert_eq!(train.len(), 20);

        // Rows are unique in the sample, so a multiset check reduces to sorting.
        let mut combined: Vec<f64> = train
            .records()
            .iter()
            .chain(test.records())
            .map(|r| r.reading_score.unwrap())
            .collect();
        combined.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let mut original: Vec<f64> = dataset
            .records()
            .iter()
            .map(|r| r.reading_score.unwrap())
            .collect();
        original.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(combined, original);

        for record in test.records() {
            assert!(!train.records().contains(record));
        }
    }

    #[test]
    fn test_split_rejects_tiny_dataset() {
        let dataset = sample_dataset(1);
        let err = dataset.train_test_split(0.2, 42).unwrap_err();
        assert!(matches!(
            err,
            ScorecastError::DatasetTooSmall { rows: 1 }
        ));
    }

    #[test]
    fn test_unknown_column_errors() {
        let record = sample_record(70.0, 65.0, None);
        assert!(record.categorical("favorite_color").is_err());
        assert!(record.numeric("height").is_err());
    }
}
