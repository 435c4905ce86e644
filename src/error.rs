//! Error types for the scorecast pipeline.
//!
//! Every stage of the pipeline (ingestion, transformation, training,
//! inference) reports failures through the single [`ScorecastError`] type,
//! carrying the originating cause where one exists. Stages never recover
//! internally; errors propagate to the caller with `?`.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for scorecast operations.
#[derive(Debug, Error)]
pub enum ScorecastError {
    /// Error reading or writing a file.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file that could not be read or written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Error parsing or writing a CSV dataset.
    #[error("CSV error on {path}: {source}")]
    Csv {
        /// The CSV file involved.
        path: PathBuf,
        /// The underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// Error serializing or deserializing an artifact payload.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error when a dataset is too small to be split into train and test.
    #[error("Dataset too small to split: {rows} rows")]
    DatasetTooSmall {
        /// The number of rows in the offending dataset.
        rows: usize,
    },

    /// Error when an expected column is absent from a record or dataset.
    #[error("Column not found: {column}")]
    ColumnNotFound {
        /// The missing column name.
        column: String,
    },

    /// Error when a column contains no usable values to fit statistics on.
    #[error("Column {column} has no non-missing values to fit on")]
    EmptyColumn {
        /// The column with only missing values.
        column: String,
    },

    /// Error when a training or test row lacks the target value.
    #[error("Missing target value '{column}' in row {row}")]
    MissingTarget {
        /// The target column name.
        column: String,
        /// The zero-based row index.
        row: usize,
    },

    /// Error when a persisted artifact does not exist on disk.
    #[error("Artifact not found: {path}")]
    ArtifactMissing {
        /// The expected artifact path.
        path: PathBuf,
    },

    /// Error when an artifact was written with an unsupported format version.
    #[error("Unsupported artifact format version: expected {expected}, got {actual}")]
    FormatVersion {
        /// The format version this build understands.
        expected: u32,
        /// The version found in the artifact file.
        actual: u32,
    },

    /// Error when an artifact file holds a different kind of payload.
    #[error("Artifact kind mismatch: expected {expected}, got {actual}")]
    ArtifactKind {
        /// The expected payload kind.
        expected: String,
        /// The kind recorded in the artifact file.
        actual: String,
    },

    /// Error when a categorical value was never seen at fit time and the
    /// configured policy rejects unknowns.
    #[error("Unknown category '{value}' for column {column}")]
    UnknownCategory {
        /// The categorical column.
        column: String,
        /// The value absent from the fitted vocabulary.
        value: String,
    },

    /// Error when a fitted transform or model is used before fitting.
    #[error("Used before fitting")]
    NotFitted,

    /// Error when a feature matrix has an unexpected width.
    #[error("Dimension mismatch: expected {expected} columns, got {actual}")]
    DimensionMismatch {
        /// The expected number of columns.
        expected: usize,
        /// The actual number of columns.
        actual: usize,
    },

    /// Error when no candidate model clears the quality floor.
    #[error("No acceptable model: best was {name} at R² {score:.4}, below floor {floor}")]
    NoAcceptableModel {
        /// The best-scoring candidate's name.
        name: String,
        /// The best candidate's held-out R².
        score: f64,
        /// The configured quality floor.
        floor: f64,
    },

    /// Generic training failure with a message.
    #[error("Training error: {message}")]
    Training {
        /// A description of the training failure.
        message: String,
    },
}

impl ScorecastError {
    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wraps a CSV error with the path it occurred on.
    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Csv {
            path: path.into(),
            source,
        }
    }

    /// Builds a generic training error from a message.
    pub fn training(message: impl Into<String>) -> Self {
        Self::Training {
            message: message.into(),
        }
    }
}

/// A specialized Result type for scorecast operations.
pub type Result<T> = std::result::Result<T, ScorecastError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScorecastError::ColumnNotFound {
            column: "math_score".to_string(),
        };
        assert_eq!(err.to_string(), "Column not found: math_score");

        let err = ScorecastError::DatasetTooSmall { rows: 1 };
        assert_eq!(err.to_string(), "Dataset too small to split: 1 rows");

        let err = ScorecastError::UnknownCategory {
            column: "lunch".to_string(),
            value: "brunch".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown category 'brunch' for column lunch");

        let err = ScorecastError::FormatVersion {
            expected: 1,
            actual: 2,
        };
        assert_eq!(
            err.to_string(),
            "Unsupported artifact format version: expected 1, got 2"
        );
    }

    #[test]
    fn test_no_acceptable_model_display() {
        let err = ScorecastError::NoAcceptableModel {
            name: "Lasso".to_string(),
            score: 0.1234,
            floor: 0.6,
        };
        assert_eq!(
            err.to_string(),
            "No acceptable model: best was Lasso at R² 0.1234, below floor 0.6"
        );
    }

    #[test]
    fn test_io_wrapper_keeps_path() {
        let inner = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = ScorecastError::io("artifacts/data.csv", inner);
        assert!(err.to_string().contains("artifacts/data.csv"));
    }
}
