//! Scorecast: a tutorial-scale student exam score prediction pipeline.
//!
//! The crate ingests a CSV of student exam records, fits a regression model
//! predicting the math score from demographic features plus reading and
//! writing scores, persists the fitted preprocessing and model artifacts,
//! and answers single-record predictions against those artifacts.
//!
//! # Pipeline stages
//!
//! - [`ingestion::DataIngestion`]: raw snapshot + deterministic train/test
//!   split.
//! - [`transform::DataTransformation`]: fit the column-wise
//!   [`preprocess::Preprocessor`] on training features, build the train and
//!   test matrices.
//! - [`trainer::ModelTrainer`]: evaluate a fixed pool of candidate
//!   regressors by held-out R², persist the best behind a 0.6 quality gate.
//! - [`predict::PredictPipeline`]: load the artifacts and predict one
//!   record.
//!
//! # Example
//!
//! ```no_run
//! use scorecast::{PipelineConfig, PredictPipeline, PredictRequest, TrainingPipeline};
//! use std::path::Path;
//!
//! fn main() -> scorecast::Result<()> {
//!     let config = PipelineConfig::default().with_artifact_dir("artifacts");
//!
//!     let r2 = TrainingPipeline::new(config.clone()).run(Path::new("stud.csv"))?;
//!     println!("selected model R²: {r2:.4}");
//!
//!     let request = PredictRequest {
//!         gender: "female".into(),
//!         ethnicity: "group C".into(),
//!         parental_education: "some college".into(),
//!         lunch: "standard".into(),
//!         test_prep: "completed".into(),
//!         reading_score: 70.0,
//!         writing_score: 65.0,
//!     };
//!     let score = PredictPipeline::new(config).predict(&request.into_record())?;
//!     println!("predicted math score: {:.2}", scorecast::display_score(score));
//!     Ok(())
//! }
//! ```

pub mod artifact;
pub mod config;
pub mod dataset;
pub mod error;
pub mod ingestion;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod predict;
pub mod preprocess;
pub mod trainer;
pub mod transform;

pub use config::{ArtifactConfig, PipelineConfig, UnseenCategoryPolicy};
pub use dataset::{Dataset, StudentRecord};
pub use error::{Result, ScorecastError};
pub use ingestion::DataIngestion;
pub use models::TrainedModel;
pub use pipeline::TrainingPipeline;
pub use predict::{display_score, PredictPipeline, PredictRequest};
pub use preprocess::Preprocessor;
pub use trainer::ModelTrainer;
pub use transform::DataTransformation;
