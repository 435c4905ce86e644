//! Scorecast CLI - train the pipeline and predict single records.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use scorecast::{
    display_score, PipelineConfig, PredictPipeline, PredictRequest, TrainingPipeline,
    UnseenCategoryPolicy,
};

#[derive(Parser, Debug)]
#[command(name = "scorecast", version, about = "Student exam score prediction pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the training pipeline against a source dataset
    Train(TrainCommand),
    /// Predict a math score from named record fields
    Predict(PredictCommand),
}

/// Train a model from a CSV dataset
///
/// Runs ingestion, transformation, and model selection in order, writing
/// all artifacts to the artifact directory.
#[derive(Args, Debug)]
struct TrainCommand {
    /// Path to the source CSV dataset
    #[arg(long, short = 'd', env = "SCORECAST_DATA")]
    data: PathBuf,

    /// Directory for all pipeline artifacts
    #[arg(long, default_value = "artifacts")]
    artifact_dir: PathBuf,

    /// Seed for the split shuffle and stochastic candidates
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Fraction of rows held out for testing
    #[arg(long, default_value_t = 0.2)]
    test_fraction: f64,

    /// Minimum held-out R² required to persist a model
    #[arg(long, default_value_t = 0.6)]
    quality_floor: f64,
}

impl TrainCommand {
    fn config(&self) -> PipelineConfig {
        PipelineConfig::default()
            .with_artifact_dir(&self.artifact_dir)
            .with_seed(self.seed)
            .with_test_fraction(self.test_fraction)
            .with_quality_floor(self.quality_floor)
    }

    fn run(self) -> Result<()> {
        let pipeline = TrainingPipeline::new(self.config());
        let r2 = pipeline.run(&self.data)?;
        println!("selected model R²: {r2:.4}");
        Ok(())
    }
}

/// Predict a math score for one student record
#[derive(Args, Debug)]
struct PredictCommand {
    /// Directory holding the training run's artifacts
    #[arg(long, default_value = "artifacts")]
    artifact_dir: PathBuf,

    /// Reject categorical values unseen at training time instead of
    /// zero-encoding them
    #[arg(long, default_value_t = false)]
    strict_categories: bool,

    /// Student gender
    #[arg(long)]
    gender: String,

    /// Race/ethnicity group label
    #[arg(long)]
    ethnicity: String,

    /// Highest parental education level
    #[arg(long)]
    parental_education: String,

    /// Lunch type
    #[arg(long)]
    lunch: String,

    /// Test preparation course status
    #[arg(long)]
    test_prep: String,

    /// Reading exam score
    #[arg(long)]
    reading_score: f64,

    /// Writing exam score
    #[arg(long)]
    writing_score: f64,
}

impl PredictCommand {
    fn run(self) -> Result<()> {
        let policy = if self.strict_categories {
            UnseenCategoryPolicy::Reject
        } else {
            UnseenCategoryPolicy::ZeroEncode
        };
        let config = PipelineConfig::default()
            .with_artifact_dir(&self.artifact_dir)
            .with_unseen_category_policy(policy);

        let request = PredictRequest {
            gender: self.gender,
            ethnicity: self.ethnicity,
            parental_education: self.parental_education,
            lunch: self.lunch,
            test_prep: self.test_prep,
            reading_score: self.reading_score,
            writing_score: self.writing_score,
        };

        let pipeline = PredictPipeline::new(config);
        let prediction = pipeline.predict(&request.into_record())?;
        println!("{:.2}", display_score(prediction));
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("scorecast=info".parse()?))
        .init();

    let cli = Cli::parse();
    info!("scorecast starting");

    match cli.command {
        Commands::Train(cmd) => cmd.run()?,
        Commands::Predict(cmd) => cmd.run()?,
    }

    Ok(())
}
