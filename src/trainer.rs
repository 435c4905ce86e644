//! Model training: evaluate the candidate pool, select the best by held-out
//! R², and persist it behind a quality gate.

use ndarray::{s, Array1, Array2};
use tracing::info;

use crate::artifact;
use crate::config::PipelineConfig;
use crate::error::{Result, ScorecastError};
use crate::metrics::r2_score;
use crate::models::{candidate_pool, Regressor, TrainedModel};

/// Artifact kind tag for the persisted model.
pub const MODEL_KIND: &str = "model";

/// One entry of the per-candidate evaluation report.
#[derive(Debug, Clone)]
pub struct CandidateScore {
    /// Candidate display name.
    pub name: &'static str,
    /// Held-out R².
    pub score: f64,
}

/// Trains every candidate on the transformed train matrix, scores it on the
/// test matrix, and persists the winner.
#[derive(Debug, Clone)]
pub struct ModelTrainer {
    config: PipelineConfig,
}

impl ModelTrainer {
    /// Creates a trainer with the given configuration.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Runs candidate evaluation and selection.
    ///
    /// Both matrices carry features in all columns but the last and the
    /// target in the last column. Returns the selected model's test R².
    ///
    /// If the best score is below the configured quality floor the run fails
    /// with [`ScorecastError::NoAcceptableModel`] and no model artifact is
    /// written.
    pub fn run(&self, train: &Array2<f64>, test: &Array2<f64>) -> Result<f64> {
        let (x_train, y_train) = split_features_target(train)?;
        let (x_test, y_test) = split_features_target(test)?;
        info!(
            train_rows = x_train.nrows(),
            test_rows = x_test.nrows(),
            features = x_train.ncols(),
            "training candidate pool"
        );

        let mut pool = candidate_pool(self.config.seed);
        let mut report = Vec::with_capacity(pool.len());
        for model in pool.iter_mut() {
            model.fit(&x_train, &y_train)?;
            let predictions = model.predict(&x_test)?;
            let score = r2_score(&y_test, &predictions);
            info!(model = model.name(), r2 = score, "candidate evaluated");
            report.push(CandidateScore {
                name: model.name(),
                score,
            });
        }

        let (best_index, best_score) = select_best(&report)
            .ok_or_else(|| ScorecastError::training("empty candidate pool"))?;
        let best = &pool[best_index];

        if best_score < self.config.quality_floor {
            return Err(ScorecastError::NoAcceptableModel {
                name: best.name().to_string(),
                score: best_score,
                floor: self.config.quality_floor,
            });
        }

        let model_path = self.config.artifacts.model_path();
        artifact::save_object(&model_path, MODEL_KIND, best)?;
        info!(
            model = best.name(),
            r2 = best_score,
            path = %model_path.display(),
            "best model saved"
        );
        Ok(best_score)
    }
}

/// Picks the highest-scoring candidate; ties keep the earliest entry, so the
/// pool declaration order is the deterministic tie-break.
pub(crate) fn select_best(report: &[CandidateScore]) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (index, entry) in report.iter().enumerate() {
        match best {
            Some((_, score)) if entry.score <= score => {}
            _ => best = Some((index, entry.score)),
        }
    }
    best
}

/// Splits a matrix into features (all but the last column) and target (the
/// last column).
pub(crate) fn split_features_target(matrix: &Array2<f64>) -> Result<(Array2<f64>, Array1<f64>)> {
    if matrix.ncols() < 2 {
        return Err(ScorecastError::DimensionMismatch {
            expected: 2,
            actual: matrix.ncols(),
        });
    }
    let features = matrix.slice(s![.., ..-1]).to_owned();
    let target = matrix.column(matrix.ncols() - 1).to_owned();
    Ok((features, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn entry(name: &'static str, score: f64) -> CandidateScore {
        CandidateScore { name, score }
    }

    #[test]
    fn test_select_best_picks_maximum() {
        let report = vec![entry("a", 0.2), entry("b", 0.9), entry("c", 0.5)];
        assert_eq!(select_best(&report), Some((1, 0.9)));
    }

    #[test]
    fn test_select_best_tie_breaks_to_first_declared() {
        let report = vec![entry("a", 0.7), entry("b", 0.7), entry("c", 0.7)];
        assert_eq!(select_best(&report), Some((0, 0.7)));
    }

    #[test]
    fn test_select_best_empty_report() {
        assert_eq!(select_best(&[]), None);
    }

    #[test]
    fn test_split_features_target() {
        let matrix = array![[1.0, 2.0, 10.0], [3.0, 4.0, 20.0]];
        let (x, y) = split_features_target(&matrix).unwrap();
        assert_eq!(x, array![[1.0, 2.0], [3.0, 4.0]]);
        assert_eq!(y, array![10.0, 20.0]);
    }

    #[test]
    fn test_split_rejects_featureless_matrix() {
        let matrix = array![[1.0], [2.0]];
        assert!(split_features_target(&matrix).is_err());
    }

    fn linear_matrices() -> (Array2<f64>, Array2<f64>) {
        // target = 2*f0 + f1 + 5, exactly.
        let build = |rows: std::ops::Range<usize>| {
            let data: Vec<[f64; 3]> = rows
                .map(|i| {
                    let f0 = i as f64;
                    let f1 = (i % 7) as f64;
                    [f0, f1, 2.0 * f0 + f1 + 5.0]
                })
                .collect();
            Array2::from_shape_fn((data.len(), 3), |(i, j)| data[i][j])
        };
        (build(0..24), build(24..30))
    }

    fn noise_matrices() -> (Array2<f64>, Array2<f64>) {
        // Features carry no information about the target.
        let mut state = 0x9E3779B97F4A7C15_u64;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 11) as f64 / (1u64 << 53) as f64
        };
        let mut build = |rows: usize| {
            Array2::from_shape_fn((rows, 3), |_| next() * 100.0)
        };
        (build(40), build(12))
    }

    #[test]
    fn test_run_trains_and_persists_best_model() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default().with_artifact_dir(dir.path());
        let (train, test) = linear_matrices();

        let score = ModelTrainer::new(config.clone()).run(&train, &test).unwrap();
        assert!(score > 0.9);

        let model: TrainedModel =
            artifact::load_object(&config.artifacts.model_path(), MODEL_KIND).unwrap();
        assert!(model.is_linear_family());
    }

    #[test]
    fn test_quality_gate_blocks_weak_models() {
        let dir = tempfile::tempdir().unwrap();
        let config = PipelineConfig::default().with_artifact_dir(dir.path());
        let (train, test) = noise_matrices();

        let err = ModelTrainer::new(config.clone()).run(&train, &test).unwrap_err();
        assert!(matches!(err, ScorecastError::NoAcceptableModel { .. }));
        assert!(!config.artifacts.model_path().exists());
    }
}
