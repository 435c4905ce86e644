//! Ensemble regressors: bagging (random forest) and boosting (gradient
//! boosting, AdaBoost.R2), all built on the decision tree.

use ndarray::{Array1, Array2};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScorecastError};

use super::tree::DecisionTreeRegressor;
use super::Regressor;

fn take_rows(x: &Array2<f64>, y: &Array1<f64>, indices: &[usize]) -> (Array2<f64>, Array1<f64>) {
    let sampled_x = Array2::from_shape_fn((indices.len(), x.ncols()), |(i, j)| {
        x[[indices[i], j]]
    });
    let sampled_y = Array1::from_shape_fn(indices.len(), |i| y[indices[i]]);
    (sampled_x, sampled_y)
}

/// Bagged ensemble of unpruned trees, each fit on a bootstrap resample of
/// the training data. Predictions average over all trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    /// Number of trees.
    pub n_trees: usize,
    /// Depth limit of each tree.
    pub max_depth: usize,
    /// Seed driving the bootstrap resampling.
    pub seed: u64,
    /// Fitted trees.
    pub trees: Vec<DecisionTreeRegressor>,
}

impl RandomForestRegressor {
    /// Creates an unfitted forest.
    pub fn new(n_trees: usize, max_depth: usize, seed: u64) -> Self {
        Self {
            n_trees,
            max_depth,
            seed,
            trees: Vec::new(),
        }
    }
}

impl Regressor for RandomForestRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n = x.nrows();
        if n == 0 {
            return Err(ScorecastError::training("forest fit on empty matrix"));
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        self.trees.clear();
        for _ in 0..self.n_trees {
            let indices: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let (x_boot, y_boot) = take_rows(x, y, &indices);
            let mut tree = DecisionTreeRegressor::new(self.max_depth, 2, 1);
            tree.fit(&x_boot, &y_boot)?;
            self.trees.push(tree);
        }
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(ScorecastError::NotFitted);
        }
        let mut sum = Array1::<f64>::zeros(x.nrows());
        for tree in &self.trees {
            sum = sum + tree.predict(x)?;
        }
        Ok(sum / self.trees.len() as f64)
    }
}

/// Gradient boosting over shallow trees with squared-error loss: each stage
/// fits the residual of the running prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingRegressor {
    /// Number of boosting stages.
    pub n_estimators: usize,
    /// Shrinkage applied to each stage's contribution.
    pub learning_rate: f64,
    /// Depth limit of each stage tree.
    pub max_depth: usize,
    /// Initial prediction (training target mean).
    pub init: f64,
    /// Fitted stage trees.
    pub trees: Vec<DecisionTreeRegressor>,
}

impl GradientBoostingRegressor {
    /// Creates an unfitted booster.
    pub fn new(n_estimators: usize, learning_rate: f64, max_depth: usize) -> Self {
        Self {
            n_estimators,
            learning_rate,
            max_depth,
            init: 0.0,
            trees: Vec::new(),
        }
    }
}

impl Regressor for GradientBoostingRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n = x.nrows();
        if n == 0 {
            return Err(ScorecastError::training("boosting fit on empty matrix"));
        }
        self.init = y.sum() / n as f64;
        self.trees.clear();

        let mut residual = y.mapv(|v| v - self.init);
        for _ in 0..self.n_estimators {
            let mut tree = DecisionTreeRegressor::new(self.max_depth, 2, 1);
            tree.fit(x, &residual)?;
            let stage = tree.predict(x)?;
            residual = residual - stage.mapv(|v| v * self.learning_rate);
            self.trees.push(tree);

            // Residuals already at numerical zero; further stages add noise.
            if residual.iter().all(|r| r.abs() < 1e-12) {
                break;
            }
        }
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(ScorecastError::NotFitted);
        }
        let mut predictions = Array1::<f64>::from_elem(x.nrows(), self.init);
        for tree in &self.trees {
            let stage = tree.predict(x)?;
            predictions = predictions + stage.mapv(|v| v * self.learning_rate);
        }
        Ok(predictions)
    }
}

/// AdaBoost.R2: boosting by weighted resampling with a linear loss, combined
/// by weighted median.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaBoostRegressor {
    /// Maximum number of boosting rounds.
    pub n_estimators: usize,
    /// Depth limit of each round's tree.
    pub max_depth: usize,
    /// Seed driving the weighted resampling.
    pub seed: u64,
    /// Fitted round trees.
    pub trees: Vec<DecisionTreeRegressor>,
    /// Per-round confidence `ln(1/beta)` used by the weighted median.
    pub log_betas: Vec<f64>,
}

impl AdaBoostRegressor {
    /// Creates an unfitted booster.
    pub fn new(n_estimators: usize, max_depth: usize, seed: u64) -> Self {
        Self {
            n_estimators,
            max_depth,
            seed,
            trees: Vec::new(),
            log_betas: Vec::new(),
        }
    }

    fn weighted_median(&self, values: &mut Vec<(f64, f64)>) -> f64 {
        values.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        let total: f64 = values.iter().map(|&(_, w)| w).sum();
        let mut cumulative = 0.0;
        for &(value, weight) in values.iter() {
            cumulative += weight;
            if cumulative >= total / 2.0 {
                return value;
            }
        }
        values.last().map(|&(v, _)| v).unwrap_or(0.0)
    }
}

impl Regressor for AdaBoostRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n = x.nrows();
        if n == 0 {
            return Err(ScorecastError::training("adaboost fit on empty matrix"));
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        self.trees.clear();
        self.log_betas.clear();

        let mut weights = vec![1.0 / n as f64; n];
        for _ in 0..self.n_estimators {
            let sampler = WeightedIndex::new(&weights)
                .map_err(|e| ScorecastError::training(format!("degenerate weights: {e}")))?;
            let indices: Vec<usize> = (0..n).map(|_| sampler.sample(&mut rng)).collect();
            let (x_boot, y_boot) = take_rows(x, y, &indices);

            let mut tree = DecisionTreeRegressor::new(self.max_depth, 2, 1);
            tree.fit(&x_boot, &y_boot)?;
            let pred = tree.predict(x)?;

            let errors: Vec<f64> = pred
                .iter()
                .zip(y.iter())
                .map(|(p, t)| (p - t).abs())
                .collect();
            let max_error = errors.iter().cloned().fold(0.0_f64, f64::max);
            if max_error < 1e-12 {
                // Perfect round; give it near-total confidence and stop.
                self.trees.push(tree);
                self.log_betas.push((1e10_f64).ln());
                break;
            }

            let avg_loss: f64 = errors
                .iter()
                .zip(weights.iter())
                .map(|(e, w)| (e / max_error) * w)
                .sum();
            if avg_loss >= 0.5 {
                if self.trees.is_empty() {
                    self.trees.push(tree);
                    self.log_betas.push(f64::EPSILON);
                }
                break;
            }

            let beta = avg_loss / (1.0 - avg_loss);
            self.trees.push(tree);
            self.log_betas.push((1.0 / beta).ln());

            for (weight, error) in weights.iter_mut().zip(errors.iter()) {
                *weight *= beta.powf(1.0 - error / max_error);
            }
            let total: f64 = weights.iter().sum();
            if total <= 0.0 {
                break;
            }
            for weight in weights.iter_mut() {
                *weight /= total;
            }
        }

        if self.trees.is_empty() {
            return Err(ScorecastError::training("adaboost produced no rounds"));
        }
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(ScorecastError::NotFitted);
        }
        let round_predictions: Vec<Array1<f64>> = self
            .trees
            .iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<_>>()?;

        let mut predictions = Array1::<f64>::zeros(x.nrows());
        let mut scratch: Vec<(f64, f64)> = Vec::with_capacity(self.trees.len());
        for i in 0..x.nrows() {
            scratch.clear();
            for (pred, &log_beta) in round_predictions.iter().zip(self.log_betas.iter()) {
                scratch.push((pred[i], log_beta));
            }
            predictions[i] = self.weighted_median(&mut scratch);
        }
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::r2_score;
    use crate::models::test_util::linear_problem;

    #[test]
    fn test_forest_beats_mean_predictor() {
        let (x, y) = linear_problem(60, 3);
        let mut model = RandomForestRegressor::new(30, 6, 42);
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        assert!(r2_score(&y, &pred) > 0.7);
    }

    #[test]
    fn test_forest_is_deterministic_for_seed() {
        let (x, y) = linear_problem(40, 2);
        let mut a = RandomForestRegressor::new(10, 5, 7);
        let mut b = RandomForestRegressor::new(10, 5, 7);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_gradient_boosting_fits_linear_data() {
        let (x, y) = linear_problem(60, 3);
        let mut model = GradientBoostingRegressor::new(100, 0.1, 3);
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        assert!(r2_score(&y, &pred) > 0.9);
    }

    #[test]
    fn test_gradient_boosting_stops_on_zero_residual() {
        // A single feature with a step target is captured exactly by the
        // first stage tree at learning rate 1.
        let x = ndarray::array![[0.0], [0.0], [1.0], [1.0]];
        let y = ndarray::array![2.0, 2.0, 8.0, 8.0];
        let mut model = GradientBoostingRegressor::new(100, 1.0, 2);
        model.fit(&x, &y).unwrap();
        assert!(model.trees.len() < 100);
        assert_eq!(model.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_adaboost_fits_reasonably() {
        let (x, y) = linear_problem(60, 3);
        let mut model = AdaBoostRegressor::new(30, 3, 42);
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        assert!(r2_score(&y, &pred) > 0.5);
    }

    #[test]
    fn test_adaboost_handles_perfect_round() {
        let x = ndarray::array![
            [0.0],
            [0.0],
            [0.0],
            [0.0],
            [1.0],
            [1.0],
            [1.0],
            [1.0]
        ];
        let y = ndarray::array![2.0, 2.0, 2.0, 2.0, 8.0, 8.0, 8.0, 8.0];
        let mut model = AdaBoostRegressor::new(20, 2, 1);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_predict_before_fit_errors() {
        let x = ndarray::array![[1.0]];
        assert!(RandomForestRegressor::new(5, 3, 1).predict(&x).is_err());
        assert!(GradientBoostingRegressor::new(5, 0.1, 3).predict(&x).is_err());
        assert!(AdaBoostRegressor::new(5, 3, 1).predict(&x).is_err());
    }
}
