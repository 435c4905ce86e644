//! Candidate regression models.
//!
//! The trainer selects from a fixed, ordered pool of candidates spanning
//! linear, regularized-linear, distance-based, tree-based, bagging, and two
//! boosting families. Every candidate exposes the same [`Regressor`]
//! fit/predict capability, and the closed [`TrainedModel`] enum makes the
//! selection loop a plain iteration over a known set. Fitted parameters are
//! serde-portable, so the selected model persists as an inspectable artifact
//! rather than an opaque object graph.

mod ensemble;
mod knn;
mod linear;
mod tree;

pub use ensemble::{AdaBoostRegressor, GradientBoostingRegressor, RandomForestRegressor};
pub use knn::KNeighborsRegressor;
pub use linear::{LassoRegression, LinearRegression, RidgeRegression};
pub use tree::DecisionTreeRegressor;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A regression model with uniform fit/predict capability.
pub trait Regressor {
    /// Fits the model on training features and targets.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Predicts targets for a feature matrix.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;
}

/// The closed set of candidate models, in pool-declaration order.
///
/// Score ties during selection break toward the earlier variant, so this
/// ordering is part of the trainer's contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrainedModel {
    /// Ordinary least squares.
    Linear(LinearRegression),
    /// L2-regularized least squares.
    Ridge(RidgeRegression),
    /// L1-regularized least squares (coordinate descent).
    Lasso(LassoRegression),
    /// k-nearest-neighbors averaging.
    KNearest(KNeighborsRegressor),
    /// Single variance-reduction decision tree.
    DecisionTree(DecisionTreeRegressor),
    /// Bagged ensemble of decision trees.
    RandomForest(RandomForestRegressor),
    /// Gradient boosting over shallow trees.
    GradientBoosting(GradientBoostingRegressor),
    /// AdaBoost.R2 over shallow trees.
    AdaBoost(AdaBoostRegressor),
}

impl TrainedModel {
    /// Display name of the candidate.
    pub fn name(&self) -> &'static str {
        match self {
            TrainedModel::Linear(_) => "Linear Regression",
            TrainedModel::Ridge(_) => "Ridge",
            TrainedModel::Lasso(_) => "Lasso",
            TrainedModel::KNearest(_) => "K-Neighbors Regressor",
            TrainedModel::DecisionTree(_) => "Decision Tree",
            TrainedModel::RandomForest(_) => "Random Forest Regressor",
            TrainedModel::GradientBoosting(_) => "Gradient Boosting Regressor",
            TrainedModel::AdaBoost(_) => "AdaBoost Regressor",
        }
    }

    /// Returns `true` for the linear family (plain and regularized).
    pub fn is_linear_family(&self) -> bool {
        matches!(
            self,
            TrainedModel::Linear(_) | TrainedModel::Ridge(_) | TrainedModel::Lasso(_)
        )
    }
}

impl Regressor for TrainedModel {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        match self {
            TrainedModel::Linear(m) => m.fit(x, y),
            TrainedModel::Ridge(m) => m.fit(x, y),
            TrainedModel::Lasso(m) => m.fit(x, y),
            TrainedModel::KNearest(m) => m.fit(x, y),
            TrainedModel::DecisionTree(m) => m.fit(x, y),
            TrainedModel::RandomForest(m) => m.fit(x, y),
            TrainedModel::GradientBoosting(m) => m.fit(x, y),
            TrainedModel::AdaBoost(m) => m.fit(x, y),
        }
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            TrainedModel::Linear(m) => m.predict(x),
            TrainedModel::Ridge(m) => m.predict(x),
            TrainedModel::Lasso(m) => m.predict(x),
            TrainedModel::KNearest(m) => m.predict(x),
            TrainedModel::DecisionTree(m) => m.predict(x),
            TrainedModel::RandomForest(m) => m.predict(x),
            TrainedModel::GradientBoosting(m) => m.predict(x),
            TrainedModel::AdaBoost(m) => m.predict(x),
        }
    }
}

/// Builds the candidate pool in its fixed declaration order.
///
/// Stochastic candidates (forest, AdaBoost) derive their RNG state from the
/// given seed, keeping the whole training run reproducible.
pub fn candidate_pool(seed: u64) -> Vec<TrainedModel> {
    vec![
        TrainedModel::Linear(LinearRegression::new()),
        TrainedModel::Ridge(RidgeRegression::new(1.0)),
        TrainedModel::Lasso(LassoRegression::new(1.0)),
        TrainedModel::KNearest(KNeighborsRegressor::new(5)),
        TrainedModel::DecisionTree(DecisionTreeRegressor::new(8, 2, 1)),
        TrainedModel::RandomForest(RandomForestRegressor::new(50, 8, seed)),
        TrainedModel::GradientBoosting(GradientBoostingRegressor::new(100, 0.1, 3)),
        TrainedModel::AdaBoost(AdaBoostRegressor::new(50, 3, seed)),
    ]
}

#[cfg(test)]
pub(crate) mod test_util {
    use ndarray::{Array1, Array2};

    /// Deterministic pseudo-random matrix in [0, 1), plus a linear target.
    pub fn linear_problem(rows: usize, cols: usize) -> (Array2<f64>, Array1<f64>) {
        let mut state = 0x2545F4914F6CDD1D_u64;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 11) as f64 / (1u64 << 53) as f64
        };
        let x = Array2::from_shape_fn((rows, cols), |_| next());
        let y = x.map_axis(ndarray::Axis(1), |row| {
            3.0 * row[0] + row.iter().skip(1).sum::<f64>() * 0.5 + 1.0
        });
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_order_is_fixed() {
        let pool = candidate_pool(42);
        let names: Vec<&str> = pool.iter().map(|m| m.name()).collect();
        assert_eq!(
            names,
            vec![
                "Linear Regression",
                "Ridge",
                "Lasso",
                "K-Neighbors Regressor",
                "Decision Tree",
                "Random Forest Regressor",
                "Gradient Boosting Regressor",
                "AdaBoost Regressor",
            ]
        );
    }

    #[test]
    fn test_linear_family_flag() {
        let pool = candidate_pool(42);
        let linear: Vec<bool> = pool.iter().map(|m| m.is_linear_family()).collect();
        assert_eq!(
            linear,
            vec![true, true, true, false, false, false, false, false]
        );
    }

    #[test]
    fn test_every_candidate_fits_and_predicts() {
        let (x, y) = test_util::linear_problem(30, 3);
        for mut model in candidate_pool(42) {
            model.fit(&x, &y).unwrap();
            let pred = model.predict(&x).unwrap();
            assert_eq!(pred.len(), y.len());
            assert!(pred.iter().all(|v| v.is_finite()), "{}", model.name());
        }
    }

    #[test]
    fn test_trained_model_serde_round_trip() {
        let (x, y) = test_util::linear_problem(20, 2);
        for mut model in candidate_pool(42) {
            model.fit(&x, &y).unwrap();
            let json = serde_json::to_string(&model).unwrap();
            let restored: TrainedModel = serde_json::from_str(&json).unwrap();
            assert_eq!(model.predict(&x).unwrap(), restored.predict(&x).unwrap());
        }
    }
}
