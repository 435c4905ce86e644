//! k-nearest-neighbors regressor.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScorecastError};

use super::Regressor;

/// Distance-based regressor averaging the targets of the `k` nearest
/// training points (Euclidean distance).
///
/// Fitting stores the training set; the serialized artifact therefore
/// contains the full training features and targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KNeighborsRegressor {
    /// Number of neighbors to average.
    pub k: usize,
    /// Stored training features.
    pub x_train: Array2<f64>,
    /// Stored training targets.
    pub y_train: Array1<f64>,
}

impl KNeighborsRegressor {
    /// Creates an unfitted model averaging `k` neighbors.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            x_train: Array2::zeros((0, 0)),
            y_train: Array1::zeros(0),
        }
    }
}

impl Regressor for KNeighborsRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() == 0 || x.nrows() != y.len() {
            return Err(ScorecastError::training("knn fit on empty or mismatched data"));
        }
        self.x_train = x.clone();
        self.y_train = y.clone();
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let n_train = self.x_train.nrows();
        if n_train == 0 {
            return Err(ScorecastError::NotFitted);
        }
        if x.ncols() != self.x_train.ncols() {
            return Err(ScorecastError::DimensionMismatch {
                expected: self.x_train.ncols(),
                actual: x.ncols(),
            });
        }

        let k = self.k.min(n_train);
        let mut predictions = Array1::<f64>::zeros(x.nrows());
        let mut distances: Vec<(f64, usize)> = Vec::with_capacity(n_train);

        for i in 0..x.nrows() {
            distances.clear();
            for t in 0..n_train {
                let mut dist = 0.0;
                for j in 0..x.ncols() {
                    let diff = x[[i, j]] - self.x_train[[t, j]];
                    dist += diff * diff;
                }
                distances.push((dist, t));
            }
            distances.sort_by(|a, b| {
                a.0.partial_cmp(&b.0)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.1.cmp(&b.1))
            });
            let sum: f64 = distances[..k].iter().map(|&(_, t)| self.y_train[t]).sum();
            predictions[i] = sum / k as f64;
        }
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_k1_memorizes_training_points() {
        let x = array![[0.0], [1.0], [2.0]];
        let y = array![10.0, 20.0, 30.0];
        let mut model = KNeighborsRegressor::new(1);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_averages_k_neighbors() {
        let x = array![[0.0], [1.0], [10.0]];
        let y = array![2.0, 4.0, 100.0];
        let mut model = KNeighborsRegressor::new(2);
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&array![[0.5]]).unwrap();
        assert!((pred[0] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_k_clamped_to_training_size() {
        let x = array![[0.0], [1.0]];
        let y = array![1.0, 3.0];
        let mut model = KNeighborsRegressor::new(5);
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&array![[0.5]]).unwrap();
        assert!((pred[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_predict_before_fit_errors() {
        let model = KNeighborsRegressor::new(3);
        assert!(matches!(
            model.predict(&array![[1.0]]).unwrap_err(),
            ScorecastError::NotFitted
        ));
    }
}
