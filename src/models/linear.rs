//! Linear-family regressors: ordinary, ridge, and lasso.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScorecastError};

use super::Regressor;

/// Solves `A x = b` by Gaussian elimination with partial pivoting.
///
/// `A` must be square. Singular systems return a training error.
pub(crate) fn solve_linear_system(mut a: Array2<f64>, mut b: Array1<f64>) -> Result<Array1<f64>> {
    let n = a.nrows();
    if a.ncols() != n || b.len() != n {
        return Err(ScorecastError::training("non-square linear system"));
    }

    for col in 0..n {
        let mut pivot = col;
        for row in (col + 1)..n {
            if a[[row, col]].abs() > a[[pivot, col]].abs() {
                pivot = row;
            }
        }
        if a[[pivot, col]].abs() < 1e-12 {
            return Err(ScorecastError::training("singular normal equations"));
        }
        if pivot != col {
            for k in 0..n {
                let tmp = a[[col, k]];
                a[[col, k]] = a[[pivot, k]];
                a[[pivot, k]] = tmp;
            }
            b.swap(col, pivot);
        }

        for row in (col + 1)..n {
            let factor = a[[row, col]] / a[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let mut acc = b[row];
        for k in (row + 1)..n {
            acc -= a[[row, k]] * x[k];
        }
        x[row] = acc / a[[row, row]];
    }
    Ok(x)
}

/// Builds the normal-equation system `(XᵀX + D) w = Xᵀy` with an implicit
/// intercept column and per-coefficient diagonal penalty `D`.
fn normal_equations(
    x: &Array2<f64>,
    y: &Array1<f64>,
    penalty: impl Fn(usize) -> f64,
) -> (Array2<f64>, Array1<f64>) {
    let n = x.nrows();
    let d = x.ncols();
    let p = d + 1;

    let design = |i: usize, j: usize| -> f64 {
        if j == 0 {
            1.0
        } else {
            x[[i, j - 1]]
        }
    };

    let mut gram = Array2::<f64>::zeros((p, p));
    let mut rhs = Array1::<f64>::zeros(p);
    for j in 0..p {
        for k in j..p {
            let mut acc = 0.0;
            for i in 0..n {
                acc += design(i, j) * design(i, k);
            }
            gram[[j, k]] = acc;
            gram[[k, j]] = acc;
        }
        let mut acc = 0.0;
        for i in 0..n {
            acc += design(i, j) * y[i];
        }
        rhs[j] = acc;
    }
    for j in 0..p {
        gram[[j, j]] += penalty(j);
    }
    (gram, rhs)
}

fn predict_affine(x: &Array2<f64>, intercept: f64, coefficients: &[f64]) -> Result<Array1<f64>> {
    if x.ncols() != coefficients.len() {
        return Err(ScorecastError::DimensionMismatch {
            expected: coefficients.len(),
            actual: x.ncols(),
        });
    }
    let mut predictions = Array1::<f64>::zeros(x.nrows());
    for i in 0..x.nrows() {
        let mut acc = intercept;
        for (j, coef) in coefficients.iter().enumerate() {
            acc += coef * x[[i, j]];
        }
        predictions[i] = acc;
    }
    Ok(predictions)
}

/// Ordinary least-squares regression.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    /// Fitted intercept term.
    pub intercept: f64,
    /// Fitted feature coefficients.
    pub coefficients: Vec<f64>,
}

impl LinearRegression {
    /// Creates an unfitted model.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Regressor for LinearRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        // A tiny diagonal jitter keeps the normal equations solvable when
        // one-hot blocks are perfectly collinear with the intercept.
        let (gram, rhs) = normal_equations(x, y, |_| 1e-8);
        let w = solve_linear_system(gram, rhs)?;
        self.intercept = w[0];
        self.coefficients = w.iter().skip(1).copied().collect();
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        predict_affine(x, self.intercept, &self.coefficients)
    }
}

/// L2-regularized least-squares regression. The intercept is not penalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RidgeRegression {
    /// Regularization strength.
    pub alpha: f64,
    /// Fitted intercept term.
    pub intercept: f64,
    /// Fitted feature coefficients.
    pub coefficients: Vec<f64>,
}

impl RidgeRegression {
    /// Creates an unfitted model with the given regularization strength.
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            intercept: 0.0,
            coefficients: Vec::new(),
        }
    }
}

impl Regressor for RidgeRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let alpha = self.alpha;
        let (gram, rhs) = normal_equations(x, y, |j| if j == 0 { 1e-8 } else { alpha });
        let w = solve_linear_system(gram, rhs)?;
        self.intercept = w[0];
        self.coefficients = w.iter().skip(1).copied().collect();
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        predict_affine(x, self.intercept, &self.coefficients)
    }
}

/// L1-regularized least-squares regression fitted by cyclic coordinate
/// descent on centered data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LassoRegression {
    /// Regularization strength.
    pub alpha: f64,
    /// Maximum coordinate-descent sweeps.
    pub max_iter: usize,
    /// Convergence tolerance on the largest coefficient update.
    pub tol: f64,
    /// Fitted intercept term.
    pub intercept: f64,
    /// Fitted feature coefficients.
    pub coefficients: Vec<f64>,
}

impl LassoRegression {
    /// Creates an unfitted model with the given regularization strength.
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            max_iter: 1000,
            tol: 1e-6,
            intercept: 0.0,
            coefficients: Vec::new(),
        }
    }
}

fn soft_threshold(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else {
        0.0
    }
}

impl Regressor for LassoRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        let n = x.nrows();
        let d = x.ncols();
        if n == 0 {
            return Err(ScorecastError::training("lasso fit on empty matrix"));
        }

        let x_mean: Vec<f64> = (0..d).map(|j| x.column(j).sum() / n as f64).collect();
        let y_mean = y.sum() / n as f64;

        // Centered column sums of squares; zero-variance columns are skipped.
        let z: Vec<f64> = (0..d)
            .map(|j| x.column(j).iter().map(|v| (v - x_mean[j]).powi(2)).sum())
            .collect();

        let mut w = vec![0.0_f64; d];
        let mut residual: Vec<f64> = (0..n).map(|i| y[i] - y_mean).collect();
        let shrink = self.alpha * n as f64;

        for _ in 0..self.max_iter {
            let mut max_delta = 0.0_f64;
            for j in 0..d {
                if z[j] <= 1e-12 {
                    continue;
                }
                let mut rho = 0.0;
                for i in 0..n {
                    let xc = x[[i, j]] - x_mean[j];
                    rho += xc * (residual[i] + w[j] * xc);
                }
                let updated = soft_threshold(rho, shrink) / z[j];
                let delta = updated - w[j];
                if delta != 0.0 {
                    for i in 0..n {
                        residual[i] -= delta * (x[[i, j]] - x_mean[j]);
                    }
                    w[j] = updated;
                }
                max_delta = max_delta.max(delta.abs());
            }
            if max_delta < self.tol {
                break;
            }
        }

        self.intercept = y_mean - w.iter().zip(&x_mean).map(|(wj, mj)| wj * mj).sum::<f64>();
        self.coefficients = w;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        predict_affine(x, self.intercept, &self.coefficients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn line_data() -> (Array2<f64>, Array1<f64>) {
        // y = 2x + 1, exactly.
        let x = array![[0.0], [1.0], [2.0], [3.0], [4.0]];
        let y = array![1.0, 3.0, 5.0, 7.0, 9.0];
        (x, y)
    }

    #[test]
    fn test_solve_simple_system() {
        let a = array![[2.0, 0.0], [0.0, 4.0]];
        let b = array![2.0, 8.0];
        let x = solve_linear_system(a, b).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!((x[1] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_solve_needs_pivoting() {
        let a = array![[0.0, 1.0], [1.0, 0.0]];
        let b = array![3.0, 5.0];
        let x = solve_linear_system(a, b).unwrap();
        assert!((x[0] - 5.0).abs() < 1e-12);
        assert!((x[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_solve_singular_errors() {
        let a = array![[1.0, 1.0], [2.0, 2.0]];
        let b = array![1.0, 2.0];
        assert!(solve_linear_system(a, b).is_err());
    }

    #[test]
    fn test_linear_recovers_exact_line() {
        let (x, y) = line_data();
        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();
        assert!((model.intercept - 1.0).abs() < 1e-6);
        assert!((model.coefficients[0] - 2.0).abs() < 1e-6);

        let pred = model.predict(&array![[10.0]]).unwrap();
        assert!((pred[0] - 21.0).abs() < 1e-5);
    }

    #[test]
    fn test_linear_survives_collinear_columns() {
        // Second column duplicates the first; the jitter keeps this solvable.
        let x = array![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
        let y = array![1.0, 3.0, 5.0, 7.0];
        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();
        let pred = model.predict(&x).unwrap();
        for (p, t) in pred.iter().zip(y.iter()) {
            assert!((p - t).abs() < 1e-3);
        }
    }

    #[test]
    fn test_ridge_shrinks_coefficients() {
        let (x, y) = line_data();
        let mut plain = LinearRegression::new();
        plain.fit(&x, &y).unwrap();
        let mut ridge = RidgeRegression::new(10.0);
        ridge.fit(&x, &y).unwrap();
        assert!(ridge.coefficients[0].abs() < plain.coefficients[0].abs());
        assert!(ridge.coefficients[0] > 0.0);
    }

    #[test]
    fn test_lasso_fits_dominant_feature() {
        let (x, y) = line_data();
        let mut model = LassoRegression::new(0.01);
        model.fit(&x, &y).unwrap();
        assert!((model.coefficients[0] - 2.0).abs() < 0.1);
        let pred = model.predict(&x).unwrap();
        for (p, t) in pred.iter().zip(y.iter()) {
            assert!((p - t).abs() < 0.5);
        }
    }

    #[test]
    fn test_lasso_zeroes_irrelevant_feature() {
        // y depends on column 0 only; column 1 is near-constant noise.
        let x = array![
            [0.0, 0.3],
            [1.0, 0.1],
            [2.0, 0.2],
            [3.0, 0.3],
            [4.0, 0.1],
            [5.0, 0.2]
        ];
        let y = array![0.0, 2.0, 4.0, 6.0, 8.0, 10.0];
        let mut model = LassoRegression::new(0.1);
        model.fit(&x, &y).unwrap();
        assert!((model.coefficients[0] - 2.0).abs() < 0.2);
        assert!(model.coefficients[1].abs() < 0.5);
    }

    #[test]
    fn test_predict_dimension_mismatch() {
        let (x, y) = line_data();
        let mut model = LinearRegression::new();
        model.fit(&x, &y).unwrap();
        let wide = array![[1.0, 2.0]];
        assert!(matches!(
            model.predict(&wide).unwrap_err(),
            ScorecastError::DimensionMismatch { .. }
        ));
    }
}
