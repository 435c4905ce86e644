//! Regression metrics.

use ndarray::Array1;

/// Coefficient of determination (R²) of predictions against true targets.
///
/// Returns 1.0 for a perfect fit and 0.0 for a model no better than
/// predicting the mean. Can be negative for models worse than the mean
/// predictor. A constant target (zero variance) scores 0.0 rather than
/// dividing by zero.
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    assert_eq!(y_true.len(), y_pred.len(), "length mismatch in r2_score");
    if y_true.is_empty() {
        return 0.0;
    }

    let mean = y_true.sum() / y_true.len() as f64;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return 0.0;
    }
    1.0 - ss_res / ss_tot
}

/// Mean squared error of predictions against true targets.
pub fn mean_squared_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    assert_eq!(
        y_true.len(),
        y_pred.len(),
        "length mismatch in mean_squared_error"
    );
    if y_true.is_empty() {
        return 0.0;
    }
    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / y_true.len() as f64
}
