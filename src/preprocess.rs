//! Column-wise preprocessing: imputation, one-hot encoding, and scaling.
//!
//! The [`Preprocessor`] converts raw [`StudentRecord`] fields into a
//! fixed-width numeric feature vector. It groups columns into two
//! sub-transforms:
//!
//! - **numeric** (`reading_score`, `writing_score`): missing values are
//!   replaced by the column median, then the column is standardized to zero
//!   mean and unit variance;
//! - **categorical** (`gender`, `race_ethnicity`, ...): missing values are
//!   replaced by the column mode, then one-hot encoded over the vocabulary
//!   learned at fit time, and each indicator column is divided by its
//!   standard deviation without centering. Centering is skipped so the 0/1
//!   columns stay sparse and interpretable.
//!
//! Fitting happens exactly once, on training features only; the fitted state
//! is immutable afterwards and applied identically to test data and single
//! inference records. The fitted parameters serialize to a flat, portable
//! schema (medians, modes, vocabularies, scale factors).

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::UnseenCategoryPolicy;
use crate::dataset::{StudentRecord, CATEGORICAL_COLUMNS, NUMERIC_COLUMNS};
use crate::error::{Result, ScorecastError};

/// Fitted statistics for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericColumn {
    /// Column name.
    pub name: String,
    /// Median of the non-missing training values, used for imputation.
    pub median: f64,
    /// Mean of the imputed training values.
    pub mean: f64,
    /// Standard deviation of the imputed training values; 1.0 for
    /// zero-variance columns so constant inputs pass through unscaled.
    pub scale: f64,
}

/// Fitted statistics for one categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalColumn {
    /// Column name.
    pub name: String,
    /// Most frequent non-missing training value, used for imputation.
    /// Frequency ties break toward the lexicographically smallest value.
    pub mode: String,
    /// Sorted one-hot vocabulary learned at fit time.
    pub categories: Vec<String>,
    /// Per-indicator-column standard deviation (no centering); 1.0 for
    /// zero-variance indicators.
    pub scales: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FittedState {
    numeric: Vec<NumericColumn>,
    categorical: Vec<CategoricalColumn>,
}

/// A reusable column-wise transform from records to feature vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    policy: UnseenCategoryPolicy,
    fitted: Option<FittedState>,
}

impl Preprocessor {
    /// Creates an unfitted preprocessor with the given unseen-category
    /// policy.
    pub fn new(policy: UnseenCategoryPolicy) -> Self {
        Self {
            policy,
            fitted: None,
        }
    }

    /// Returns `true` once [`fit`](Self::fit) has run.
    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Overrides the unseen-category policy, e.g. for a stricter inference
    /// caller than the training run. Fitted statistics are untouched.
    pub fn set_policy(&mut self, policy: UnseenCategoryPolicy) {
        self.policy = policy;
    }

    /// Width of the transformed feature vector.
    pub fn output_dim(&self) -> Result<usize> {
        let state = self.fitted.as_ref().ok_or(ScorecastError::NotFitted)?;
        Ok(state.numeric.len()
            + state
                .categorical
                .iter()
                .map(|c| c.categories.len())
                .sum::<usize>())
    }

    /// Names of the transformed feature columns, in output order.
    pub fn feature_names(&self) -> Result<Vec<String>> {
        let state = self.fitted.as_ref().ok_or(ScorecastError::NotFitted)?;
        let mut names: Vec<String> = state.numeric.iter().map(|c| c.name.clone()).collect();
        for column in &state.categorical {
            for category in &column.categories {
                names.push(format!("{}={}", column.name, category));
            }
        }
        Ok(names)
    }

    /// Fits imputation statistics, the one-hot vocabulary, and scale factors
    /// on training records.
    ///
    /// Targets are never consulted; only the seven feature columns
    /// participate, so test data cannot leak into the fitted state.
    pub fn fit(&mut self, records: &[StudentRecord]) -> Result<()> {
        if records.is_empty() {
            return Err(ScorecastError::DatasetTooSmall { rows: 0 });
        }

        let mut numeric = Vec::with_capacity(NUMERIC_COLUMNS.len());
        for &name in NUMERIC_COLUMNS.iter() {
            numeric.push(fit_numeric_column(name, records)?);
        }

        let mut categorical = Vec::with_capacity(CATEGORICAL_COLUMNS.len());
        for &name in CATEGORICAL_COLUMNS.iter() {
            categorical.push(fit_categorical_column(name, records)?);
        }

        self.fitted = Some(FittedState {
            numeric,
            categorical,
        });
        Ok(())
    }

    /// Transforms records into a feature matrix of shape
    /// `(records.len(), output_dim)`.
    ///
    /// Missing values are imputed with the fitted median/mode. Categorical
    /// values absent from the fitted vocabulary follow the configured
    /// [`UnseenCategoryPolicy`].
    pub fn transform(&self, records: &[StudentRecord]) -> Result<Array2<f64>> {
        let state = self.fitted.as_ref().ok_or(ScorecastError::NotFitted)?;
        let dim = self.output_dim()?;
        let mut matrix = Array2::<f64>::zeros((records.len(), dim));
        for (i, record) in records.iter().enumerate() {
            let features = transform_one(state, self.policy, record)?;
            matrix.row_mut(i).assign(&features);
        }
        Ok(matrix)
    }

    /// Transforms a single record into a feature vector.
    pub fn transform_record(&self, record: &StudentRecord) -> Result<Array1<f64>> {
        let state = self.fitted.as_ref().ok_or(ScorecastError::NotFitted)?;
        transform_one(state, self.policy, record)
    }
}

fn fit_numeric_column(name: &str, records: &[StudentRecord]) -> Result<NumericColumn> {
    let mut present: Vec<f64> = Vec::with_capacity(records.len());
    for record in records {
        if let Some(value) = record.numeric(name)? {
            present.push(value);
        }
    }
    if present.is_empty() {
        return Err(ScorecastError::EmptyColumn {
            column: name.to_string(),
        });
    }

    let median = median(&mut present);

    let n = records.len() as f64;
    let mut sum = 0.0;
    for record in records {
        sum += record.numeric(name)?.unwrap_or(median);
    }
    let mean = sum / n;

    let mut ss = 0.0;
    for record in records {
        let value = record.numeric(name)?.unwrap_or(median);
        ss += (value - mean).powi(2);
    }
    let std = (ss / n).sqrt();

    Ok(NumericColumn {
        name: name.to_string(),
        median,
        mean,
        scale: nonzero_scale(std),
    })
}

fn fit_categorical_column(name: &str, records: &[StudentRecord]) -> Result<CategoricalColumn> {
    use std::collections::BTreeMap;

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        if let Some(value) = record.categorical(name)? {
            *counts.entry(value).or_insert(0) += 1;
        }
    }
    if counts.is_empty() {
        return Err(ScorecastError::EmptyColumn {
            column: name.to_string(),
        });
    }

    // BTreeMap iteration is sorted, so the first maximal count is the
    // lexicographically smallest mode.
    let mode = counts
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(a.0)))
        .map(|(value, _)| value.to_string())
        .unwrap_or_default();

    let categories: Vec<String> = counts.keys().map(|v| v.to_string()).collect();

    let n = records.len() as f64;
    let mut scales = Vec::with_capacity(categories.len());
    for category in &categories {
        let mut hits = 0usize;
        for record in records {
            let value = record.categorical(name)?.unwrap_or(mode.as_str());
            if value == category {
                hits += 1;
            }
        }
        let p = hits as f64 / n;
        let std = (p * (1.0 - p)).sqrt();
        scales.push(nonzero_scale(std));
    }

    Ok(CategoricalColumn {
        name: name.to_string(),
        mode,
        categories,
        scales,
    })
}

fn transform_one(
    state: &FittedState,
    policy: UnseenCategoryPolicy,
    record: &StudentRecord,
) -> Result<Array1<f64>> {
    let dim = state.numeric.len()
        + state
            .categorical
            .iter()
            .map(|c| c.categories.len())
            .sum::<usize>();
    let mut features = Array1::<f64>::zeros(dim);

    let mut offset = 0;
    for column in &state.numeric {
        let value = record.numeric(&column.name)?.unwrap_or(column.median);
        features[offset] = (value - column.mean) / column.scale;
        offset += 1;
    }

    for column in &state.categorical {
        let value = record
            .categorical(&column.name)?
            .unwrap_or(column.mode.as_str());
        match column.categories.binary_search_by(|c| c.as_str().cmp(value)) {
            Ok(idx) => {
                features[offset + idx] = 1.0 / column.scales[idx];
            }
            Err(_) => match policy {
                UnseenCategoryPolicy::ZeroEncode => {
                    warn!(
                        column = column.name.as_str(),
                        value, "unseen category, zero-encoding"
                    );
                }
                UnseenCategoryPolicy::Reject => {
                    return Err(ScorecastError::UnknownCategory {
                        column: column.name.clone(),
                        value: value.to_string(),
                    });
                }
            },
        }
        offset += column.categories.len();
    }

    Ok(features)
}

/// Median of a slice; sorts in place. Even lengths average the middle pair.
fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

fn nonzero_scale(std: f64) -> f64 {
    if std == 0.0 {
        1.0
    } else {
        std
    }
}
