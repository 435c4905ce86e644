//! Variance-reduction decision tree regressor.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScorecastError};

use super::Regressor;

/// A node in the flattened tree arena. Children reference other arena slots,
/// so the whole structure serializes as a plain vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    /// Terminal node predicting the mean target of its samples.
    Leaf {
        /// Mean target of the samples in this leaf.
        value: f64,
    },
    /// Binary split: samples with `feature <= threshold` go left.
    Split {
        /// Feature column index.
        feature: usize,
        /// Split threshold (midpoint between adjacent sorted values).
        threshold: f64,
        /// Arena index of the left child.
        left: usize,
        /// Arena index of the right child.
        right: usize,
    },
}

/// Decision tree regressor choosing splits that minimize the summed squared
/// error of the two children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTreeRegressor {
    /// Maximum tree depth.
    pub max_depth: usize,
    /// Minimum samples required to attempt a split.
    pub min_samples_split: usize,
    /// Minimum samples each child must keep.
    pub min_samples_leaf: usize,
    /// Flattened tree; the root lives at index 0 after fitting.
    pub nodes: Vec<TreeNode>,
}

impl DecisionTreeRegressor {
    /// Creates an unfitted tree with the given growth limits.
    pub fn new(max_depth: usize, min_samples_split: usize, min_samples_leaf: usize) -> Self {
        Self {
            max_depth,
            min_samples_split,
            min_samples_leaf,
            nodes: Vec::new(),
        }
    }

    fn predict_one(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    sse: f64,
}

/// Finds the split minimizing child SSE, or `None` when no split satisfies
/// the leaf-size constraint or reduces the error.
fn best_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    indices: &[usize],
    min_samples_leaf: usize,
) -> Option<BestSplit> {
    let n = indices.len();
    let parent_sse = {
        let sum: f64 = indices.iter().map(|&i| y[i]).sum();
        let sum_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
        sum_sq - sum * sum / n as f64
    };

    let mut best: Option<BestSplit> = None;
    for feature in 0..x.ncols() {
        let mut order: Vec<usize> = indices.to_vec();
        order.sort_by(|&a, &b| {
            x[[a, feature]]
                .partial_cmp(&x[[b, feature]])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        let total_sum: f64 = order.iter().map(|&i| y[i]).sum();
        let total_sq: f64 = order.iter().map(|&i| y[i] * y[i]).sum();

        for pos in 1..n {
            let prev = order[pos - 1];
            left_sum += y[prev];
            left_sq += y[prev] * y[prev];

            let current = order[pos];
            if x[[prev, feature]] == x[[current, feature]] {
                continue;
            }
            if pos < min_samples_leaf || n - pos < min_samples_leaf {
                continue;
            }

            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / pos as f64)
                + (right_sq - right_sum * right_sum / (n - pos) as f64);

            if sse + 1e-12 < best.as_ref().map_or(parent_sse, |b| b.sse) {
                best = Some(BestSplit {
                    feature,
                    threshold: (x[[prev, feature]] + x[[current, feature]]) / 2.0,
                    sse,
                });
            }
        }
    }
    best
}

fn build_node(
    nodes: &mut Vec<TreeNode>,
    x: &Array2<f64>,
    y: &Array1<f64>,
    indices: &[usize],
    depth: usize,
    max_depth: usize,
    min_samples_split: usize,
    min_samples_leaf: usize,
) -> usize {
    let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64;

    let split = if depth < max_depth && indices.len() >= min_samples_split {
        best_split(x, y, indices, min_samples_leaf)
    } else {
        None
    };

    match split {
        None => {
            nodes.push(TreeNode::Leaf { value: mean });
            nodes.len() - 1
        }
        Some(split) => {
            let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .partition(|&&i| x[[i, split.feature]] <= split.threshold);

            let idx = nodes.len();
            nodes.push(TreeNode::Leaf { value: mean });
            let left = build_node(
                nodes,
                x,
                y,
                &left_indices,
                depth + 1,
                max_depth,
                min_samples_split,
                min_samples_leaf,
            );
            let right = build_node(
                nodes,
                x,
                y,
                &right_indices,
                depth + 1,
                max_depth,
                min_samples_split,
                min_samples_leaf,
            );
            nodes[idx] = TreeNode::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };
            idx
        }
    }
}

impl Regressor for DecisionTreeRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() == 0 || x.nrows() != y.len() {
            return Err(ScorecastError::training("tree fit on empty or mismatched data"));
        }
        self.nodes.clear();
        let indices: Vec<usize> = (0..x.nrows()).collect();
        build_node(
            &mut self.nodes,
            x,
            y,
            &indices,
            0,
            self.max_depth,
            self.min_samples_split,
            self.min_samples_leaf,
        );
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.nodes.is_empty() {
            return Err(ScorecastError::NotFitted);
        }
        let mut predictions = Array1::<f64>::zeros(x.nrows());
        let mut row = vec![0.0; x.ncols()];
        for i in 0..x.nrows() {
            for j in 0..x.ncols() {
                row[j] = x[[i, j]];
            }
            predictions[i] = self.predict_one(&row);
        }
        Ok(predictions)
    }
}
