//! Scalar loss kinds used by the error update.
//!
//! The source of truth for a classifier's running error estimate is a single
//! scalar per trial; which scalar is configurable. The function-pointer
//! dispatch of older systems becomes a small enum resolved by `match`, so an
//! invalid selection is unrepresentable after configuration.
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Loss applied to `(prediction, target)` when updating classifier error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Loss {
    /// Mean squared error.
    Mse,
    /// Root mean squared error.
    Rmse,
}

impl Loss {
    /// Computes the scalar loss between a prediction and its target.
    pub fn compute(&self, predicted: ArrayView1<f64>, target: ArrayView1<f64>) -> f64 {
        debug_assert_eq!(predicted.len(), target.len());
        match self {
            Loss::Mse => mse(predicted, target),
            Loss::Rmse => mse(predicted, target).sqrt(),
        }
    }
}

fn mse(predicted: ArrayView1<f64>, target: ArrayView1<f64>) -> f64 {
    let sum: f64 = predicted
        .iter()
        .zip(target.iter())
        .map(|(p, y)| (y - p) * (y - p))
        .sum();
    sum / target.len() as f64
}
