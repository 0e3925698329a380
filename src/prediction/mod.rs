//! # `prediction` – Prediction Variant Contract
//!
//! A prediction maps the current input to an output vector and, for
//! trainable variants, adapts itself online. Like conditions, predictions
//! are tagged variants dispatched by `match`; the serde tag is the runtime
//! discriminant persisted to disk.
//!
//! The two reference variants cover both contract paths: [`Constant`] is
//! non-trainable (its `update` is a no-op, it only moves under the EA) and
//! [`Neural`](NeuralPrediction) trains by gradient descent.
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

pub mod constant;
pub mod neural;

pub use constant::Constant;
pub use neural::NeuralPrediction;

use crate::params::Params;
use crate::random::RandomGenerator;

/// Selects which prediction representation newly born classifiers use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionKind {
    Constant,
    Neural,
}

/// A classifier prediction: one variant payload behind a runtime discriminant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Prediction {
    Constant(Constant),
    Neural(NeuralPrediction),
}

impl Prediction {
    /// A neutral instance of the configured kind, used at covering time.
    pub fn new(params: &Params, rng: &mut impl RandomGenerator) -> Self {
        match params.prediction {
            PredictionKind::Constant => Prediction::Constant(Constant::new(params, rng)),
            PredictionKind::Neural => Prediction::Neural(NeuralPrediction::new(params, rng)),
        }
    }

    /// Computes the prediction for `x` into the caller-owned `out` buffer.
    /// Trainable variants keep their forward activations for a following
    /// [`Prediction::update`] on the same input.
    pub fn compute(&mut self, x: ArrayView1<f64>, out: &mut Array1<f64>) {
        match self {
            Prediction::Constant(p) => p.compute(out),
            Prediction::Neural(p) => p.compute(x, out),
        }
    }

    /// Online adaptation toward `y`; a no-op for non-trainable variants.
    /// Must follow a [`Prediction::compute`] on the same input.
    pub fn update(&mut self, x: ArrayView1<f64>, y: ArrayView1<f64>) {
        match self {
            Prediction::Constant(_) => {}
            Prediction::Neural(p) => p.update(x, y),
        }
    }

    /// In-place mutation; true iff anything changed.
    pub fn mutate(&mut self, params: &Params, rng: &mut impl RandomGenerator) -> bool {
        match self {
            Prediction::Constant(p) => p.mutate(params, rng),
            Prediction::Neural(p) => p.mutate(params, rng),
        }
    }

    /// In-place crossover with `other`; the reference variants do not mix.
    pub fn crossover(
        &mut self,
        other: &mut Prediction,
        _params: &Params,
        _rng: &mut impl RandomGenerator,
    ) -> bool {
        match (self, other) {
            (Prediction::Constant(_), Prediction::Constant(_)) => false,
            (Prediction::Neural(_), Prediction::Neural(_)) => false,
            _ => unreachable!("prediction variants never mix within a population"),
        }
    }

    /// Integer complexity measure of the payload.
    pub fn size(&self) -> usize {
        match self {
            Prediction::Constant(p) => p.size(),
            Prediction::Neural(p) => p.size(),
        }
    }
}
