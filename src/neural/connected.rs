//! Fully-connected layer trained by momentum SGD.
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::neural::activation::Activation;
use crate::random::RandomGenerator;
use crate::sam::{SamMethod, sam_adapt, sam_init};

/// Standard deviation used both for weight initialization and for the
/// Gaussian weight perturbation applied by `mutate`.
pub(crate) const WEIGHT_SD: f64 = 0.1;

const SAM_SLOTS: [SamMethod; 1] = [SamMethod::LogNormal];

/// A dense layer: `output = f(W·input + b)`.
///
/// Gradient accumulators (`weight_updates`, `bias_updates`) persist across
/// trials and are scaled by `momentum` after each application, so updates
/// carry velocity the way the classic momentum-SGD recurrence does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectedLayer {
    pub(crate) weights: Array2<f64>,
    pub(crate) biases: Array1<f64>,
    weight_updates: Array2<f64>,
    bias_updates: Array1<f64>,
    /// Pre-activation of the last forward pass.
    pub(crate) state: Array1<f64>,
    /// Activated output of the last forward pass.
    pub(crate) output: Array1<f64>,
    /// Error signal written by the layer above (or the network head).
    pub(crate) delta: Array1<f64>,
    activation: Activation,
    eta: f64,
    momentum: f64,
    decay: f64,
    mu: Vec<f64>,
}

impl ConnectedLayer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        n_inputs: usize,
        n_outputs: usize,
        activation: Activation,
        eta: f64,
        momentum: f64,
        decay: f64,
        num_sam: usize,
        rng: &mut impl RandomGenerator,
    ) -> Self {
        let weights =
            Array2::from_shape_fn((n_outputs, n_inputs), |_| rng.gen_normal(0.0, WEIGHT_SD));
        Self {
            weights,
            biases: Array1::zeros(n_outputs),
            weight_updates: Array2::zeros((n_outputs, n_inputs)),
            bias_updates: Array1::zeros(n_outputs),
            state: Array1::zeros(n_outputs),
            output: Array1::zeros(n_outputs),
            delta: Array1::zeros(n_outputs),
            activation,
            eta,
            momentum,
            decay,
            mu: sam_init(&SAM_SLOTS, num_sam, rng),
        }
    }

    pub fn n_inputs(&self) -> usize {
        self.weights.ncols()
    }

    pub fn n_outputs(&self) -> usize {
        self.weights.nrows()
    }

    pub fn n_weights(&self) -> usize {
        self.weights.len() + self.biases.len()
    }

    pub fn forward(&mut self, input: ArrayView1<f64>) {
        debug_assert_eq!(input.len(), self.n_inputs());
        self.state = self.weights.dot(&input) + &self.biases;
        self.output = self.state.mapv(|z| self.activation.apply(z));
    }

    /// Back-propagates `self.delta`, accumulating gradients and adding the
    /// input-side error signal into `prev_delta` when present.
    pub fn backward(&mut self, input: ArrayView1<f64>, prev_delta: Option<&mut Array1<f64>>) {
        for (d, &z) in self.delta.iter_mut().zip(self.state.iter()) {
            *d *= self.activation.gradient(z);
        }
        self.bias_updates += &self.delta;
        for (i, &d) in self.delta.iter().enumerate() {
            self.weight_updates.row_mut(i).scaled_add(d, &input);
        }
        if let Some(prev) = prev_delta {
            for (i, &d) in self.delta.iter().enumerate() {
                prev.scaled_add(d, &self.weights.row(i));
            }
        }
    }

    /// Applies the accumulated gradients, then scales them by the momentum.
    pub fn apply_updates(&mut self) {
        self.biases.scaled_add(self.eta, &self.bias_updates);
        self.bias_updates *= self.momentum;
        if self.decay > 0.0 {
            let decayed = &self.weights * -self.decay;
            self.weight_updates += &decayed;
        }
        self.weights.scaled_add(self.eta, &self.weight_updates);
        self.weight_updates *= self.momentum;
    }

    /// Gaussian weight perturbation gated per-weight by the layer's rate.
    pub fn mutate(&mut self, base_rate: f64, rng: &mut impl RandomGenerator) -> bool {
        sam_adapt(&mut self.mu, &SAM_SLOTS, rng);
        let rate = self.mu.first().copied().unwrap_or(base_rate);
        let mut changed = false;
        for w in self.weights.iter_mut().chain(self.biases.iter_mut()) {
            if rng.gen_bool(rate) {
                *w += rng.gen_normal(0.0, WEIGHT_SD);
                changed = true;
            }
        }
        changed
    }
}
