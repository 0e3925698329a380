//! Recurrent layer built from three connected sublayers.
//!
//! `state = input_layer(x) + self_layer(previous output)` and the layer
//! output is `output_layer(state)` with the configured activation. The input
//! and self sublayers are linear; only the output sublayer applies the
//! nonlinearity.
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::neural::activation::Activation;
use crate::neural::connected::ConnectedLayer;
use crate::random::RandomGenerator;
use crate::sam::{SamMethod, sam_adapt, sam_init};

const SAM_SLOTS: [SamMethod; 1] = [SamMethod::LogNormal];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrentLayer {
    pub(crate) input_layer: ConnectedLayer,
    pub(crate) self_layer: ConnectedLayer,
    pub(crate) output_layer: ConnectedLayer,
    /// Summed pre-activation of the last forward pass.
    state: Array1<f64>,
    /// State of the forward pass before it; the backward pass feeds it to the
    /// self sublayer.
    prev_state: Array1<f64>,
    /// Error signal written by the layer above (or the network head).
    pub(crate) delta: Array1<f64>,
    mu: Vec<f64>,
}

impl RecurrentLayer {
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
        Self {
            input_layer: ConnectedLayer::new(
                n_inputs,
                n_outputs,
                Activation::Identity,
                eta,
                momentum,
                decay,
                0,
                rng,
            ),
            self_layer: ConnectedLayer::new(
                n_outputs,
                n_outputs,
                Activation::Identity,
                eta,
                momentum,
                decay,
                0,
                rng,
            ),
            output_layer: ConnectedLayer::new(
                n_outputs, n_outputs, activation, eta, momentum, decay, 0, rng,
            ),
            state: Array1::zeros(n_outputs),
            prev_state: Array1::zeros(n_outputs),
            delta: Array1::zeros(n_outputs),
            mu: sam_init(&SAM_SLOTS, num_sam, rng),
        }
    }

    pub fn n_inputs(&self) -> usize {
        self.input_layer.n_inputs()
    }

    pub fn n_outputs(&self) -> usize {
        self.state.len()
    }

    pub fn n_weights(&self) -> usize {
        self.input_layer.n_weights() + self.self_layer.n_weights() + self.output_layer.n_weights()
    }

    pub fn output(&self) -> &Array1<f64> {
        &self.output_layer.output
    }

    pub fn forward(&mut self, input: ArrayView1<f64>) {
        self.prev_state.assign(&self.state);
        self.input_layer.forward(input);
        let prev_output = self.output_layer.output.clone();
        self.self_layer.forward(prev_output.view());
        self.state.assign(&self.input_layer.output);
        self.state += &self.self_layer.output;
        let state = self.state.clone();
        self.output_layer.forward(state.view());
    }

    pub fn backward(&mut self, input: ArrayView1<f64>, prev_delta: Option<&mut Array1<f64>>) {
        self.output_layer.delta.assign(&self.delta);
        self.self_layer.delta.fill(0.0);
        let state = self.state.clone();
        self.output_layer
            .backward(state.view(), Some(&mut self.self_layer.delta));
        self.input_layer.delta.assign(&self.self_layer.delta);
        let prev_state = self.prev_state.clone();
        self.self_layer.backward(prev_state.view(), None);
        self.input_layer.backward(input, prev_delta);
    }

    pub fn apply_updates(&mut self) {
        self.input_layer.apply_updates();
        self.self_layer.apply_updates();
        self.output_layer.apply_updates();
    }

    pub fn mutate(&mut self, base_rate: f64, rng: &mut impl RandomGenerator) -> bool {
        sam_adapt(&mut self.mu, &SAM_SLOTS, rng);
        let rate = self.mu.first().copied().unwrap_or(base_rate);
        let mut changed = self.input_layer.mutate(rate, rng);
        changed |= self.self_layer.mutate(rate, rng);
        changed |= self.output_layer.mutate(rate, rng);
        changed
    }
}
