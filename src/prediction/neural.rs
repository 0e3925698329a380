//! Trainable neural prediction.
//!
//! Wraps a [`Network`] built from the configured hidden widths: hidden
//! layers use the configured activation (connected or recurrent), the head
//! is a linear connected layer of the output width. `compute` runs the
//! forward chain; `update` back-propagates `y − ŷ` from the activations the
//! preceding `compute` left in place and applies momentum-SGD updates.
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::neural::{Activation, ConnectedLayer, Layer, Network, RecurrentLayer};
use crate::params::Params;
use crate::random::RandomGenerator;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeuralPrediction {
    net: Network,
}

impl NeuralPrediction {
    pub fn new(params: &Params, rng: &mut impl RandomGenerator) -> Self {
        let mut layers = Vec::with_capacity(params.neural_hidden.len() + 1);
        let mut n_inputs = params.x_dim;
        for &width in &params.neural_hidden {
            let layer = if params.neural_recurrent {
                Layer::Recurrent(RecurrentLayer::new(
                    n_inputs,
                    width,
                    params.neural_activation,
                    params.neural_eta,
                    params.neural_momentum,
                    params.neural_decay,
                    params.num_sam,
                    rng,
                ))
            } else {
                Layer::Connected(ConnectedLayer::new(
                    n_inputs,
                    width,
                    params.neural_activation,
                    params.neural_eta,
                    params.neural_momentum,
                    params.neural_decay,
                    params.num_sam,
                    rng,
                ))
            };
            layers.push(layer);
            n_inputs = width;
        }
        layers.push(Layer::Connected(ConnectedLayer::new(
            n_inputs,
            params.y_dim,
            Activation::Identity,
            params.neural_eta,
            params.neural_momentum,
            params.neural_decay,
            params.num_sam,
            rng,
        )));
        Self {
            net: Network::new(layers),
        }
    }

    pub fn compute(&mut self, x: ArrayView1<f64>, out: &mut Array1<f64>) {
        self.net.forward(x);
        out.assign(self.net.output());
    }

    pub fn update(&mut self, x: ArrayView1<f64>, y: ArrayView1<f64>) {
        self.net.learn(x, y);
    }

    pub fn mutate(&mut self, params: &Params, rng: &mut impl RandomGenerator) -> bool {
        self.net.mutate(params.p_mutation, rng)
    }

    pub fn size(&self) -> usize {
        self.net.n_weights()
    }
}
