//! # `neural` – Multi-Layer Network
//!
//! A small trainable network used by the neural prediction variant: an
//! ordered sequence of layers with a forward chain, an error-driven backward
//! chain, and momentum-SGD weight updates. Layers are tagged variants
//! dispatched by `match`, mirroring how conditions and predictions are
//! dispatched one level up.
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

pub mod activation;
pub mod connected;
pub mod recurrent;

pub use activation::Activation;
pub use connected::ConnectedLayer;
pub use recurrent::RecurrentLayer;

use crate::random::RandomGenerator;

/// A single network layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Layer {
    Connected(ConnectedLayer),
    Recurrent(RecurrentLayer),
}

impl Layer {
    pub fn forward(&mut self, input: ArrayView1<f64>) {
        match self {
            Layer::Connected(l) => l.forward(input),
            Layer::Recurrent(l) => l.forward(input),
        }
    }

    pub fn backward(&mut self, input: ArrayView1<f64>, prev_delta: Option<&mut Array1<f64>>) {
        match self {
            Layer::Connected(l) => l.backward(input, prev_delta),
            Layer::Recurrent(l) => l.backward(input, prev_delta),
        }
    }

    pub fn apply_updates(&mut self) {
        match self {
            Layer::Connected(l) => l.apply_updates(),
            Layer::Recurrent(l) => l.apply_updates(),
        }
    }

    pub fn mutate(&mut self, base_rate: f64, rng: &mut impl RandomGenerator) -> bool {
        match self {
            Layer::Connected(l) => l.mutate(base_rate, rng),
            Layer::Recurrent(l) => l.mutate(base_rate, rng),
        }
    }

    pub fn output(&self) -> &Array1<f64> {
        match self {
            Layer::Connected(l) => &l.output,
            Layer::Recurrent(l) => l.output(),
        }
    }

    pub fn delta_mut(&mut self) -> &mut Array1<f64> {
        match self {
            Layer::Connected(l) => &mut l.delta,
            Layer::Recurrent(l) => &mut l.delta,
        }
    }

    pub fn n_outputs(&self) -> usize {
        match self {
            Layer::Connected(l) => l.n_outputs(),
            Layer::Recurrent(l) => l.n_outputs(),
        }
    }

    pub fn n_weights(&self) -> usize {
        match self {
            Layer::Connected(l) => l.n_weights(),
            Layer::Recurrent(l) => l.n_weights(),
        }
    }
}

/// An ordered layer chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    layers: Vec<Layer>,
}

impl Network {
    pub fn new(layers: Vec<Layer>) -> Self {
        assert!(!layers.is_empty(), "a network needs at least one layer");
        Self { layers }
    }

    pub fn n_outputs(&self) -> usize {
        self.layers.last().expect("network has layers").n_outputs()
    }

    pub fn n_weights(&self) -> usize {
        self.layers.iter().map(Layer::n_weights).sum()
    }

    /// Runs the forward chain, leaving each layer's activations in place.
    pub fn forward(&mut self, x: ArrayView1<f64>) {
        for i in 0..self.layers.len() {
            let input = if i == 0 {
                x.to_owned()
            } else {
                self.layers[i - 1].output().clone()
            };
            self.layers[i].forward(input.view());
        }
    }

    /// Output of the most recent forward pass.
    pub fn output(&self) -> &Array1<f64> {
        self.layers.last().expect("network has layers").output()
    }

    /// One gradient step toward `y`, using the activations left by the
    /// preceding [`Network::forward`] call on the same input.
    pub fn learn(&mut self, x: ArrayView1<f64>, y: ArrayView1<f64>) {
        for layer in &mut self.layers {
            layer.delta_mut().fill(0.0);
        }
        let error = &y.to_owned() - self.output();
        self.layers
            .last_mut()
            .expect("network has layers")
            .delta_mut()
            .assign(&error);
        for i in (0..self.layers.len()).rev() {
            let input = if i == 0 {
                x.to_owned()
            } else {
                self.layers[i - 1].output().clone()
            };
            let (below, from) = self.layers.split_at_mut(i);
            let prev_delta = below.last_mut().map(Layer::delta_mut);
            from[0].backward(input.view(), prev_delta);
        }
        for layer in &mut self.layers {
            layer.apply_updates();
        }
    }

    /// Mutates every layer; true iff any weight changed.
    pub fn mutate(&mut self, base_rate: f64, rng: &mut impl RandomGenerator) -> bool {
        let mut changed = false;
        for layer in &mut self.layers {
            changed |= layer.mutate(base_rate, rng);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::XcsfRandomGenerator;
    use ndarray::array;

    fn two_layer_net(rng: &mut XcsfRandomGenerator) -> Network {
        Network::new(vec![
            Layer::Connected(ConnectedLayer::new(
                2,
                4,
                Activation::Logistic,
                0.1,
                0.0,
                0.0,
                0,
                rng,
            )),
            Layer::Connected(ConnectedLayer::new(
                4,
                1,
                Activation::Identity,
                0.1,
                0.0,
                0.0,
                0,
                rng,
            )),
        ])
    }

    #[test]
    fn test_learn_reduces_error_on_fixed_pair() {
        let mut rng = XcsfRandomGenerator::new_from_seed(Some(11));
        let mut net = two_layer_net(&mut rng);
        let x = array![0.3, 0.7];
        let y = array![0.9];

        net.forward(x.view());
        let before = (net.output()[0] - y[0]).abs();
        for _ in 0..200 {
            net.forward(x.view());
            net.learn(x.view(), y.view());
        }
        net.forward(x.view());
        let after = (net.output()[0] - y[0]).abs();
        assert!(after < before);
        assert!(after < 1e-2, "residual error {}", after);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut rng = XcsfRandomGenerator::new_from_seed(Some(12));
        let mut net = two_layer_net(&mut rng);
        let clone = net.clone();
        let x = array![0.1, 0.2];
        let y = array![0.5];
        net.forward(x.view());
        net.learn(x.view(), y.view());

        let mut a = net;
        let mut b = clone;
        a.forward(x.view());
        b.forward(x.view());
        assert_ne!(a.output()[0], b.output()[0]);
    }
}
