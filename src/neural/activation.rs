//! Activation kinds for neural layers.
use serde::{Deserialize, Serialize};

/// Pointwise nonlinearity applied to a layer's pre-activation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    Logistic,
    Tanh,
    Relu,
    Identity,
}

impl Activation {
    /// Applies the activation to a pre-activation value.
    pub fn apply(&self, z: f64) -> f64 {
        match self {
            Activation::Logistic => 1.0 / (1.0 + (-z).exp()),
            Activation::Tanh => z.tanh(),
            Activation::Relu => z.max(0.0),
            Activation::Identity => z,
        }
    }

    /// Derivative of the activation, evaluated at pre-activation `z`.
    pub fn gradient(&self, z: f64) -> f64 {
        match self {
            Activation::Logistic => {
                let s = self.apply(z);
                s * (1.0 - s)
            }
            Activation::Tanh => {
                let t = z.tanh();
                1.0 - t * t
            }
            Activation::Relu => {
                if z > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            Activation::Identity => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest(
        activation, z, expected,
        case(Activation::Logistic, 0.0, 0.5),
        case(Activation::Tanh, 0.0, 0.0),
        case(Activation::Relu, -1.5, 0.0),
        case(Activation::Relu, 1.5, 1.5),
        case(Activation::Identity, 0.3, 0.3)
    )]
    fn test_apply(activation: Activation, z: f64, expected: f64) {
        assert!((activation.apply(z) - expected).abs() < 1e-12);
    }

    #[rstest(
        activation,
        case(Activation::Logistic),
        case(Activation::Tanh),
        case(Activation::Identity)
    )]
    fn test_gradient_matches_finite_difference(activation: Activation) {
        let h = 1e-6;
        for &z in &[-1.2, -0.3, 0.0, 0.4, 2.1] {
            let numeric = (activation.apply(z + h) - activation.apply(z - h)) / (2.0 * h);
            assert!(
                (activation.gradient(z) - numeric).abs() < 1e-6,
                "gradient mismatch for {:?} at {}",
                activation,
                z
            );
        }
    }
}
