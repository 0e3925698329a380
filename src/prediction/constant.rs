//! Non-trainable constant prediction.
//!
//! Holds one output vector that only the EA moves: `update` ignores the
//! target entirely, so any fit to the data comes from selection pressure on
//! accuracy rather than from gradients.
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::neural::connected::WEIGHT_SD;
use crate::params::Params;
use crate::random::RandomGenerator;
use crate::sam::{SamMethod, sam_adapt, sam_init};

const SAM_SLOTS: [SamMethod; 1] = [SamMethod::RateSelect];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constant {
    values: Array1<f64>,
    mu: Vec<f64>,
}

impl Constant {
    /// Neutral (all-zero) output vector.
    pub fn new(params: &Params, rng: &mut impl RandomGenerator) -> Self {
        Self {
            values: Array1::zeros(params.y_dim),
            mu: sam_init(&SAM_SLOTS, params.num_sam, rng),
        }
    }

    pub fn compute(&self, out: &mut Array1<f64>) {
        out.assign(&self.values);
    }

    /// Gaussian perturbation gated per-component by the mutation rate.
    pub fn mutate(&mut self, params: &Params, rng: &mut impl RandomGenerator) -> bool {
        sam_adapt(&mut self.mu, &SAM_SLOTS, rng);
        let rate = self.mu.first().copied().unwrap_or(params.p_mutation);
        let mut changed = false;
        for v in self.values.iter_mut() {
            if rng.gen_bool(rate) {
                *v += rng.gen_normal(0.0, WEIGHT_SD);
                changed = true;
            }
        }
        changed
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }
}

#[cfg(test)]
impl Constant {
    /// Test-only constructor with explicit output values.
    pub(crate) fn from_values(values: Array1<f64>) -> Self {
        Self {
            values,
            mu: vec![],
        }
    }
}
