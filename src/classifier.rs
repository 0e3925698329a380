//! # `classifier` – The Unit of Knowledge
//!
//! A classifier pairs a condition with a prediction and carries the
//! bookkeeping that credit assignment and the EA read: running error,
//! accuracy-derived fitness, numerosity (how many duplicates this record
//! stands for), experience, the last EA timestamp, and a running estimate of
//! the action-set sizes it has participated in.
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::condition::Condition;
use crate::params::Params;
use crate::prediction::Prediction;
use crate::random::RandomGenerator;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classifier {
    pub condition: Condition,
    pub prediction: Prediction,
    /// Running estimate of absolute prediction error.
    pub error: f64,
    /// Accuracy-derived fitness, relative within a match set.
    pub fitness: f64,
    /// Duplicate count this record stands for.
    pub numerosity: u32,
    /// Number of updates received.
    pub experience: u32,
    /// Timestamp of the last EA that ran on a set containing this classifier.
    pub time: u64,
    /// Running mean of the numerosity sum of the action sets it joined.
    pub set_size: f64,
    /// Cached match result for the current input; transient.
    #[serde(skip)]
    pub matched: bool,
}

impl Classifier {
    /// A freshly covered classifier guaranteed to match `x`.
    pub fn covering(
        params: &Params,
        x: ArrayView1<f64>,
        time: u64,
        rng: &mut impl RandomGenerator,
    ) -> Self {
        Self {
            condition: Condition::covering(params, x, rng),
            prediction: Prediction::new(params, rng),
            error: params.init_error,
            fitness: params.init_fitness,
            numerosity: 1,
            experience: 0,
            time,
            set_size: 1.0,
            matched: true,
        }
    }

    /// Deep offspring copy: fresh counters, unit numerosity, per-unit
    /// fitness. Error and fitness are re-initialized by the EA afterwards.
    pub fn child(&self, time: u64) -> Self {
        Self {
            condition: self.condition.clone(),
            prediction: self.prediction.clone(),
            error: self.error,
            fitness: self.fitness / self.numerosity as f64,
            numerosity: 1,
            experience: 0,
            time,
            set_size: self.set_size,
            matched: false,
        }
    }

    /// Whether this classifier may absorb more specific ones.
    pub fn is_subsumer(&self, params: &Params) -> bool {
        self.experience >= params.theta_sub && self.error < params.eps_zero
    }

    /// Whether this classifier's condition is strictly more general than
    /// `other`'s.
    pub fn is_more_general(&self, other: &Classifier, params: &Params) -> bool {
        self.condition.is_more_general(&other.condition, params)
    }

    /// Accuracy κ derived from the running error.
    pub fn accuracy(&self, params: &Params) -> f64 {
        if self.error < params.eps_zero {
            1.0
        } else {
            params.alpha * (self.error / params.eps_zero).powf(-params.nu)
        }
    }

    /// Deletion vote: action-set mass, scaled up for experienced classifiers
    /// whose per-unit fitness fell far below the population mean.
    pub fn deletion_vote(&self, mean_fitness: f64, params: &Params) -> f64 {
        let mut vote = self.set_size * self.numerosity as f64;
        let unit_fitness = self.fitness / self.numerosity as f64;
        if self.experience > params.theta_del && unit_fitness < params.delta * mean_fitness {
            vote *= mean_fitness / unit_fitness;
        }
        vote
    }
}
