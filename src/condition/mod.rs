//! # `condition` – Condition Variant Contract
//!
//! A condition decides which inputs a classifier speaks for. Variants are
//! tagged: the [`Condition`] enum carries the discriminant and the payload,
//! and every contract operation resolves by `match` — never by inheritance.
//! The serde representation of the enum preserves the tag, so persisted
//! populations restore the right payload or fail loudly on an unknown
//! discriminant. A new representation is added by extending [`Condition`],
//! [`ConditionKind`], and the `match` arms below.
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

pub mod hyperrectangle;

pub use hyperrectangle::Hyperrectangle;

use crate::params::Params;
use crate::random::RandomGenerator;

/// Selects which condition representation newly born classifiers use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionKind {
    Hyperrectangle,
}

/// A classifier condition: one variant payload behind a runtime discriminant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    Hyperrectangle(Hyperrectangle),
}

impl Condition {
    /// A uniformly random valid instance of the configured kind.
    pub fn random(params: &Params, rng: &mut impl RandomGenerator) -> Self {
        match params.condition {
            ConditionKind::Hyperrectangle => {
                Condition::Hyperrectangle(Hyperrectangle::random(params, rng))
            }
        }
    }

    /// An instance guaranteed to match `x`.
    pub fn covering(params: &Params, x: ArrayView1<f64>, rng: &mut impl RandomGenerator) -> Self {
        match params.condition {
            ConditionKind::Hyperrectangle => {
                Condition::Hyperrectangle(Hyperrectangle::covering(params, x, rng))
            }
        }
    }

    /// Whether the condition matches `x`. Callers cache the result on the
    /// classifier for cheap re-query within a trial.
    pub fn matches(&self, x: ArrayView1<f64>) -> bool {
        match self {
            Condition::Hyperrectangle(c) => c.matches(x),
        }
    }

    /// In-place mutation; true iff anything changed.
    pub fn mutate(&mut self, params: &Params, rng: &mut impl RandomGenerator) -> bool {
        match self {
            Condition::Hyperrectangle(c) => c.mutate(params, rng),
        }
    }

    /// In-place crossover with `other`; true iff anything changed.
    pub fn crossover(
        &mut self,
        other: &mut Condition,
        params: &Params,
        rng: &mut impl RandomGenerator,
    ) -> bool {
        match (self, other) {
            (Condition::Hyperrectangle(a), Condition::Hyperrectangle(b)) => {
                a.crossover(b, params, rng)
            }
        }
    }

    /// Whether `self` covers at least the input region of `other`.
    pub fn subsumes(&self, other: &Condition) -> bool {
        match (self, other) {
            (Condition::Hyperrectangle(a), Condition::Hyperrectangle(b)) => a.subsumes(b),
        }
    }

    /// Whether `self` is strictly more general than `other`.
    pub fn is_more_general(&self, other: &Condition, params: &Params) -> bool {
        match (self, other) {
            (Condition::Hyperrectangle(a), Condition::Hyperrectangle(b)) => {
                a.is_more_general(b, params)
            }
        }
    }

    /// Integer complexity measure of the payload.
    pub fn size(&self) -> usize {
        match self {
            Condition::Hyperrectangle(c) => c.size(),
        }
    }
}
