//! # `sam` – Self-Adaptive Mutation Rates
//!
//! Each condition and prediction payload carries a short vector of mutation
//! rates that evolves alongside the classifier using it.  A variant declares,
//! per slot, how that rate adapts ([`SamMethod`]); the adaptation runs right
//! before the variant's `mutate` reads any rate, so the rates themselves are
//! under selection pressure.
//!
//! Two adaptation methods exist:
//!
//! * [`SamMethod::RateSelect`] – with a fixed probability, replace the rate
//!   with a fresh draw from a discrete, logarithmically spaced candidate set.
//! * [`SamMethod::LogNormal`] – multiply the rate by `exp(N(0, 1))` and clamp
//!   it into `[MU_EPSILON, 1]`.
use serde::{Deserialize, Serialize};

use crate::random::RandomGenerator;

/// Smallest representable mutation rate.
pub const MU_EPSILON: f64 = 0.0005;

/// Discrete candidates for [`SamMethod::RateSelect`], log-spaced over the
/// usable range.
pub const RATE_CANDIDATES: [f64; 10] = [
    0.0005, 0.001, 0.002, 0.003, 0.005, 0.01, 0.015, 0.02, 0.05, 0.1,
];

/// Probability that a `RateSelect` slot is re-drawn on a given adaptation.
const RATE_SELECT_P: f64 = 0.1;

/// Per-slot adaptation rule, declared statically by each variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SamMethod {
    /// Replace the rate with a random member of [`RATE_CANDIDATES`].
    RateSelect,
    /// Multiplicative log-normal perturbation, clamped to `[MU_EPSILON, 1]`.
    LogNormal,
}

/// Initializes one rate per declared slot, truncated to `n_slots`.
///
/// `n_slots` comes from [`Params::num_sam`](crate::params::Params::num_sam);
/// zero disables self-adaptation and the variant falls back to its base rates.
pub fn sam_init(
    methods: &[SamMethod],
    n_slots: usize,
    rng: &mut impl RandomGenerator,
) -> Vec<f64> {
    methods
        .iter()
        .take(n_slots)
        .map(|method| match method {
            SamMethod::RateSelect => *rng
                .choose(&RATE_CANDIDATES)
                .expect("rate candidate set is non-empty"),
            SamMethod::LogNormal => rng.gen_range_f64(MU_EPSILON, 1.0),
        })
        .collect()
}

/// Adapts every rate in place. Must run before `mutate` reads any slot.
pub fn sam_adapt(rates: &mut [f64], methods: &[SamMethod], rng: &mut impl RandomGenerator) {
    for (rate, method) in rates.iter_mut().zip(methods) {
        match method {
            SamMethod::RateSelect => {
                if rng.gen_probability() < RATE_SELECT_P {
                    *rate = *rng
                        .choose(&RATE_CANDIDATES)
                        .expect("rate candidate set is non-empty");
                }
            }
            SamMethod::LogNormal => {
                *rate = (*rate * rng.gen_normal(0.0, 1.0).exp()).clamp(MU_EPSILON, 1.0);
            }
        }
    }
}
