//! # `random` – Unified RNG Abstraction
//!
//! Every stochastic operation in the system (covering, mutation, crossover,
//! selection, deletion) depends on an RNG, but call sites shouldn't have to
//! juggle the `rand` crate's API directly.  The **`RandomGenerator`** trait
//! offers a single façade while still giving access to the underlying RNG
//! when a distribution sampler needs it.
//!
//! ## Trait highlights
//!
//! | Method | Purpose |
//! |--------|---------|
//! | `gen_range_usize(min, max)` | `usize` in `[min, max)` |
//! | `gen_range_f64(min, max)`   | `f64`  in `[min, max)` |
//! | `gen_bool(p)`               | Bernoulli(`p`) |
//! | `gen_probability()`         | uniform `[0, 1)` |
//! | `gen_normal(mean, sd)`      | Gaussian draw |
//! | `choose(slice)`             | random element or `None` |
//! | `rng()`                     | mutable handle to the raw `RngCore` object |
//!
//! The production generator, [`XcsfRandomGenerator`], is backed by
//! `rand_chacha::ChaCha12Rng` (the same engine behind `StdRng`) because its
//! state serializes: [`Xcsf::save`](crate::system::Xcsf::save) must round-trip
//! the RNG so a reloaded system continues the exact reference trace.  Tests
//! that exercise operator logic without randomness use
//! [`NoopRandomGenerator`], whose raw RNG panics if dereferenced.
use rand::prelude::IndexedRandom;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha12Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// A trait defining a unified interface for generating random values,
/// used across the classifier system and its variant operators.
pub trait RandomGenerator {
    type R: RngCore + Rng;

    /// Generates a random `usize` in the range `[min, max)` using the underlying RNG.
    fn gen_range_usize(&mut self, min: usize, max: usize) -> usize {
        self.rng().random_range(min..max)
    }

    /// Generates a random `f64` in the range `[min, max)` using the underlying RNG.
    fn gen_range_f64(&mut self, min: f64, max: f64) -> f64 {
        self.rng().random_range(min..max)
    }

    /// Generates a random boolean value with probability `p` of being `true`
    /// using the underlying RNG.
    fn gen_bool(&mut self, p: f64) -> bool {
        self.rng().random_bool(p)
    }

    /// Generates a random probability as an `f64` in the range `[0.0, 1.0)`.
    fn gen_probability(&mut self) -> f64 {
        self.rng().random::<f64>()
    }

    /// Draws from a Gaussian with the given mean and standard deviation.
    fn gen_normal(&mut self, mean: f64, sd: f64) -> f64 {
        let normal =
            Normal::new(mean, sd).expect("Failed to create normal distribution. Sd must be > 0.");
        normal.sample(self.rng())
    }

    /// Picks a random element from `slice`, or `None` if it is empty.
    fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        slice.choose(self.rng())
    }

    /// Returns a mutable reference to the underlying RNG implementing `RngCore`.
    fn rng(&mut self) -> &mut Self::R;
}

/// The production implementation of `RandomGenerator`, with serializable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XcsfRandomGenerator {
    rng: ChaCha12Rng,
}

impl XcsfRandomGenerator {
    /// Creates a new `XcsfRandomGenerator` from the provided engine.
    pub fn new(rng: ChaCha12Rng) -> Self {
        Self { rng }
    }

    /// Seeded construction; `None` draws the seed from the OS entropy source.
    pub fn new_from_seed(seed: Option<u64>) -> Self {
        let rng = seed.map_or_else(
            || ChaCha12Rng::from_rng(&mut rand::rng()),
            ChaCha12Rng::seed_from_u64,
        );
        Self { rng }
    }
}

impl RandomGenerator for XcsfRandomGenerator {
    type R = ChaCha12Rng;
    fn rng(&mut self) -> &mut ChaCha12Rng {
        &mut self.rng
    }
}

/// A dummy implementation of `RngCore` for testing purposes.
/// This struct is used when methods are called via the `RandomGenerator` trait
/// without directly interacting with the raw RNG. Any attempt to draw from it
/// panics, catching unintended randomness in deterministic tests.
pub struct TestDummyRng;

impl RngCore for TestDummyRng {
    /// Not used in tests. This method is unimplemented.
    fn next_u32(&mut self) -> u32 {
        unimplemented!("Not used in this test")
    }

    /// Not used in tests. This method is unimplemented.
    fn next_u64(&mut self) -> u64 {
        unimplemented!("Not used in this test")
    }

    /// Not used in tests. This method is unimplemented.
    fn fill_bytes(&mut self, _dest: &mut [u8]) {
        unimplemented!("Not used in this test")
    }
}

/// A `RandomGenerator` whose raw RNG is never expected to be touched.
pub struct NoopRandomGenerator {
    dummy: TestDummyRng,
}

impl Default for NoopRandomGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl NoopRandomGenerator {
    pub fn new() -> Self {
        Self {
            dummy: TestDummyRng,
        }
    }
}

impl RandomGenerator for NoopRandomGenerator {
    type R = TestDummyRng;
    fn rng(&mut self) -> &mut TestDummyRng {
        &mut self.dummy
    }
}
