//! # `xcsf` – An Online Evolutionary Learning Classifier System
//!
//! An XCSF-style system for supervised regression: a bounded population of
//! overlapping *classifiers*, each pairing a **condition** (which inputs it
//! speaks for) with a **prediction** (what it outputs there), adapted by
//! three interleaved mechanisms:
//!
//! 1. **Online updates** – Widrow–Hoff error, set-size and fitness tracking
//!    plus each prediction's own gradient step ([`set`]).
//! 2. **Accuracy-based credit assignment** – fitness is the normalized
//!    accuracy share within the match set, so payoff is relative ([`set`]).
//! 3. **A steady-state evolutionary algorithm** – parental selection,
//!    crossover, mutation, subsumption and vote-based deletion inside the
//!    match set ([`ea`]).
//!
//! Conditions and predictions are *tagged variants* dispatched by `match`
//! ([`condition`], [`prediction`]); hyperrectangle conditions and constant /
//! neural predictions are the reference representations. Mutation rates can
//! self-adapt per classifier ([`sam`]).
//!
//! ## Quick start
//!
//! ```rust
//! use ndarray::array;
//! use xcsf::params::ParamsBuilder;
//! use xcsf::system::Xcsf;
//!
//! let params = ParamsBuilder::default()
//!     .x_dim(1)
//!     .y_dim(1)
//!     .pop_size(500)
//!     .theta_mna(4)
//!     .seed(42)
//!     .build()
//!     .expect("invalid configuration");
//! let mut system = Xcsf::new(params);
//!
//! for _ in 0..100 {
//!     // learn y = 0.5 on the whole input range
//!     system.learn(array![0.3].view(), array![0.5].view());
//! }
//! let prediction = system.predict(array![0.3].view());
//! assert_eq!(prediction.len(), 1);
//! ```
pub mod classifier;
pub mod condition;
pub mod ea;
pub mod error;
pub mod loss;
pub mod neural;
pub mod params;
pub mod population;
pub mod prediction;
pub mod random;
pub mod sam;
pub mod set;
pub mod system;

pub use classifier::Classifier;
pub use condition::{Condition, ConditionKind};
pub use error::PersistError;
pub use loss::Loss;
pub use params::{EaSelect, Params, ParamsBuilder};
pub use population::{ClId, Population};
pub use prediction::{Prediction, PredictionKind};
pub use random::{RandomGenerator, XcsfRandomGenerator};
pub use set::Set;
pub use system::Xcsf;
