//! # `params` – Immutable Run Configuration
//!
//! All named parameters of the system live in one flat [`Params`] struct,
//! built once at startup through [`ParamsBuilder`] (a `derive_builder`
//! builder with pre-build validation) and treated as immutable afterwards.
//! Configuration mistakes — an odd `lambda`, an empty condition range, a
//! probability outside `[0, 1]` — are rejected by `.build()` and can never
//! surface mid-learning.
//!
//! ```rust
//! use xcsf::params::ParamsBuilder;
//!
//! let params = ParamsBuilder::default()
//!     .x_dim(5)
//!     .y_dim(1)
//!     .pop_size(500)
//!     .seed(42)
//!     .build()
//!     .expect("invalid configuration");
//! assert_eq!(params.pop_size, 500);
//! ```
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::condition::ConditionKind;
use crate::loss::Loss;
use crate::neural::activation::Activation;
use crate::prediction::PredictionKind;

/// Parental selection scheme used by the evolutionary algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EaSelect {
    /// Roulette wheel over fitness sums.
    Roulette,
    /// Fitness tournament admitting each member with probability
    /// [`Params::ea_select_size`].
    Tournament,
}

/// The full parameter set. Field names follow the conventional XCSF symbols.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(pattern = "owned", build_fn(validate = "Self::validate"))]
pub struct Params {
    /// Input dimensionality d.
    pub x_dim: usize,
    /// Output dimensionality k.
    pub y_dim: usize,
    /// Maximum population numerosity sum N.
    #[builder(default = "2000")]
    pub pop_size: usize,
    /// Learning rate β for error, fitness and set-size updates.
    #[builder(default = "0.1")]
    pub beta: f64,
    /// Accuracy offset α.
    #[builder(default = "0.1")]
    pub alpha: f64,
    /// Accuracy slope ν.
    #[builder(default = "5.0")]
    pub nu: f64,
    /// Target error ε₀ below which a classifier is considered accurate.
    #[builder(default = "0.01")]
    pub eps_zero: f64,
    /// EA trigger interval θ_EA, compared against the set's mean time.
    #[builder(default = "50")]
    pub theta_ea: u64,
    /// Experience threshold θ_sub for subsumer eligibility.
    #[builder(default = "100")]
    pub theta_sub: u32,
    /// Experience threshold θ_del for fitness-scaled deletion votes.
    #[builder(default = "20")]
    pub theta_del: u32,
    /// Fraction δ of the population mean fitness below which deletion votes
    /// are scaled up.
    #[builder(default = "0.1")]
    pub delta: f64,
    /// Minimum match-set coverage θ_mna; covering fires while |M| is smaller.
    #[builder(default = "1")]
    pub theta_mna: usize,
    /// Base crossover probability.
    #[builder(default = "0.8")]
    pub p_crossover: f64,
    /// Base mutation probability, overridden per-classifier when `num_sam > 0`.
    #[builder(default = "0.1")]
    pub p_mutation: f64,
    /// Offspring per EA invocation; must be even.
    #[builder(default = "2")]
    pub lambda: usize,
    /// Offspring error dampening.
    #[builder(default = "1.0")]
    pub err_reduc: f64,
    /// Offspring fitness dampening.
    #[builder(default = "0.1")]
    pub fit_reduc: f64,
    /// Covering spread and base mutation step for interval conditions.
    #[builder(default = "0.5")]
    pub s_mutation: f64,
    /// Lower bound of the condition input space.
    #[builder(default = "0.0")]
    pub cond_min: f64,
    /// Upper bound of the condition input space.
    #[builder(default = "1.0")]
    pub cond_max: f64,
    /// Parental selection scheme.
    #[builder(default = "EaSelect::Roulette")]
    pub ea_select: EaSelect,
    /// Tournament admission probability τ (used by `EaSelect::Tournament`).
    #[builder(default = "0.4")]
    pub ea_select_size: f64,
    /// Whether EA offspring may be absorbed by more general parents.
    #[builder(default = "false")]
    pub ea_subsumption: bool,
    /// Loss used for the error update.
    #[builder(default = "Loss::Mse")]
    pub loss: Loss,
    /// Condition representation.
    #[builder(default = "ConditionKind::Hyperrectangle")]
    pub condition: ConditionKind,
    /// Prediction representation.
    #[builder(default = "PredictionKind::Neural")]
    pub prediction: PredictionKind,
    /// Number of self-adaptive mutation-rate slots per variant payload;
    /// zero disables self-adaptation.
    #[builder(default = "0")]
    pub num_sam: usize,
    /// Error assigned to freshly covered classifiers.
    #[builder(default = "0.0")]
    pub init_error: f64,
    /// Fitness assigned to freshly covered classifiers.
    #[builder(default = "0.01")]
    pub init_fitness: f64,
    /// Hidden layer widths of the neural prediction.
    #[builder(default = "vec![10]")]
    pub neural_hidden: Vec<usize>,
    /// Hidden activation of the neural prediction.
    #[builder(default = "Activation::Logistic")]
    pub neural_activation: Activation,
    /// Whether hidden layers are recurrent.
    #[builder(default = "false")]
    pub neural_recurrent: bool,
    /// Gradient-descent rate η of neural layers.
    #[builder(default = "0.1")]
    pub neural_eta: f64,
    /// Momentum of neural layer updates.
    #[builder(default = "0.9")]
    pub neural_momentum: f64,
    /// Weight decay of neural layer updates.
    #[builder(default = "0.0")]
    pub neural_decay: f64,
    /// RNG seed; `None` draws from OS entropy.
    #[builder(setter(strip_option), default = "None")]
    pub seed: Option<u64>,
}

impl ParamsBuilder {
    /// Pre build validation
    fn validate(&self) -> Result<(), String> {
        if let Some(x_dim) = self.x_dim {
            validate_positive(x_dim, "x_dim")?;
        }
        if let Some(y_dim) = self.y_dim {
            validate_positive(y_dim, "y_dim")?;
        }
        if let Some(pop_size) = self.pop_size {
            validate_positive(pop_size, "pop_size")?;
        }
        if let Some(beta) = self.beta {
            if beta <= 0.0 || beta > 1.0 {
                return Err("beta must be in (0, 1]".into());
            }
        }
        for (value, name) in [
            (self.p_crossover, "p_crossover"),
            (self.p_mutation, "p_mutation"),
            (self.delta, "delta"),
        ] {
            if let Some(value) = value {
                validate_probability(value, name)?;
            }
        }
        if let Some(tau) = self.ea_select_size {
            if tau <= 0.0 || tau > 1.0 {
                return Err("ea_select_size must be in (0, 1]".into());
            }
        }
        if let Some(lambda) = self.lambda {
            validate_positive(lambda, "lambda")?;
            if lambda % 2 != 0 {
                return Err(format!("lambda must be even, got {lambda}"));
            }
        }
        if let Some(theta_mna) = self.theta_mna {
            validate_positive(theta_mna, "theta_mna")?;
            if let Some(pop_size) = self.pop_size {
                if theta_mna > pop_size {
                    return Err("theta_mna cannot exceed pop_size".into());
                }
            }
        }
        let lo = self.cond_min.unwrap_or(0.0);
        let hi = self.cond_max.unwrap_or(1.0);
        if lo >= hi {
            return Err(format!("condition range [{lo}, {hi}] is empty"));
        }
        for (value, name) in [
            (self.nu, "nu"),
            (self.eps_zero, "eps_zero"),
            (self.alpha, "alpha"),
            (self.s_mutation, "s_mutation"),
            (self.init_fitness, "init_fitness"),
            (self.neural_eta, "neural_eta"),
        ] {
            if let Some(value) = value {
                if value <= 0.0 {
                    return Err(format!("{name} must be positive"));
                }
            }
        }
        if let Some(hidden) = &self.neural_hidden {
            if hidden.iter().any(|&h| h == 0) {
                return Err("neural_hidden widths must be positive".into());
            }
        }
        Ok(())
    }
}

fn validate_positive(value: usize, name: &str) -> Result<(), String> {
    if value == 0 {
        return Err(format!("{name} must be positive"));
    }
    Ok(())
}

fn validate_probability(value: f64, name: &str) -> Result<(), String> {
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("{name} must be a probability in [0, 1]"));
    }
    Ok(())
}
