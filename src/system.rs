//! # `system` – Trial Driver and Persistence
//!
//! [`Xcsf`] owns everything with cross-trial lifetime: the immutable
//! parameters, the population, the RNG, and the logical clock. Trials are
//! serial; `learn` is the only operation that advances the clock.
//!
//! ```rust
//! use ndarray::array;
//! use xcsf::params::ParamsBuilder;
//! use xcsf::system::Xcsf;
//!
//! let params = ParamsBuilder::default()
//!     .x_dim(2)
//!     .y_dim(1)
//!     .pop_size(200)
//!     .seed(7)
//!     .build()
//!     .unwrap();
//! let mut system = Xcsf::new(params);
//! let prediction = system.learn(array![0.2, 0.9].view(), array![0.5].view());
//! assert_eq!(prediction.len(), 1);
//! ```
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::ea;
use crate::error::PersistError;
use crate::params::Params;
use crate::population::Population;
use crate::random::XcsfRandomGenerator;
use crate::set;

const SAVE_TAG: &str = "xcsf-population-v1";

#[derive(Serialize)]
struct SavedStateRef<'a> {
    tag: &'static str,
    system: &'a Xcsf,
}

#[derive(Deserialize)]
struct SavedState {
    tag: String,
    system: Xcsf,
}

/// The classifier system: population, clock, RNG, parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Xcsf {
    params: Params,
    population: Population,
    rng: XcsfRandomGenerator,
    time: u64,
}

impl Xcsf {
    pub fn new(params: Params) -> Self {
        let rng = XcsfRandomGenerator::new_from_seed(params.seed);
        Self {
            params,
            population: Population::new(),
            rng,
            time: 0,
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn time(&self) -> u64 {
        self.time
    }

    /// One learning trial: form the match set (covering as needed), emit the
    /// aggregate prediction, run the update pass against `y`, and possibly
    /// run the EA.
    pub fn learn(&mut self, x: ArrayView1<f64>, y: ArrayView1<f64>) -> Array1<f64> {
        assert_eq!(x.len(), self.params.x_dim, "input width mismatch");
        assert_eq!(y.len(), self.params.y_dim, "target width mismatch");
        self.time += 1;
        let match_set = set::build_match_set(
            &self.params,
            &mut self.population,
            x,
            self.time,
            &mut self.rng,
        );
        let mut member_outputs = Vec::with_capacity(match_set.len());
        let prediction = set::aggregate_prediction(
            &mut self.population,
            &match_set,
            x,
            self.params.y_dim,
            &mut member_outputs,
        );
        set::update_set(
            &self.params,
            &mut self.population,
            &match_set,
            x,
            y,
            &member_outputs,
        );
        ea::run_ea(
            &self.params,
            &mut self.population,
            &match_set,
            self.time,
            &mut self.rng,
        );
        prediction
    }

    /// Prediction-only trial: no covering, no updates, no clock. An input
    /// nothing matches yields the neutral all-zero output.
    pub fn predict(&mut self, x: ArrayView1<f64>) -> Array1<f64> {
        assert_eq!(x.len(), self.params.x_dim, "input width mismatch");
        let match_set = set::match_set_no_cover(&mut self.population, x);
        if match_set.is_empty() {
            return Array1::zeros(self.params.y_dim);
        }
        let mut member_outputs = Vec::with_capacity(match_set.len());
        set::aggregate_prediction(
            &mut self.population,
            &match_set,
            x,
            self.params.y_dim,
            &mut member_outputs,
        )
    }

    /// Writes the full system state (population, clock, RNG) to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let path = path.as_ref();
        let file = File::create(path)?;
        serde_json::to_writer(
            BufWriter::new(file),
            &SavedStateRef {
                tag: SAVE_TAG,
                system: self,
            },
        )?;
        info!(
            path = %path.display(),
            classifiers = self.population.len(),
            "saved population"
        );
        Ok(())
    }

    /// Restores a system saved by [`Xcsf::save`]. Failures leave no partial
    /// state behind; the file is either fully restored or rejected.
    pub fn load(path: impl AsRef<Path>) -> Result<Xcsf, PersistError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let value: serde_json::Value = serde_json::from_reader(BufReader::new(file))?;
        let tag = value.get("tag").and_then(|tag| tag.as_str()).unwrap_or("");
        if tag != SAVE_TAG {
            return Err(PersistError::Tag(tag.to_string(), SAVE_TAG));
        }
        let state: SavedState = serde_json::from_value(value)?;
        info!(
            path = %path.display(),
            classifiers = state.system.population.len(),
            "loaded population"
        );
        Ok(state.system)
    }
}
