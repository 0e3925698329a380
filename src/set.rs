//! # `set` – Match Sets, Covering, Aggregation, Credit Assignment
//!
//! A [`Set`] is a non-owning view over the population: the handles of the
//! classifiers whose conditions matched the current input. It stays valid
//! until the population mutates (deletion at the EA epilogue or during
//! covering, which re-validates the set).
//!
//! This module owns the per-trial pipeline around the set: building M with
//! covering, aggregating the fitness-weighted system prediction, and the
//! online update pass over M once the target is known.
use ndarray::{Array1, ArrayView1};
use tracing::debug;

use crate::classifier::Classifier;
use crate::params::Params;
use crate::population::{ClId, Population};
use crate::random::RandomGenerator;

/// Non-owning subset view over the population.
#[derive(Debug, Clone)]
pub struct Set {
    members: Vec<ClId>,
}

impl Set {
    pub(crate) fn from_members(members: Vec<ClId>) -> Self {
        Self { members }
    }

    pub fn members(&self) -> &[ClId] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Fitness mass of the set.
    pub fn total_fitness(&self, pop: &Population) -> f64 {
        self.members.iter().map(|&id| pop.get(id).fitness).sum()
    }

    /// Numerosity sum of the set.
    pub fn num_sum(&self, pop: &Population) -> u32 {
        self.members.iter().map(|&id| pop.get(id).numerosity).sum()
    }

    /// Numerosity-weighted mean of the members' EA timestamps.
    pub fn mean_time(&self, pop: &Population) -> f64 {
        let mut weighted = 0.0;
        let mut mass = 0.0;
        for &id in &self.members {
            let classifier = pop.get(id);
            weighted += classifier.time as f64 * classifier.numerosity as f64;
            mass += classifier.numerosity as f64;
        }
        weighted / mass
    }

    /// Stamps every member with the current EA time.
    pub fn stamp_times(&self, pop: &mut Population, time: u64) {
        for &id in &self.members {
            pop.get_mut(id).time = time;
        }
    }
}

/// Builds the match set for `x`, covering until the configured minimum
/// coverage is reached. Covering is strictly input-driven; when the
/// population is at capacity a victim is deleted first and the set is
/// re-validated against the survivors.
pub fn build_match_set(
    params: &Params,
    pop: &mut Population,
    x: ArrayView1<f64>,
    time: u64,
    rng: &mut impl RandomGenerator,
) -> Set {
    pop.update_match_flags(x);
    let mut members: Vec<ClId> = pop
        .iter()
        .filter(|(_, classifier)| classifier.matched)
        .map(|(id, _)| id)
        .collect();

    while members.len() < params.theta_mna {
        debug!(
            coverage = members.len(),
            required = params.theta_mna,
            "covering input"
        );
        let classifier = Classifier::covering(params, x, time, rng);
        if pop.num_sum() as usize + 1 > params.pop_size {
            while pop.num_sum() as usize + 1 > params.pop_size {
                crate::ea::delete_one(params, pop, rng);
            }
            members.retain(|&id| pop.contains(id) && pop.get(id).matched);
        }
        members.push(pop.insert(classifier));
    }

    assert!(!members.is_empty(), "match set empty after covering");
    Set { members }
}

/// Builds the match set for `x` without covering; may be empty.
pub fn match_set_no_cover(pop: &mut Population, x: ArrayView1<f64>) -> Set {
    pop.update_match_flags(x);
    let members = pop
        .iter()
        .filter(|(_, classifier)| classifier.matched)
        .map(|(id, _)| id)
        .collect();
    Set { members }
}

/// Fitness-weighted aggregate prediction over the set. Each member's own
/// prediction is pushed into `member_outputs` so the update pass can reuse
/// it without a second forward pass.
pub fn aggregate_prediction(
    pop: &mut Population,
    set: &Set,
    x: ArrayView1<f64>,
    y_dim: usize,
    member_outputs: &mut Vec<Array1<f64>>,
) -> Array1<f64> {
    assert!(!set.is_empty(), "prediction requested over an empty set");
    member_outputs.clear();
    let mut weighted = Array1::zeros(y_dim);
    let mut fitness_sum = 0.0;
    let mut buffer = Array1::zeros(y_dim);
    for &id in set.members() {
        let classifier = pop.get_mut(id);
        classifier.prediction.compute(x, &mut buffer);
        weighted.scaled_add(classifier.fitness, &buffer);
        fitness_sum += classifier.fitness;
        member_outputs.push(buffer.clone());
    }
    assert!(
        fitness_sum > 0.0,
        "fitness sum collapsed to zero during aggregation"
    );
    weighted / fitness_sum
}

/// The online update pass over M after the target is observed: experience,
/// set-size and error estimates (running mean early, Widrow–Hoff once
/// experience exceeds 1/β), the prediction's own update, and finally the
/// accuracy-normalized fitness sharing.
pub fn update_set(
    params: &Params,
    pop: &mut Population,
    set: &Set,
    x: ArrayView1<f64>,
    y: ArrayView1<f64>,
    member_outputs: &[Array1<f64>],
) {
    debug_assert_eq!(member_outputs.len(), set.len());
    let set_num = set.num_sum(pop) as f64;

    for (output, &id) in member_outputs.iter().zip(set.members()) {
        let classifier = pop.get_mut(id);
        classifier.experience += 1;
        let experience = classifier.experience as f64;
        let error = params.loss.compute(output.view(), y);
        if experience * params.beta < 1.0 {
            classifier.set_size += (set_num - classifier.set_size) / experience;
            classifier.error += (error - classifier.error) / experience;
        } else {
            classifier.set_size += params.beta * (set_num - classifier.set_size);
            classifier.error += params.beta * (error - classifier.error);
        }
        classifier.prediction.update(x, y);
    }

    let mut accuracy_sum = 0.0;
    let mut accuracies = Vec::with_capacity(set.len());
    for &id in set.members() {
        let classifier = pop.get(id);
        let accuracy = classifier.accuracy(params);
        accuracy_sum += accuracy * classifier.numerosity as f64;
        accuracies.push(accuracy);
    }
    for (&id, accuracy) in set.members().iter().zip(accuracies) {
        let classifier = pop.get_mut(id);
        let share = accuracy * classifier.numerosity as f64 / accuracy_sum;
        classifier.fitness += params.beta * (share - classifier.fitness);
        debug_assert!(classifier.fitness > 0.0);
    }
}
