//! # `population` – Owning Classifier Store
//!
//! The population is the only long-lived owning collection: every classifier
//! lives in exactly one slot of the arena below. Handles ([`ClId`]) are slot
//! indices that stay valid while *other* elements are inserted or removed —
//! freed slots go onto a free list and are reused by later insertions. Sets
//! hold these handles without owning anything.
//!
//! The store maintains the population numerosity sum incrementally; a debug
//! assertion cross-checks it against the members whenever a record leaves.
use ndarray::ArrayView1;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::classifier::Classifier;

/// Stable handle to a classifier in the population.
pub type ClId = usize;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Population {
    slots: Vec<Option<Classifier>>,
    free: Vec<usize>,
    num_sum: u32,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records (not numerosity mass).
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Population numerosity sum Σnum.
    pub fn num_sum(&self) -> u32 {
        self.num_sum
    }

    pub fn contains(&self, id: ClId) -> bool {
        self.slots.get(id).is_some_and(Option::is_some)
    }

    pub fn insert(&mut self, classifier: Classifier) -> ClId {
        debug_assert!(classifier.numerosity >= 1);
        self.num_sum += classifier.numerosity;
        match self.free.pop() {
            Some(id) => {
                debug_assert!(self.slots[id].is_none());
                self.slots[id] = Some(classifier);
                id
            }
            None => {
                self.slots.push(Some(classifier));
                self.slots.len() - 1
            }
        }
    }

    pub fn get(&self, id: ClId) -> &Classifier {
        self.slots[id].as_ref().expect("dangling classifier handle")
    }

    pub fn get_mut(&mut self, id: ClId) -> &mut Classifier {
        self.slots[id].as_mut().expect("dangling classifier handle")
    }

    pub fn remove(&mut self, id: ClId) -> Classifier {
        let classifier = self.slots[id].take().expect("dangling classifier handle");
        self.num_sum -= classifier.numerosity;
        self.free.push(id);
        debug_assert_eq!(
            self.num_sum,
            self.iter().map(|(_, c)| c.numerosity).sum::<u32>()
        );
        classifier
    }

    pub fn incr_numerosity(&mut self, id: ClId) {
        self.get_mut(id).numerosity += 1;
        self.num_sum += 1;
    }

    /// Decrements and returns the new numerosity; the caller removes the
    /// record when it reaches zero.
    pub fn decr_numerosity(&mut self, id: ClId) -> u32 {
        let classifier = self.get_mut(id);
        debug_assert!(classifier.numerosity >= 1);
        classifier.numerosity -= 1;
        let remaining = classifier.numerosity;
        self.num_sum -= 1;
        remaining
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClId, &Classifier)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|c| (id, c)))
    }

    pub fn ids(&self) -> impl Iterator<Item = ClId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(id, slot)| slot.as_ref().map(|_| id))
    }

    /// Total fitness mass of the population.
    pub fn total_fitness(&self) -> f64 {
        self.iter().map(|(_, c)| c.fitness).sum()
    }

    /// Numerosity-weighted mean fitness, zero for an empty population.
    pub fn mean_fitness(&self) -> f64 {
        if self.num_sum == 0 {
            0.0
        } else {
            self.total_fitness() / self.num_sum as f64
        }
    }

    /// Recomputes every classifier's cached match flag for `x`. The scan is
    /// data-parallel: each record is touched by exactly one worker and no
    /// randomness is involved.
    pub fn update_match_flags(&mut self, x: ArrayView1<f64>) {
        self.slots.par_iter_mut().for_each(|slot| {
            if let Some(classifier) = slot {
                classifier.matched = classifier.condition.matches(x);
            }
        });
    }
}
