//! # `ea` – Steady-State Evolutionary Algorithm
//!
//! Runs inside the match set whenever enough time has passed since the set's
//! numerosity-weighted mean EA timestamp. Two parents are selected (roulette
//! or tournament), λ offspring are produced by crossover and mutation, and
//! each offspring is either discarded as an identical copy (crediting its
//! parent's numerosity), absorbed by a more general subsumer, or inserted.
//! The population cap is enforced afterwards by vote-based deletion.
//!
//! Each offspring is judged by its *own* mutation flag when deciding whether
//! the pair collapsed into identical copies of the parents.
use ordered_float::OrderedFloat;
use tracing::debug;

use crate::classifier::Classifier;
use crate::params::{EaSelect, Params};
use crate::population::{ClId, Population};
use crate::random::RandomGenerator;
use crate::set::Set;

/// Runs the EA on `set` if the trigger interval has elapsed, then enforces
/// the population cap.
pub fn run_ea(
    params: &Params,
    pop: &mut Population,
    set: &Set,
    time: u64,
    rng: &mut impl RandomGenerator,
) {
    if set.is_empty() {
        return;
    }
    if time as f64 - set.mean_time(pop) <= params.theta_ea as f64 {
        return;
    }
    debug!(time, set_len = set.len(), "EA triggered");
    set.stamp_times(pop, time);

    let parent1 = select(params, pop, set, rng);
    let parent2 = select(params, pop, set, rng);

    for _ in 0..params.lambda / 2 {
        let mut child1 = pop.get(parent1).child(time);
        let mut child2 = pop.get(parent2).child(time);

        let cmod = child1
            .condition
            .crossover(&mut child2.condition, params, rng)
            | child1
                .prediction
                .crossover(&mut child2.prediction, params, rng);
        let m1mod = child1.condition.mutate(params, rng) | child1.prediction.mutate(params, rng);
        let m2mod = child2.condition.mutate(params, rng) | child2.prediction.mutate(params, rng);

        init_offspring(params, pop, parent1, parent2, &mut child1, &mut child2, cmod);
        add_offspring(params, pop, set, parent1, parent2, child1, cmod, m1mod, rng);
        add_offspring(params, pop, set, parent2, parent1, child2, cmod, m2mod, rng);
    }

    enforce_limit(params, pop, rng);
}

fn select(
    params: &Params,
    pop: &Population,
    set: &Set,
    rng: &mut impl RandomGenerator,
) -> ClId {
    match params.ea_select {
        EaSelect::Roulette => select_roulette(pop, set, rng),
        EaSelect::Tournament => select_tournament(params, pop, set, rng),
    }
}

fn select_roulette(pop: &Population, set: &Set, rng: &mut impl RandomGenerator) -> ClId {
    let fitness_sum = set.total_fitness(pop);
    if fitness_sum <= 0.0 || !fitness_sum.is_finite() {
        // degenerate wheel, fall back to a uniform pick
        return *rng.choose(set.members()).expect("selection over an empty set");
    }
    let threshold = rng.gen_range_f64(0.0, fitness_sum);
    let mut acc = 0.0;
    for &id in set.members() {
        acc += pop.get(id).fitness;
        if acc >= threshold {
            return id;
        }
    }
    *set.members().last().expect("selection over an empty set")
}

fn select_tournament(
    params: &Params,
    pop: &Population,
    set: &Set,
    rng: &mut impl RandomGenerator,
) -> ClId {
    loop {
        let winner = set
            .members()
            .iter()
            .copied()
            .filter(|_| rng.gen_probability() < params.ea_select_size)
            .max_by_key(|&id| OrderedFloat(pop.get(id).fitness));
        if let Some(winner) = winner {
            return winner;
        }
    }
}

/// Offspring error/fitness initialization: crossover blends both parents,
/// otherwise each offspring inherits its own parent's dampened values.
#[allow(clippy::too_many_arguments)]
fn init_offspring(
    params: &Params,
    pop: &Population,
    parent1: ClId,
    parent2: ClId,
    child1: &mut Classifier,
    child2: &mut Classifier,
    cmod: bool,
) {
    let p1 = pop.get(parent1);
    let p2 = pop.get(parent2);
    if cmod {
        let error = params.err_reduc * (p1.error + p2.error) * 0.5;
        let fitness = params.fit_reduc
            * 0.5
            * (p1.fitness / p1.numerosity as f64 + p2.fitness / p2.numerosity as f64);
        child1.error = error;
        child2.error = error;
        child1.fitness = fitness;
        child2.fitness = fitness;
    } else {
        child1.error = params.err_reduc * p1.error;
        child1.fitness = params.fit_reduc * (p1.fitness / p1.numerosity as f64);
        child2.error = params.err_reduc * p2.error;
        child2.fitness = params.fit_reduc * (p2.fitness / p2.numerosity as f64);
    }
}

#[allow(clippy::too_many_arguments)]
fn add_offspring(
    params: &Params,
    pop: &mut Population,
    set: &Set,
    parent: ClId,
    other_parent: ClId,
    child: Classifier,
    cmod: bool,
    mmod: bool,
    rng: &mut impl RandomGenerator,
) {
    if !cmod && !mmod {
        // the offspring is an exact copy of its parent
        pop.incr_numerosity(parent);
        return;
    }
    if params.ea_subsumption {
        subsume_or_insert(params, pop, set, parent, other_parent, child, rng);
    } else {
        pop.insert(child);
    }
}

fn subsume_or_insert(
    params: &Params,
    pop: &mut Population,
    set: &Set,
    parent: ClId,
    other_parent: ClId,
    child: Classifier,
    rng: &mut impl RandomGenerator,
) {
    for candidate in [parent, other_parent] {
        let classifier = pop.get(candidate);
        if classifier.is_subsumer(params) && classifier.is_more_general(&child, params) {
            debug!(subsumer = candidate, "offspring subsumed by parent");
            pop.incr_numerosity(candidate);
            return;
        }
    }
    let candidates: Vec<ClId> = set
        .members()
        .iter()
        .copied()
        .filter(|&id| {
            let classifier = pop.get(id);
            classifier.is_subsumer(params) && classifier.is_more_general(&child, params)
        })
        .collect();
    if let Some(&subsumer) = rng.choose(&candidates) {
        debug!(subsumer, "offspring subsumed within the set");
        pop.incr_numerosity(subsumer);
        return;
    }
    pop.insert(child);
}

/// Deletes until the numerosity sum fits the configured cap.
pub fn enforce_limit(params: &Params, pop: &mut Population, rng: &mut impl RandomGenerator) {
    while pop.num_sum() as usize > params.pop_size {
        delete_one(params, pop, rng);
    }
}

/// Removes one unit of numerosity, chosen by roulette over deletion votes;
/// a degenerate wheel falls back to a uniform pick. Records reaching zero
/// numerosity are removed entirely.
pub(crate) fn delete_one(params: &Params, pop: &mut Population, rng: &mut impl RandomGenerator) {
    debug_assert!(!pop.is_empty());
    let mean_fitness = pop.mean_fitness();
    let votes: Vec<(ClId, f64)> = pop
        .iter()
        .map(|(id, classifier)| (id, classifier.deletion_vote(mean_fitness, params)))
        .collect();
    let total: f64 = votes.iter().map(|(_, vote)| vote).sum();

    let victim = if total > 0.0 && total.is_finite() {
        let threshold = rng.gen_range_f64(0.0, total);
        let mut acc = 0.0;
        let mut chosen = votes.last().expect("deletion over an empty population").0;
        for &(id, vote) in &votes {
            acc += vote;
            if acc >= threshold {
                chosen = id;
                break;
            }
        }
        chosen
    } else {
        votes[rng.gen_range_usize(0, votes.len())].0
    };

    if pop.decr_numerosity(victim) == 0 {
        debug!(victim, "deleting classifier record");
        pop.remove(victim);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamsBuilder;
    use crate::prediction::{Constant, Prediction, PredictionKind};
    use crate::random::{RandomGenerator, TestDummyRng, XcsfRandomGenerator};
    use crate::set::Set;
    use ndarray::array;
    use rstest::rstest;

    fn params() -> Params {
        ParamsBuilder::default()
            .x_dim(2)
            .y_dim(1)
            .prediction(PredictionKind::Constant)
            .theta_ea(50)
            .build()
            .unwrap()
    }

    fn member(
        params: &Params,
        rng: &mut XcsfRandomGenerator,
        time: u64,
        fitness: f64,
    ) -> Classifier {
        let x = array![0.5, 0.5];
        let mut classifier = Classifier::covering(params, x.view(), time, rng);
        classifier.prediction = Prediction::Constant(Constant::from_values(array![0.0]));
        classifier.fitness = fitness;
        classifier
    }

    fn seeded_population(
        params: &Params,
        rng: &mut XcsfRandomGenerator,
        n: usize,
        time: u64,
    ) -> (Population, Set) {
        let mut pop = Population::new();
        let members = (0..n)
            .map(|_| pop.insert(member(params, rng, time, 1.0)))
            .collect();
        (pop, Set::from_members(members))
    }

    #[test]
    fn test_trigger_boundary() {
        let params = params();
        let mut rng = XcsfRandomGenerator::new_from_seed(Some(1));
        let (mut pop, set) = seeded_population(&params, &mut rng, 3, 100);

        // exactly theta_ea after the stamps: no trigger
        run_ea(&params, &mut pop, &set, 150, &mut rng);
        assert_eq!(pop.num_sum(), 3);
        assert!(set.members().iter().all(|&id| pop.get(id).time == 100));

        // one past the interval: triggers, stamps every member, adds lambda
        // units of numerosity mass
        run_ea(&params, &mut pop, &set, 151, &mut rng);
        assert_eq!(pop.num_sum(), 3 + params.lambda as u32);
        assert!(set.members().iter().all(|&id| pop.get(id).time == 151));

        // the fresh stamps stop an immediate re-trigger
        run_ea(&params, &mut pop, &set, 151, &mut rng);
        assert_eq!(pop.num_sum(), 3 + params.lambda as u32);
    }

    #[test]
    fn test_roulette_degenerate_wheel_falls_back_to_uniform() {
        let params = params();
        let mut rng = XcsfRandomGenerator::new_from_seed(Some(2));
        let (mut pop, set) = seeded_population(&params, &mut rng, 4, 0);
        for &id in set.members() {
            pop.get_mut(id).fitness = 0.0;
        }
        let chosen = select_roulette(&pop, &set, &mut rng);
        assert!(set.members().contains(&chosen));
    }

    #[test]
    fn test_roulette_prefers_fit_members() {
        let params = params();
        let mut rng = XcsfRandomGenerator::new_from_seed(Some(3));
        let (mut pop, set) = seeded_population(&params, &mut rng, 2, 0);
        pop.get_mut(set.members()[0]).fitness = 1e-9;
        pop.get_mut(set.members()[1]).fitness = 1.0;
        let mut hits = 0;
        for _ in 0..100 {
            if select_roulette(&pop, &set, &mut rng) == set.members()[1] {
                hits += 1;
            }
        }
        assert!(hits > 95, "roulette picked the fit member {hits}/100 times");
    }

    /// Fake RNG admitting every tournament candidate.
    struct AdmitAllRng {
        dummy: TestDummyRng,
    }

    impl RandomGenerator for AdmitAllRng {
        type R = TestDummyRng;
        fn rng(&mut self) -> &mut TestDummyRng {
            &mut self.dummy
        }
        fn gen_probability(&mut self) -> f64 {
            0.0
        }
    }

    #[test]
    fn test_tournament_keeps_best_admitted() {
        let params = ParamsBuilder::default()
            .x_dim(2)
            .y_dim(1)
            .prediction(PredictionKind::Constant)
            .ea_select(EaSelect::Tournament)
            .ea_select_size(1.0)
            .build()
            .unwrap();
        let mut rng = XcsfRandomGenerator::new_from_seed(Some(4));
        let (mut pop, set) = seeded_population(&params, &mut rng, 4, 0);
        pop.get_mut(set.members()[2]).fitness = 5.0;

        let mut fake = AdmitAllRng { dummy: TestDummyRng };
        let winner = select_tournament(&params, &pop, &set, &mut fake);
        assert_eq!(winner, set.members()[2]);
    }

    #[rstest(cmod, case(true), case(false))]
    fn test_offspring_initialization(cmod: bool) {
        let params = params();
        let mut rng = XcsfRandomGenerator::new_from_seed(Some(5));
        let (mut pop, set) = seeded_population(&params, &mut rng, 2, 0);
        let p1 = set.members()[0];
        let p2 = set.members()[1];
        pop.get_mut(p1).error = 0.2;
        pop.get_mut(p1).fitness = 0.4;
        pop.get_mut(p2).error = 0.6;
        pop.get_mut(p2).fitness = 0.8;
        pop.incr_numerosity(p2); // p2 stands for two duplicates

        let mut c1 = pop.get(p1).child(1);
        let mut c2 = pop.get(p2).child(1);
        init_offspring(&params, &pop, p1, p2, &mut c1, &mut c2, cmod);

        if cmod {
            let expected_error = params.err_reduc * 0.4;
            let expected_fitness = params.fit_reduc * 0.5 * (0.4 + 0.8 / 2.0);
            for child in [&c1, &c2] {
                assert!((child.error - expected_error).abs() < 1e-12);
                assert!((child.fitness - expected_fitness).abs() < 1e-12);
            }
        } else {
            assert!((c1.error - params.err_reduc * 0.2).abs() < 1e-12);
            assert!((c1.fitness - params.fit_reduc * 0.4).abs() < 1e-12);
            assert!((c2.error - params.err_reduc * 0.6).abs() < 1e-12);
            assert!((c2.fitness - params.fit_reduc * (0.8 / 2.0)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_identical_offspring_credits_parent() {
        let params = params();
        let mut rng = XcsfRandomGenerator::new_from_seed(Some(6));
        let (mut pop, set) = seeded_population(&params, &mut rng, 2, 0);
        let parent = set.members()[0];
        let child = pop.get(parent).child(1);

        add_offspring(
            &params, &mut pop, &set, parent, set.members()[1], child, false, false, &mut rng,
        );
        assert_eq!(pop.len(), 2);
        assert_eq!(pop.get(parent).numerosity, 2);
        assert_eq!(pop.num_sum(), 3);
    }

    #[test]
    fn test_subsumption_conserves_record_count() {
        let params = ParamsBuilder::default()
            .x_dim(2)
            .y_dim(1)
            .prediction(PredictionKind::Constant)
            .ea_subsumption(true)
            .theta_sub(1)
            .eps_zero(1.0)
            .build()
            .unwrap();
        let mut rng = XcsfRandomGenerator::new_from_seed(Some(7));
        let (mut pop, set) = seeded_population(&params, &mut rng, 2, 0);
        let parent = set.members()[0];
        // make the parent an eligible subsumer with a very general condition
        {
            let classifier = pop.get_mut(parent);
            classifier.experience = 10;
            classifier.error = 0.0;
            classifier.condition = crate::condition::Condition::Hyperrectangle(
                crate::condition::hyperrectangle::tests_support::wide(2),
            );
        }
        // a narrow offspring: subsumable
        let mut child = pop.get(set.members()[1]).child(1);
        child.condition = crate::condition::Condition::Hyperrectangle(
            crate::condition::hyperrectangle::tests_support::narrow(2),
        );

        let num_before = pop.num_sum();
        let len_before = pop.len();
        add_offspring(
            &params, &mut pop, &set, parent, set.members()[1], child, true, true, &mut rng,
        );
        // absorbed: one more unit of mass, no new record
        assert_eq!(pop.len(), len_before);
        assert_eq!(pop.num_sum(), num_before + 1);
        assert_eq!(pop.get(parent).numerosity, 2);
    }

    #[test]
    fn test_unsubsumable_offspring_is_inserted() {
        let params = ParamsBuilder::default()
            .x_dim(2)
            .y_dim(1)
            .prediction(PredictionKind::Constant)
            .ea_subsumption(true)
            .build()
            .unwrap();
        let mut rng = XcsfRandomGenerator::new_from_seed(Some(8));
        let (mut pop, set) = seeded_population(&params, &mut rng, 2, 0);
        // nobody qualifies as a subsumer (zero experience)
        let child = pop.get(set.members()[0]).child(1);

        let len_before = pop.len();
        let num_before = pop.num_sum();
        add_offspring(
            &params, &mut pop, &set, set.members()[0], set.members()[1], child, true, true,
            &mut rng,
        );
        assert_eq!(pop.len(), len_before + 1);
        assert_eq!(pop.num_sum(), num_before + 1);
    }

    #[test]
    fn test_enforce_limit_caps_numerosity_sum() {
        let params = ParamsBuilder::default()
            .x_dim(2)
            .y_dim(1)
            .prediction(PredictionKind::Constant)
            .pop_size(5)
            .build()
            .unwrap();
        let mut rng = XcsfRandomGenerator::new_from_seed(Some(9));
        let mut pop = Population::new();
        for _ in 0..9 {
            pop.insert(member(&params, &mut rng, 0, 1.0));
        }
        enforce_limit(&params, &mut pop, &mut rng);
        assert_eq!(pop.num_sum(), 5);
    }

    #[test]
    fn test_deletion_prefers_weak_experienced_classifiers() {
        let params = ParamsBuilder::default()
            .x_dim(2)
            .y_dim(1)
            .prediction(PredictionKind::Constant)
            .theta_del(5)
            .build()
            .unwrap();
        let mut rng = XcsfRandomGenerator::new_from_seed(Some(10));
        let mut pop = Population::new();
        let strong = pop.insert(member(&params, &mut rng, 0, 1.0));
        let weak = pop.insert(member(&params, &mut rng, 0, 1.0));
        {
            let classifier = pop.get_mut(weak);
            classifier.fitness = 1e-4;
            classifier.experience = 50;
        }

        let mut weak_deleted = 0;
        for _ in 0..50 {
            let mut trial = pop.clone();
            delete_one(&params, &mut trial, &mut rng);
            if !trial.contains(weak) {
                weak_deleted += 1;
            }
        }
        assert!(pop.contains(strong));
        assert!(
            weak_deleted > 45,
            "weak classifier deleted only {weak_deleted}/50 times"
        );
    }
}
