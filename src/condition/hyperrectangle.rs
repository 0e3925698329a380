//! Real-interval hyperrectangle condition.
//!
//! The payload is a center and a spread per input dimension; a classifier
//! matches when every input component lies within `center ± spread`. This is
//! the reference interval representation: cheap to match, easy to reason
//! about for subsumption, and the usual baseline for regression problems.
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::params::Params;
use crate::random::RandomGenerator;
use crate::sam::{SamMethod, sam_adapt, sam_init};

/// Slot 0 adapts the mutation probability, slot 1 the mutation step.
const SAM_SLOTS: [SamMethod; 2] = [SamMethod::RateSelect, SamMethod::LogNormal];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperrectangle {
    pub(crate) center: Array1<f64>,
    pub(crate) spread: Array1<f64>,
    mu: Vec<f64>,
}

impl Hyperrectangle {
    /// A uniformly random interval per dimension within the condition bounds.
    pub fn random(params: &Params, rng: &mut impl RandomGenerator) -> Self {
        let d = params.x_dim;
        let mut center = Array1::zeros(d);
        let mut spread = Array1::zeros(d);
        for i in 0..d {
            let a = rng.gen_range_f64(params.cond_min, params.cond_max);
            let b = rng.gen_range_f64(params.cond_min, params.cond_max);
            let (lower, upper) = if a <= b { (a, b) } else { (b, a) };
            center[i] = (lower + upper) * 0.5;
            spread[i] = (upper - lower) * 0.5;
        }
        Self {
            center,
            spread,
            mu: sam_init(&SAM_SLOTS, params.num_sam, rng),
        }
    }

    /// An interval guaranteed to match `x`: each bound is pushed away from
    /// the input by a uniform draw in `[0, s_mutation)`, then clamped into
    /// the condition range and reordered.
    pub fn covering(params: &Params, x: ArrayView1<f64>, rng: &mut impl RandomGenerator) -> Self {
        let d = params.x_dim;
        let mut center = Array1::zeros(d);
        let mut spread = Array1::zeros(d);
        for i in 0..d {
            let mut lower =
                (x[i] - rng.gen_range_f64(0.0, params.s_mutation)).clamp(params.cond_min, params.cond_max);
            let mut upper =
                (x[i] + rng.gen_range_f64(0.0, params.s_mutation)).clamp(params.cond_min, params.cond_max);
            if lower > upper {
                std::mem::swap(&mut lower, &mut upper);
            }
            center[i] = (lower + upper) * 0.5;
            spread[i] = (upper - lower) * 0.5;
        }
        Self {
            center,
            spread,
            mu: sam_init(&SAM_SLOTS, params.num_sam, rng),
        }
    }

    pub fn matches(&self, x: ArrayView1<f64>) -> bool {
        x.iter()
            .zip(self.center.iter().zip(self.spread.iter()))
            .all(|(&xi, (&c, &s))| (xi - c).abs() <= s)
    }

    /// Per-component uniform perturbation of centers and spreads, gated by
    /// the mutation probability. Rates come from the self-adaptive vector
    /// when present, otherwise from the base parameters.
    pub fn mutate(&mut self, params: &Params, rng: &mut impl RandomGenerator) -> bool {
        sam_adapt(&mut self.mu, &SAM_SLOTS, rng);
        let p = self.mu.first().copied().unwrap_or(params.p_mutation);
        let step = self.mu.get(1).copied().unwrap_or(params.s_mutation);
        let mut changed = false;
        let max_spread = params.cond_max - params.cond_min;
        for i in 0..self.center.len() {
            if rng.gen_bool(p) {
                self.center[i] += rng.gen_range_f64(-step, step);
                changed = true;
            }
            if rng.gen_bool(p) {
                self.spread[i] += rng.gen_range_f64(-step, step);
                changed = true;
            }
            self.center[i] = self.center[i].clamp(params.cond_min, params.cond_max);
            self.spread[i] = self.spread[i].clamp(0.0, max_spread);
        }
        changed
    }

    /// Two-point crossover over the flattened center/spread sequence.
    /// The swap is committed on both parents; true iff any component moved.
    pub fn crossover(
        &mut self,
        other: &mut Hyperrectangle,
        params: &Params,
        rng: &mut impl RandomGenerator,
    ) -> bool {
        if rng.gen_probability() >= params.p_crossover {
            return false;
        }
        let len = self.center.len() * 2;
        let mut p1 = rng.gen_range_usize(0, len);
        let mut p2 = rng.gen_range_usize(0, len) + 1;
        if p1 > p2 {
            std::mem::swap(&mut p1, &mut p2);
        } else if p1 == p2 {
            p2 += 1;
        }
        let mut changed = false;
        for i in p1..p2 {
            let (a, b) = if i % 2 == 0 {
                (&mut self.center[i / 2], &mut other.center[i / 2])
            } else {
                (&mut self.spread[i / 2], &mut other.spread[i / 2])
            };
            if a != b {
                std::mem::swap(a, b);
                changed = true;
            }
        }
        changed
    }

    /// Containment in every dimension.
    pub fn subsumes(&self, other: &Hyperrectangle) -> bool {
        for i in 0..self.center.len() {
            if self.center[i] - self.spread[i] > other.center[i] - other.spread[i]
                || self.center[i] + self.spread[i] < other.center[i] + other.spread[i]
            {
                return false;
            }
        }
        true
    }

    /// Compares summed interval widths over the valid condition range.
    pub fn is_more_general(&self, other: &Hyperrectangle, params: &Params) -> bool {
        self.generality(params) > other.generality(params)
    }

    fn generality(&self, params: &Params) -> f64 {
        let max_width = self.center.len() as f64 * (params.cond_max - params.cond_min);
        let total: f64 = self
            .center
            .iter()
            .zip(self.spread.iter())
            .map(|(&c, &s)| {
                let lower = (c - s).max(params.cond_min);
                let upper = (c + s).min(params.cond_max);
                upper - lower
            })
            .sum();
        total / max_width
    }

    pub fn size(&self) -> usize {
        self.center.len()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamsBuilder;
    use crate::random::{RandomGenerator, TestDummyRng, XcsfRandomGenerator};
    use ndarray::array;

    fn params(d: usize) -> Params {
        ParamsBuilder::default()
            .x_dim(d)
            .y_dim(1)
            .s_mutation(1.0)
            .build()
            .unwrap()
    }

    fn rect(center: Array1<f64>, spread: Array1<f64>) -> Hyperrectangle {
        Hyperrectangle {
            center,
            spread,
            mu: vec![],
        }
    }

    #[test]
    fn test_match_reference_vectors() {
        let x = array![0.8455260670, 0.7566081103, 0.3125093674, 0.3449376898, 0.3677518467];

        let matching = rect(
            array![0.6917788795, 0.7276272381, 0.2457498699, 0.2704867908, 0.0],
            array![0.5881265924, 0.8586376463, 0.2309959724, 0.5802303236, 0.9674486498],
        );
        assert!(matching.matches(x.view()));

        let missing = rect(
            array![0.8992419107, 0.5587937197, 0.6346787906, 0.0464343089, 0.4214295062],
            array![0.9658827122, 0.7107445754, 0.7048862747, 0.1036188594, 0.4501471722],
        );
        assert!(!missing.matches(x.view()));
    }

    #[test]
    fn test_generality_reference_vectors() {
        let params = params(5);
        let wide = rect(
            array![0.6917788795, 0.7276272381, 0.2457498699, 0.2704867908, 0.0],
            array![0.5881265924, 0.8586376463, 0.2309959724, 0.5802303236, 0.9674486498],
        );
        let narrow = rect(
            array![0.6, 0.7, 0.2, 0.3, 0.0],
            array![0.1, 0.1, 0.1, 0.1, 0.1],
        );
        assert!(wide.is_more_general(&narrow, &params));
        assert!(!narrow.is_more_general(&wide, &params));
    }

    #[test]
    fn test_cover_matches_its_input() {
        let params = params(4);
        let mut rng = XcsfRandomGenerator::new_from_seed(Some(5));
        for _ in 0..50 {
            let x = array![
                rng.gen_probability(),
                rng.gen_probability(),
                rng.gen_probability(),
                rng.gen_probability()
            ];
            let cond = Hyperrectangle::covering(&params, x.view(), &mut rng);
            assert!(cond.matches(x.view()), "covering produced a non-match");
        }
    }

    #[test]
    fn test_mutate_monotonicity() {
        let mut rng = XcsfRandomGenerator::new_from_seed(Some(6));
        let frozen = ParamsBuilder::default()
            .x_dim(3)
            .y_dim(1)
            .p_mutation(0.0)
            .build()
            .unwrap();
        let always = ParamsBuilder::default()
            .x_dim(3)
            .y_dim(1)
            .p_mutation(1.0)
            .build()
            .unwrap();

        let mut cond = Hyperrectangle::random(&frozen, &mut rng);
        let original = cond.clone();
        assert!(!cond.mutate(&frozen, &mut rng));
        assert_eq!(cond, original);

        assert!(cond.mutate(&always, &mut rng));
        assert_ne!(cond, original);
    }

    #[test]
    fn test_mutate_preserves_bounds() {
        let params = params(3);
        let mut rng = XcsfRandomGenerator::new_from_seed(Some(7));
        let mut cond = Hyperrectangle::random(&params, &mut rng);
        for _ in 0..100 {
            cond.mutate(&params, &mut rng);
            for i in 0..3 {
                assert!(cond.spread[i] >= 0.0);
                assert!(cond.center[i] >= params.cond_min && cond.center[i] <= params.cond_max);
            }
        }
    }

    /// Fake RNG scripting the crossover gate and the two cut points.
    struct FakeCrossoverRng {
        cuts: Vec<usize>,
        idx: usize,
        dummy: TestDummyRng,
    }

    impl FakeCrossoverRng {
        fn new(cuts: Vec<usize>) -> Self {
            Self {
                cuts,
                idx: 0,
                dummy: TestDummyRng,
            }
        }
    }

    impl RandomGenerator for FakeCrossoverRng {
        type R = TestDummyRng;
        fn rng(&mut self) -> &mut TestDummyRng {
            &mut self.dummy
        }
        fn gen_probability(&mut self) -> f64 {
            0.0
        }
        fn gen_range_usize(&mut self, _min: usize, _max: usize) -> usize {
            let val = self.cuts[self.idx];
            self.idx += 1;
            val
        }
    }

    #[test]
    fn test_two_point_crossover_controlled() {
        let params = params(2);
        let mut a = rect(array![0.1, 0.2], array![0.01, 0.02]);
        let mut b = rect(array![0.8, 0.9], array![0.08, 0.09]);
        // flattened layout is [c0, s0, c1, s1]; cuts 1 and 2 swap slot 1..3
        let mut rng = FakeCrossoverRng::new(vec![1, 2]);
        let changed = a.crossover(&mut b, &params, &mut rng);
        assert!(changed);
        assert_eq!(a, rect(array![0.1, 0.9], array![0.08, 0.02]));
        assert_eq!(b, rect(array![0.8, 0.2], array![0.01, 0.09]));
    }

    #[test]
    fn test_crossover_symmetry_under_seed() {
        let params = params(4);
        let mut seed_rng = XcsfRandomGenerator::new_from_seed(Some(8));
        let a = Hyperrectangle::random(&params, &mut seed_rng);
        let b = Hyperrectangle::random(&params, &mut seed_rng);

        let mut rng1 = XcsfRandomGenerator::new_from_seed(Some(99));
        let (mut a1, mut b1) = (a.clone(), b.clone());
        a1.crossover(&mut b1, &params, &mut rng1);

        let mut rng2 = XcsfRandomGenerator::new_from_seed(Some(99));
        let (mut b2, mut a2) = (b.clone(), a.clone());
        b2.crossover(&mut a2, &params, &mut rng2);

        assert_eq!(a1, a2);
        assert_eq!(b1, b2);
    }

    #[test]
    fn test_subsumption_is_reflexive_and_ordered() {
        let outer = rect(array![0.5, 0.5], array![0.4, 0.4]);
        let inner = rect(array![0.5, 0.6], array![0.1, 0.2]);
        assert!(outer.subsumes(&outer));
        assert!(inner.subsumes(&inner));
        assert!(outer.subsumes(&inner));
        assert!(!inner.subsumes(&outer));
    }
}
