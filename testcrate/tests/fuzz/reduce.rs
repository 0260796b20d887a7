use partint::AddReduce;
use rand_xoshiro::{rand_core::{RngCore, SeedableRng}, Xoshiro128StarStar};

use crate::fuzz::{rand_points, rand_word, ref_lane_sum, reroll_enables};

/// Fuzzes one reduction shape under several register-level placements: the
/// result must equal the partition-aware sum of the terms for every
/// placement, and the latched trace must have one entry per configured
/// level.
pub fn reduction_invariance(n: u32, seed: u64, width: usize, input_count: usize) {
    let mut rng = Xoshiro128StarStar::seed_from_u64(seed);
    let shape = rand_points(&mut rng, width);
    let max_level = AddReduce::get_max_level(input_count);

    let mut configs: Vec<Vec<usize>> = vec![Vec::new(), (0..=max_level).collect()];
    for _ in 0..2 {
        let config = (0..=max_level)
            .filter(|_| rng.next_u32() & 1 == 1)
            .collect();
        configs.push(config);
    }
    let reducers: Vec<AddReduce> = configs
        .iter()
        .map(|config| AddReduce::new(input_count, width, config, &shape).unwrap())
        .collect();

    let mut points = shape.clone();
    let mut terms = vec![0u128; input_count];
    for _ in 0..n {
        reroll_enables(&mut rng, &mut points);
        for term in &mut terms {
            *term = rand_word(&mut rng, width);
        }
        let expected = ref_lane_sum(width, &terms, &points);
        for reducer in &reducers {
            let (output, trace) = reducer.reduce_traced(&terms, &points).unwrap();
            assert_eq!(output, expected);
            assert_eq!(trace.len(), reducer.latency());
        }
    }
}
