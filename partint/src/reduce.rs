use core::{iter::StepBy, ops::Range};

use alloc::vec::Vec;

use crate::{masked_full_adder, width_mask, PartitionPoints, PartitionedAdder};

/// Terms consumed by one carry-save compressor
pub const FULL_ADDER_INPUT_COUNT: usize = 3;

/// Partition-aware carry-save reduction tree.
///
/// Sums a fixed number of `output_width`-bit terms into one partition-aware
/// total. Each tree level replaces every group of 3 terms with 2 (the
/// bitwise sum and the shifted, mask-blocked carry of a [masked_full_adder]),
/// deferring carry propagation until a final [PartitionedAdder] combines the
/// last 2 terms. Carries are blocked at enabled partition points at every
/// level, so lanes stay independent even inside the tree.
///
/// `register_levels` marks tree levels after which the intermediate terms
/// are latched: a pipeline boundary adding one unit of latency. Level 0
/// latches the truncated inputs, level `k > 0` latches the terms produced by
/// the `k`-th compressor level. Register placement never changes the numeric
/// result.
#[derive(Debug, Clone)]
pub struct AddReduce {
    input_count: usize,
    output_width: usize,
    register_levels: Vec<usize>,
    shape: PartitionPoints,
    final_adder: PartitionedAdder,
}

impl AddReduce {
    /// Creates an `AddReduce` summing exactly `input_count` terms of
    /// `output_width` bits. Returns `None` if `output_width` is 0 or greater
    /// than 128, if an offset of `partition_points` does not fit in
    /// `output_width`, or if a register level exceeds
    /// [AddReduce::get_max_level] of `input_count`.
    pub fn new(
        input_count: usize,
        output_width: usize,
        register_levels: &[usize],
        partition_points: &PartitionPoints,
    ) -> Option<Self> {
        let max_level = Self::get_max_level(input_count);
        for &level in register_levels {
            if level > max_level {
                return None
            }
        }
        // a set of levels: a latch exists at a level or it does not
        let mut register_levels = register_levels.to_vec();
        register_levels.sort_unstable();
        register_levels.dedup();
        let final_adder = PartitionedAdder::new(output_width, partition_points)?;
        Some(Self {
            input_count,
            output_width,
            register_levels,
            shape: partition_points.like(),
            final_adder,
        })
    }

    /// The number of compressor levels needed before `input_count` terms are
    /// reduced to at most 2. All register levels must be at most this.
    pub const fn get_max_level(input_count: usize) -> usize {
        let mut n = input_count;
        let mut level = 0;
        loop {
            let groups = n / FULL_ADDER_INPUT_COUNT;
            if groups == 0 {
                return level
            }
            n = (n % FULL_ADDER_INPUT_COUNT) + 2 * groups;
            level += 1;
        }
    }

    /// The term indices at which a full adder group starts for one level
    /// over `input_count` terms; 1 or 2 trailing terms fall outside every
    /// group and pass through the level unchanged.
    pub fn full_adder_groups(input_count: usize) -> StepBy<Range<usize>> {
        (0..input_count.saturating_sub(FULL_ADDER_INPUT_COUNT - 1)).step_by(FULL_ADDER_INPUT_COUNT)
    }

    /// The register levels a sub-tree below one compressor level would
    /// receive: every configured level minus one, dropping level 0.
    pub fn next_register_levels(&self) -> impl Iterator<Item = usize> + '_ {
        self.register_levels
            .iter()
            .filter(|&&level| level > 0)
            .map(|&level| level - 1)
    }

    /// Pipeline latency in latches: the number of configured register levels
    pub fn latency(&self) -> usize {
        self.register_levels.len()
    }

    pub fn input_count(&self) -> usize {
        self.input_count
    }

    pub fn output_width(&self) -> usize {
        self.output_width
    }

    pub fn register_levels(&self) -> &[usize] {
        &self.register_levels
    }

    /// Reduces `terms` under the enables of `points` to the partition-aware
    /// sum of all terms. Returns `None` if `terms.len()` differs from the
    /// constructed input count or `points` does not match the constructed
    /// offset set.
    pub fn reduce(&self, terms: &[u128], points: &PartitionPoints) -> Option<u128> {
        self.reduce_inner(terms, points, None)
    }

    /// Like [AddReduce::reduce], but also returns the term vectors latched
    /// at each configured register level, in level order. The trace length
    /// always equals [AddReduce::latency].
    pub fn reduce_traced(
        &self,
        terms: &[u128],
        points: &PartitionPoints,
    ) -> Option<(u128, Vec<Vec<u128>>)> {
        let mut trace = Vec::new();
        let output = self.reduce_inner(terms, points, Some(&mut trace))?;
        Some((output, trace))
    }

    fn reduce_inner(
        &self,
        terms: &[u128],
        points: &PartitionPoints,
        mut trace: Option<&mut Vec<Vec<u128>>>,
    ) -> Option<u128> {
        if terms.len() != self.input_count || !self.shape.same_shape(points) {
            return None
        }
        let wmask = width_mask(self.output_width);
        let part_mask = points.as_mask(self.output_width);
        let mut terms: Vec<u128> = terms.iter().map(|term| term & wmask).collect();
        let latch = |level: usize, terms: &[u128], trace: &mut Option<&mut Vec<Vec<u128>>>| {
            if let Some(trace) = trace {
                if self.register_levels.contains(&level) {
                    trace.push(terms.to_vec());
                }
            }
        };
        // level 0 latches the truncated inputs
        latch(0, &terms, &mut trace);
        let mut level = 0;
        loop {
            let groups = Self::full_adder_groups(terms.len());
            if groups.len() == 0 {
                break
            }
            // each group of 3 terms shrinks to a sum term and a carry term,
            // with carries blocked at enabled partition points
            let mut next = Vec::with_capacity(2 * groups.len() + 2);
            for i in groups {
                let (sum, mcarry) =
                    masked_full_adder(part_mask, terms[i], terms[i + 1], terms[i + 2]);
                next.push(sum);
                next.push(mcarry);
            }
            // 1 or 2 leftover terms pass through to the next level; a half
            // adder for 2 would still leave 2 terms and only cost gates
            match terms.len() % FULL_ADDER_INPUT_COUNT {
                1 => next.push(terms[terms.len() - 1]),
                2 => {
                    next.push(terms[terms.len() - 2]);
                    next.push(terms[terms.len() - 1]);
                }
                _ => (),
            }
            terms = next;
            level += 1;
            latch(level, &terms, &mut trace);
        }
        match terms.len() {
            0 => Some(0),
            1 => Some(terms[0]),
            2 => {
                let (sum, _) = self.final_adder.add(terms[0], terms[1], points)?;
                Some(sum)
            }
            _ => None,
        }
    }
}
