use alloc::vec::Vec;

use crate::{width_mask, AddReduce, PartitionPoints};

/// Byte-pair partial products plus the four signed-correction terms
const TERM_COUNT: usize = 8 * 8 + 4;

/// Per-lane multiplication operation, mirroring the RISC-V M extension.
///
/// The operation for a lane is selected by assigning the same op to every
/// byte of the lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MulOp {
    /// The LSB half of the product, `mul`
    Low,
    /// The MSB half with both operands signed, `mulh`
    SignedHigh,
    /// The MSB half with `a` signed and `b` unsigned, `mulhsu`
    SignedUnsignedHigh,
    /// The MSB half with both operands unsigned, `mulhu`
    UnsignedHigh,
}

impl MulOp {
    const fn a_signed(self) -> bool {
        !matches!(self, MulOp::UnsignedHigh)
    }

    const fn b_signed(self) -> bool {
        matches!(self, MulOp::Low | MulOp::SignedHigh)
    }

    const fn is_high(self) -> bool {
        !matches!(self, MulOp::Low)
    }
}

/// Partitioned 8/16/32/64-bit integer multiplier.
///
/// Multiplies two 64-bit operands logically partitioned into independent
/// lanes on naturally aligned byte-granularity boundaries (any combination
/// of 8, 16, 32, and 64-bit lanes, selectable at runtime), producing the
/// per-lane products packed into one word through a single shared datapath.
///
/// Every byte pair `(i, j)` of the operands forms an 8x8 partial product
/// shifted to bit `8 * (i + j)`; a partial product is enabled only when both
/// bytes belong to the same lane under the current partition enables, so one
/// lane's partial products never pollute another's result. Four more terms
/// correct negative signed lanes. Everything is summed by an [AddReduce]
/// over the 128-bit intermediate with the partition points scaled by two,
/// and the output selects the low or high half of each lane's product per
/// the lane's [MulOp].
#[derive(Debug, Clone)]
pub struct PartedMul {
    part_pts: PartitionPoints,
    part_ops: [MulOp; 8],
    reduce: AddReduce,
}

impl PartedMul {
    /// Creates a multiplier with partition points at offsets 8, 16, ..., 56
    /// (all disabled: one 64-bit lane) and every byte op set to
    /// [MulOp::Low]. `register_levels` selects the pipeline latches of the
    /// internal reduction tree; `None` if a level exceeds the tree depth.
    pub fn new(register_levels: &[usize]) -> Option<Self> {
        let part_pts = PartitionPoints::new((1..8).map(|i| (i * 8, false)))?;
        let expanded = part_pts.scaled(2)?;
        let reduce = AddReduce::new(TERM_COUNT, 128, register_levels, &expanded)?;
        Some(Self {
            part_pts,
            part_ops: [MulOp::Low; 8],
            reduce,
        })
    }

    /// The current partition points (offsets 8, 16, ..., 56)
    pub fn partition_points(&self) -> &PartitionPoints {
        &self.part_pts
    }

    /// Copies the partition enables from `rhs`, which must have the byte
    /// boundary offset set 8, 16, ..., 56.
    pub fn set_partition(&mut self, rhs: &PartitionPoints) -> Option<()> {
        self.part_pts.eq_assign(rhs)
    }

    /// Sets the enable of the partition point at `offset`
    pub fn set_point(&mut self, offset: usize, enable: bool) -> Option<()> {
        self.part_pts.set(offset, enable)
    }

    /// Configures uniform lanes of `lane_width` bits; `lane_width` must be
    /// 8, 16, 32, or 64.
    pub fn set_uniform_lanes(&mut self, lane_width: usize) -> Option<()> {
        if !matches!(lane_width, 8 | 16 | 32 | 64) {
            return None
        }
        // a point splits lanes exactly when it sits on a lane boundary
        for i in 1..8 {
            self.part_pts.set(i * 8, (i * 8) % lane_width == 0)?;
        }
        Some(())
    }

    /// Sets the operation for byte `index` (0..8)
    pub fn set_op(&mut self, index: usize, op: MulOp) -> Option<()> {
        *self.part_ops.get_mut(index)? = op;
        Some(())
    }

    /// Sets the operation for every byte
    pub fn set_ops(&mut self, ops: [MulOp; 8]) {
        self.part_ops = ops;
    }

    pub fn ops(&self) -> &[MulOp; 8] {
        &self.part_ops
    }

    /// Pipeline latency of the internal reduction tree
    pub fn latency(&self) -> usize {
        self.reduce.latency()
    }

    /// The partition enable directly above byte `index`; byte 7 borders the
    /// word edge, which always counts as a boundary. `None` for
    /// `index >= 8`.
    pub fn part_byte(&self, index: usize) -> Option<bool> {
        if index >= 8 {
            return None
        }
        if index == 7 {
            return Some(true)
        }
        self.part_pts.get((index + 1) * 8)
    }

    /// Multiplies `a` by `b` under the current partition and op
    /// configuration
    pub fn mul(&self, a: u64, b: u64) -> Option<u64> {
        self.mul_wide(a, b).map(|(output, _)| output)
    }

    /// Like [PartedMul::mul], but also returns the 128-bit intermediate
    /// holding every lane's full double-width product.
    pub fn mul_wide(&self, a: u64, b: u64) -> Option<(u64, u128)> {
        let mut terms = Vec::with_capacity(TERM_COUNT);
        // byte-pair partial products, zeroed when an enabled partition point
        // lies strictly between the two bytes
        for a_index in 0..8 {
            for b_index in 0..8 {
                let min_index = a_index.min(b_index);
                let max_index = a_index.max(b_index);
                let mut crosses = false;
                for i in min_index..max_index {
                    if self.part_byte(i)? {
                        crosses = true;
                    }
                }
                let term = if crosses {
                    0
                } else {
                    let pa = (a >> (8 * a_index)) & 0xFF;
                    let pb = (b >> (8 * b_index)) & 0xFF;
                    u128::from(pa * pb) << (8 * (a_index + b_index))
                };
                terms.push(term);
            }
        }
        // signed corrections: a negative signed lane of one operand adds
        // `(!other + 1) << w` into the upper half of the lane's product
        // slot. The four accumulated terms are disjoint across lanes, so
        // they fold into the tree as fixed extra inputs.
        let mut not_a_term = 0u128;
        let mut neg_lsb_a_term = 0u128;
        let mut not_b_term = 0u128;
        let mut neg_lsb_b_term = 0u128;
        for (lo, hi) in self.part_pts.lanes(64) {
            let w = hi - lo;
            let op = self.part_ops[lo / 8];
            let lmask = width_mask(w) as u64;
            let la = (a >> lo) & lmask;
            let lb = (b >> lo) & lmask;
            // lane product slot starts at bit 2 * lo of the intermediate
            let upper = 2 * lo + w;
            if op.a_signed() && (la >> (w - 1)) & 1 == 1 {
                not_a_term |= u128::from(!lb & lmask) << upper;
                neg_lsb_a_term |= 1u128 << upper;
            }
            if op.b_signed() && (lb >> (w - 1)) & 1 == 1 {
                not_b_term |= u128::from(!la & lmask) << upper;
                neg_lsb_b_term |= 1u128 << upper;
            }
        }
        terms.push(not_a_term);
        terms.push(neg_lsb_a_term);
        terms.push(not_b_term);
        terms.push(neg_lsb_b_term);
        let expanded = self.part_pts.scaled(2)?;
        let intermediate = self.reduce.reduce(&terms, &expanded)?;
        let mut output = 0u64;
        for (lo, hi) in self.part_pts.lanes(64) {
            let w = hi - lo;
            let op = self.part_ops[lo / 8];
            let shift = if op.is_high() { 2 * lo + w } else { 2 * lo };
            let lane = ((intermediate >> shift) & width_mask(w)) as u64;
            output |= lane << lo;
        }
        Some((output, intermediate))
    }
}
