use crate::{width_mask, PartitionPoints};

/// Full adder over whole words: a 3:2 compressor applied bitwise, so one
/// call performs `width` independent single-bit full adds in parallel.
/// Returns `(sum, carry)` where `sum = in0 ^ in1 ^ in2` and `carry` is the
/// per-bit majority. Total on all inputs.
pub const fn full_adder(in0: u128, in1: u128, in2: u128) -> (u128, u128) {
    let sum = in0 ^ in1 ^ in2;
    let carry = (in0 & in1) | (in1 & in2) | (in2 & in0);
    (sum, carry)
}

/// Full adder with the carry output left-shifted into place and ANDed with a
/// carry-keep mask (see [PartitionPoints::as_mask]). The shift happens
/// *before* the mask, so a carry generated just below an enabled partition
/// point is discarded instead of leaking into the next lane.
pub const fn masked_full_adder(mask: u128, in0: u128, in1: u128, in2: u128) -> (u128, u128) {
    let (sum, carry) = full_adder(in0, in1, in2);
    (sum, (carry << 1) & mask)
}

/// Partitioned adder.
///
/// Performs a `width`-bit add that honors the enabled partition points: the
/// word is split at the active offsets, each lane is summed independently
/// with a carry-in of 0, and the lane sums are concatenated in original bit
/// order. A carry out of a lane is never propagated into the next lane; it
/// is reported in a per-lane flag word instead. With no enabled points this
/// is an ordinary `width`-bit wrapping adder with a single carry-out flag.
///
/// The partition points are passed to every [PartitionedAdder::add] call and
/// are only read; the adder itself stores the offset shape it was
/// constructed with so mismatched wiring is rejected.
#[derive(Debug, Clone)]
pub struct PartitionedAdder {
    width: usize,
    shape: PartitionPoints,
}

impl PartitionedAdder {
    /// Creates a `width`-bit adder splittable at the offsets of
    /// `partition_points` (enables are ignored here, they are per-call
    /// inputs). Returns `None` if `width` is 0 or greater than 128, or if
    /// any offset does not fit in `width`.
    pub fn new(width: usize, partition_points: &PartitionPoints) -> Option<Self> {
        if width == 0 || width > 128 || !partition_points.fits_in_width(width) {
            return None
        }
        Some(Self {
            width,
            shape: partition_points.like(),
        })
    }

    /// The bit width of the inputs and output
    pub fn width(&self) -> usize {
        self.width
    }

    /// The offset shape this adder was constructed with
    pub fn partition_points(&self) -> &PartitionPoints {
        &self.shape
    }

    /// Adds `a` and `b` under the enables of `points`. Returns the sum and a
    /// flag word with bit `l` set iff lane `l` (low lane first) overflowed
    /// its width. Returns `None` if `points` does not have the offset set
    /// this adder was constructed with, or if an operand does not fit in the
    /// width.
    pub fn add(&self, a: u128, b: u128, points: &PartitionPoints) -> Option<(u128, u128)> {
        if !self.shape.same_shape(points) {
            return None
        }
        let wmask = width_mask(self.width);
        if (a & !wmask) != 0 || (b & !wmask) != 0 {
            return None
        }
        let mut sum = 0u128;
        let mut carries = 0u128;
        for (lane, (lo, hi)) in points.lanes(self.width).enumerate() {
            let w = hi - lo;
            let lmask = width_mask(w);
            let la = (a >> lo) & lmask;
            let lb = (b >> lo) & lmask;
            let (lsum, cout) = if w == 128 {
                la.overflowing_add(lb)
            } else {
                let t = la + lb;
                (t & lmask, (t >> w) != 0)
            };
            sum |= lsum << lo;
            if cout {
                carries |= 1u128 << lane;
            }
        }
        Some((sum, carries))
    }
}
