use partint::PartitionPoints;
use rand_xoshiro::{rand_core::RngCore, Xoshiro128StarStar};

mod divide;
mod mul;
mod reduce;

pub use adder::partition_transparency;
pub use divide::{signed_vs_oracle, unsigned_vs_oracle};
pub use mul::lane_isolation;
pub use reduce::reduction_invariance;

pub fn mask(width: usize) -> u128 {
    if width >= 128 {
        u128::MAX
    } else {
        (1u128 << width) - 1
    }
}

/// Random `width`-bit operand
pub fn rand_word(rng: &mut Xoshiro128StarStar, width: usize) -> u128 {
    let x = (u128::from(rng.next_u64()) << 64) | u128::from(rng.next_u64());
    x & mask(width)
}

/// A random offset shape over `1..width`, roughly one point per 8 bits,
/// with random enables
pub fn rand_points(rng: &mut Xoshiro128StarStar, width: usize) -> PartitionPoints {
    let mut points = Vec::new();
    for offset in 1..width {
        if rng.next_u32() % 8 == 0 {
            points.push((offset, rng.next_u32() & 1 == 1));
        }
    }
    PartitionPoints::new(points).unwrap()
}

/// Rerolls every enable of `points`
pub fn reroll_enables(rng: &mut Xoshiro128StarStar, points: &mut PartitionPoints) {
    let offsets: Vec<usize> = points.offsets().collect();
    for offset in offsets {
        points.set(offset, rng.next_u32() & 1 == 1).unwrap();
    }
}

/// One lane of the reference add: `(sum, carry_out)` at `w` bits
pub fn lane_add(la: u128, lb: u128, w: usize) -> (u128, bool) {
    if w == 128 {
        la.overflowing_add(lb)
    } else {
        let t = la + lb;
        (t & mask(w), (t >> w) != 0)
    }
}

/// Reference partition-aware sum: each lane accumulates its slice of every
/// term modulo the lane width, independently of all other lanes
pub fn ref_lane_sum(width: usize, terms: &[u128], points: &PartitionPoints) -> u128 {
    let mut out = 0u128;
    for (lo, hi) in points.lanes(width) {
        let w = hi - lo;
        let mut acc = 0u128;
        for term in terms {
            let (next, _) = lane_add(acc, (term >> lo) & mask(w), w);
            acc = next;
        }
        out |= acc << lo;
    }
    out
}
