use partint::{MulOp, PartedMul};
use rand_xoshiro::{rand_core::{RngCore, SeedableRng}, Xoshiro128StarStar};

use crate::fuzz::mask;

const OPS: [MulOp; 4] = [
    MulOp::Low,
    MulOp::SignedHigh,
    MulOp::SignedUnsignedHigh,
    MulOp::UnsignedHigh,
];

/// The full double-width product of one `w`-bit lane, modulo `2^(2 * w)`,
/// under the op's operand signedness
fn ref_lane_product(la: u64, lb: u64, w: usize, op: MulOp) -> u128 {
    let sext = |x: u64| -> i128 {
        if (x >> (w - 1)) & 1 == 1 {
            x as i128 - (1i128 << w)
        } else {
            x as i128
        }
    };
    let (xa, xb) = match op {
        MulOp::Low | MulOp::SignedHigh => (sext(la), sext(lb)),
        MulOp::SignedUnsignedHigh => (sext(la), i128::from(lb)),
        MulOp::UnsignedHigh => (i128::from(la), i128::from(lb)),
    };
    (xa.wrapping_mul(xb) as u128) & mask(2 * w)
}

/// Fuzzes random lane configurations and per-lane ops: each lane of the
/// output and of the 128-bit intermediate must equal the independent product
/// of that lane's operands, with zero contribution from any other lane.
pub fn lane_isolation(n: u32, seed: u64, register_levels: &[usize]) {
    let mut rng = Xoshiro128StarStar::seed_from_u64(seed);
    let mut m = PartedMul::new(register_levels).unwrap();
    for _ in 0..n {
        for i in 1..8 {
            m.set_point(i * 8, rng.next_u32() & 1 == 1).unwrap();
        }
        let points = m.partition_points().clone();
        let mut ops = [MulOp::Low; 8];
        for (lo, hi) in points.lanes(64) {
            let op = OPS[(rng.next_u32() % 4) as usize];
            for byte in (lo / 8)..(hi / 8) {
                ops[byte] = op;
            }
        }
        m.set_ops(ops);
        let a = rng.next_u64();
        let b = rng.next_u64();
        let (output, intermediate) = m.mul_wide(a, b).unwrap();
        for (lo, hi) in points.lanes(64) {
            let w = hi - lo;
            let op = ops[lo / 8];
            let la = (a >> lo) & (mask(w) as u64);
            let lb = (b >> lo) & (mask(w) as u64);
            let full = ref_lane_product(la, lb, w, op);
            assert_eq!((intermediate >> (2 * lo)) & mask(2 * w), full);
            let half = match op {
                MulOp::Low => full,
                _ => full >> w,
            };
            assert_eq!(
                u128::from((output >> lo) & (mask(w) as u64)),
                half & mask(w)
            );
        }
    }
}
