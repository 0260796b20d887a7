use partint::{div_rem, DivRem, UnsignedDivRem};
use rand_xoshiro::{rand_core::{RngCore, SeedableRng}, Xoshiro128StarStar};

use crate::fuzz::mask;

/// Fuzzes the staged unsigned engine against the oracle at radices 2..=16,
/// checking the quotient-remainder identity and the exact stage count.
pub fn unsigned_vs_oracle(n: u32, seed: u64, bit_width: usize) {
    let mut rng = Xoshiro128StarStar::seed_from_u64(seed);
    let m = mask(bit_width) as u64;
    for _ in 0..n {
        let duo = rng.next_u64() & m;
        let div = rng.next_u64() & m;
        if div == 0 {
            continue
        }
        for log2_radix in 1..=4 {
            let mut udr = UnsignedDivRem::new(duo, div, bit_width, log2_radix).unwrap();
            let mut stages = 0;
            loop {
                stages += 1;
                if !udr.calculate_stage() {
                    break
                }
            }
            assert_eq!(stages, (bit_width + log2_radix - 1) / log2_radix);
            let (quo, rem) = (udr.quotient(), udr.remainder());
            assert_eq!(u128::from(quo) * u128::from(div) + u128::from(rem), u128::from(duo));
            assert!(rem < div);
            let (oq, or) = div_rem(duo as i128, div as i128, bit_width, false).unwrap();
            assert_eq!((quo as i128, rem as i128), (oq, or));
        }
    }
}

/// Fuzzes the staged signed wrapper against the oracle
pub fn signed_vs_oracle(n: u32, seed: u64, bit_width: usize) {
    let mut rng = Xoshiro128StarStar::seed_from_u64(seed);
    let m = mask(bit_width) as u64;
    for _ in 0..n {
        let duo = (rng.next_u64() & m) as i128;
        let div = (rng.next_u64() & m) as i128;
        for log2_radix in 1..=4 {
            let staged = DivRem::new(duo, div, bit_width, true, log2_radix);
            let oracle = div_rem(duo, div, bit_width, true);
            match (staged, oracle) {
                (Some(mut staged), Some(oracle)) => {
                    assert_eq!(staged.calculate(), oracle);
                }
                (None, None) => (),
                _ => panic!("staged and oracle disagree about a zero divisor"),
            }
        }
    }
}
