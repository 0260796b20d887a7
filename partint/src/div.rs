use crate::width_mask;

// Terminology: "duo" is the dividend (it also becomes the remainder as the
// recurrence subtracts from it), "div" the divisor, "quo" the quotient.

/// Reduces `x` to a `bit_width`-bit value, reinterpreting it as two's
/// complement signed when `signed` is set.
const fn normalize(x: i128, bit_width: usize, signed: bool) -> i128 {
    let masked = (x as u128) & width_mask(bit_width);
    if signed && bit_width < 128 && (masked >> (bit_width - 1)) & 1 == 1 {
        masked as i128 - (1i128 << bit_width)
    } else {
        masked as i128
    }
}

/// Reference division: computes the `bit_width`-bit quotient and remainder
/// of `duo / div` directly in host arithmetic, truncating toward zero with
/// the remainder taking the dividend's sign (the RISC-V M convention). When
/// `signed` is set both operands and both results are interpreted as
/// `bit_width`-bit two's complement. Used to cross-check the staged
/// [UnsignedDivRem] engine bit for bit.
///
/// Returns `None` if `bit_width` is 0 or greater than 64, or if the
/// normalized divisor is zero (a domain error; callers must guard).
pub fn div_rem(duo: i128, div: i128, bit_width: usize, signed: bool) -> Option<(i128, i128)> {
    if bit_width == 0 || bit_width > 64 {
        return None
    }
    let duo = normalize(duo, bit_width, signed);
    let div = normalize(div, bit_width, signed);
    if div == 0 {
        return None
    }
    // `i128::div`/`rem` already truncate toward zero; normalizing afterward
    // wraps the one overflow case, `imin / -1`, like the hardware does
    Some((
        normalize(duo / div, bit_width, signed),
        normalize(duo % div, bit_width, signed),
    ))
}

/// Staged unsigned restoring divider.
///
/// Digit-recurrence unsigned division producing `log2_radix` quotient bits
/// per stage: each [UnsignedDivRem::calculate_stage] call consumes the next
/// `log2_radix` bits of the dividend, picks the largest radix digit whose
/// scaled divisor still fits under the working remainder, subtracts it, and
/// records it in the quotient. The state is exclusively owned by one
/// in-flight division; concurrent divisions need independent instances.
#[derive(Debug, Clone)]
pub struct UnsignedDivRem {
    remainder: u64,
    divisor: u64,
    bit_width: usize,
    log2_radix: usize,
    quotient: u64,
    current_shift: usize,
}

impl UnsignedDivRem {
    /// Creates a divider for `duo / div` at `bit_width` bits, producing
    /// `log2_radix` quotient bits per stage. Returns `None` if `bit_width`
    /// is 0 or greater than 64, `log2_radix` is not in 1..=8, or the
    /// `bit_width`-masked divisor is zero (division by zero is a domain
    /// error, never attempted by the staged engine).
    pub fn new(duo: u64, div: u64, bit_width: usize, log2_radix: usize) -> Option<Self> {
        if bit_width == 0 || bit_width > 64 {
            return None
        }
        if log2_radix == 0 || log2_radix > 8 {
            return None
        }
        let mask = width_mask(bit_width) as u64;
        let divisor = div & mask;
        if divisor == 0 {
            return None
        }
        Some(Self {
            remainder: duo & mask,
            divisor,
            bit_width,
            log2_radix,
            quotient: 0,
            current_shift: bit_width,
        })
    }

    pub fn quotient(&self) -> u64 {
        self.quotient
    }

    pub fn remainder(&self) -> u64 {
        self.remainder
    }

    pub fn divisor(&self) -> u64 {
        self.divisor
    }

    pub fn bit_width(&self) -> usize {
        self.bit_width
    }

    pub fn log2_radix(&self) -> usize {
        self.log2_radix
    }

    /// The number of dividend bits not yet consumed
    pub fn current_shift(&self) -> usize {
        self.current_shift
    }

    /// Performs one digit step. Returns `true` while more stages remain and
    /// `false` once the full bit width has been consumed; a completed
    /// divider stays completed.
    pub fn calculate_stage(&mut self) -> bool {
        if self.current_shift == 0 {
            return false
        }
        let step = if self.log2_radix < self.current_shift {
            self.log2_radix
        } else {
            self.current_shift
        };
        self.current_shift -= step;
        let radix = 1u64 << step;
        // equivalent to `step` binary restoring steps folded into one
        // compare-subtract scan
        let mut digit = 0u64;
        for d in 1..radix {
            let trial = (u128::from(self.divisor) * u128::from(d)) << self.current_shift;
            if trial <= u128::from(self.remainder) {
                digit = d;
            }
        }
        let sub = (u128::from(self.divisor) * u128::from(digit)) << self.current_shift;
        self.remainder -= sub as u64;
        self.quotient |= digit << self.current_shift;
        self.current_shift != 0
    }

    /// Drives [UnsignedDivRem::calculate_stage] to completion and returns
    /// `(quotient, remainder)`, which satisfy
    /// `duo == quotient * div + remainder` with `remainder < div`.
    pub fn calculate(&mut self) -> (u64, u64) {
        while self.calculate_stage() {}
        (self.quotient, self.remainder)
    }
}

/// Staged signed division wrapper around [UnsignedDivRem].
///
/// Divides the absolute values with the staged engine and reapplies the
/// signs on the final stage per truncating division: the quotient is negated
/// when the operand signs differ, the remainder takes the dividend's sign.
#[derive(Debug, Clone)]
pub struct DivRem {
    duo: i128,
    div: i128,
    bit_width: usize,
    signed: bool,
    quotient: i128,
    remainder: i128,
    divider: UnsignedDivRem,
}

impl DivRem {
    /// Creates a signed or unsigned staged divider; the operands are
    /// normalized to `bit_width` bits first. Same `None` conditions as
    /// [UnsignedDivRem::new].
    pub fn new(
        duo: i128,
        div: i128,
        bit_width: usize,
        signed: bool,
        log2_radix: usize,
    ) -> Option<Self> {
        if bit_width == 0 || bit_width > 64 {
            return None
        }
        let duo = normalize(duo, bit_width, signed);
        let div = normalize(div, bit_width, signed);
        let divider = UnsignedDivRem::new(
            duo.unsigned_abs() as u64,
            div.unsigned_abs() as u64,
            bit_width,
            log2_radix,
        )?;
        Some(Self {
            duo,
            div,
            bit_width,
            signed,
            quotient: 0,
            remainder: 0,
            divider,
        })
    }

    pub fn quotient(&self) -> i128 {
        self.quotient
    }

    pub fn remainder(&self) -> i128 {
        self.remainder
    }

    /// Performs one digit step of the underlying unsigned division,
    /// reapplying the signs when the final stage completes. Returns `true`
    /// while more stages remain.
    pub fn calculate_stage(&mut self) -> bool {
        if self.divider.calculate_stage() {
            return true
        }
        let mut quo = self.divider.quotient() as i128;
        let mut rem = self.divider.remainder() as i128;
        if (self.duo < 0) != (self.div < 0) {
            quo = -quo;
        }
        if self.duo < 0 {
            rem = -rem;
        }
        self.quotient = normalize(quo, self.bit_width, self.signed);
        self.remainder = normalize(rem, self.bit_width, self.signed);
        false
    }

    /// Drives the division to completion and returns
    /// `(quotient, remainder)`, normalized to `bit_width` bits.
    pub fn calculate(&mut self) -> (i128, i128) {
        while self.calculate_stage() {}
        (self.quotient, self.remainder)
    }
}
