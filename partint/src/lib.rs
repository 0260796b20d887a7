//! Dynamically partitioned wide integer arithmetic
//!
//! This crate is a software model of a partitioned ALU datapath: one wide
//! adder/reducer/multiplier/divider whose word can be split at runtime into
//! independently-carrying lanes at arbitrary bit boundaries. Enabling a split
//! at bit offset `k` produces results bit-identical to running two independent
//! operations on the sub-words, and disabling all splits produces results
//! bit-identical to a single wide operation, with the same logic both ways.
//!
//! The crate is strictly `no-std`, requiring only an allocator. Almost all
//! fallible functions return a handleable `Option`; every configuration error
//! is caught at construction time and every operand error before any stage
//! runs. Nothing here recovers or retries internally.
#![no_std]
// not const and tends to be longer
#![allow(clippy::manual_range_contains)]
// We are using special indexing everywhere
#![allow(clippy::needless_range_loop)]

extern crate alloc;

mod adder;
mod div;
mod mul;
mod partition;
mod reduce;
#[cfg(feature = "serde_support")]
mod serde;

pub use adder::{full_adder, masked_full_adder, PartitionedAdder};
pub use div::{div_rem, DivRem, UnsignedDivRem};
pub use mul::{MulOp, PartedMul};
pub use partition::{Lanes, PartitionPoints};
pub use reduce::{AddReduce, FULL_ADDER_INPUT_COUNT};

/// The widest word the datapath carries
pub const MAX_WIDTH: usize = 128;

/// Returns a mask of the `width` least significant bits. `width` must be at
/// most 128.
pub(crate) const fn width_mask(width: usize) -> u128 {
    if width >= 128 {
        u128::MAX
    } else {
        (1u128 << width) - 1
    }
}

pub mod prelude {
    pub use crate::{
        div_rem, full_adder, masked_full_adder, AddReduce, DivRem, MulOp, PartedMul,
        PartitionPoints, PartitionedAdder, UnsignedDivRem,
    };
}
