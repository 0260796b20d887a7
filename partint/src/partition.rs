use alloc::vec::Vec;

use crate::width_mask;

/// Partition points and their enable conditions.
///
/// The points at which a wide word may be split into independently-carrying
/// lanes, along with a boolean per point that says whether the split is
/// active for the current operation. For example, offsets `{1, 5, 10}` with
/// every enable set and `width == 16` split the word into four lanes:
///
/// * bits 0 <= `i` < 1
/// * bits 1 <= `i` < 5
/// * bits 5 <= `i` < 10
/// * bits 10 <= `i` < 16
///
/// If the enable at offset 5 is instead cleared, the middle two lanes fuse
/// into one lane of bits 1 <= `i` < 10. Offsets 0 and `width` are implicit
/// boundaries and are never members of the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPoints {
    // sorted by offset, offsets unique and nonzero
    pub(crate) points: Vec<(usize, bool)>,
}

impl PartitionPoints {
    /// Creates a `PartitionPoints` from `(offset, enable)` pairs in any
    /// order. Returns `None` if any offset is 0 or occurs more than once.
    pub fn new<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (usize, bool)>,
    {
        let mut points: Vec<(usize, bool)> = points.into_iter().collect();
        points.sort_unstable_by_key(|p| p.0);
        for i in 0..points.len() {
            if points[i].0 == 0 {
                return None
            }
            if i > 0 && points[i].0 == points[i - 1].0 {
                return None
            }
        }
        Some(Self { points })
    }

    /// The empty point set: one lane spanning the whole word.
    pub const fn empty() -> Self {
        Self { points: Vec::new() }
    }

    /// Creates evenly spaced points from a compact enable mask: points at
    /// `n, 2n, ... < width` where `n = enables.len()`, taking enables in
    /// order. `enables.len() == 4` with `width == 16` yields points at
    /// offsets 4, 8, and 12.
    pub fn regular(enables: &[bool], width: usize) -> Self {
        let spacing = enables.len();
        let mut points = Vec::new();
        let mut pos = spacing;
        let mut i = 0;
        while pos < width && i < enables.len() {
            points.push((pos, enables[i]));
            pos += spacing;
            i += 1;
        }
        Self { points }
    }

    /// Returns a same-shaped set with every enable cleared, for fresh
    /// control wiring.
    #[must_use]
    pub fn like(&self) -> Self {
        Self {
            points: self.points.iter().map(|&(offset, _)| (offset, false)).collect(),
        }
    }

    /// Returns a copy with every offset multiplied by `mul`, keeping the
    /// enables. Typically `mul == 2`, mapping operand-width points onto a
    /// double-width product. Returns `None` if `mul == 0`.
    #[must_use]
    pub fn scaled(&self, mul: usize) -> Option<Self> {
        if mul == 0 {
            return None
        }
        Some(Self {
            points: self
                .points
                .iter()
                .map(|&(offset, enabled)| (offset * mul, enabled))
                .collect(),
        })
    }

    /// Copies every enable from `rhs`. Returns `None` if the offset sets
    /// differ.
    pub fn eq_assign(&mut self, rhs: &Self) -> Option<()> {
        if !self.same_shape(rhs) {
            return None
        }
        for (dst, src) in self.points.iter_mut().zip(&rhs.points) {
            dst.1 = src.1;
        }
        Some(())
    }

    /// Checks that `self` and `rhs` have identical offset sets, ignoring
    /// enables.
    pub fn same_shape(&self, rhs: &Self) -> bool {
        (self.points.len() == rhs.points.len())
            && self
                .points
                .iter()
                .zip(&rhs.points)
                .all(|(lhs, rhs)| lhs.0 == rhs.0)
    }

    /// Sets the enable of the point at `offset`. Returns `None` if `offset`
    /// is not a member.
    pub fn set(&mut self, offset: usize, enable: bool) -> Option<()> {
        let i = self.points.binary_search_by_key(&offset, |p| p.0).ok()?;
        self.points[i].1 = enable;
        Some(())
    }

    /// Returns the enable of the point at `offset`, or `None` if `offset` is
    /// not a member.
    pub fn get(&self, offset: usize) -> Option<bool> {
        let i = self.points.binary_search_by_key(&offset, |p| p.0).ok()?;
        Some(self.points[i].1)
    }

    /// Checks if `offset` is a member, enabled or not.
    pub fn contains(&self, offset: usize) -> bool {
        self.points.binary_search_by_key(&offset, |p| p.0).is_ok()
    }

    /// The number of points, enabled or not.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The offsets in increasing order.
    pub fn offsets(&self) -> impl Iterator<Item = usize> + '_ {
        self.points.iter().map(|&(offset, _)| offset)
    }

    /// The `(offset, enable)` pairs in increasing offset order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, bool)> + '_ {
        self.points.iter().copied()
    }

    /// Creates a `width`-bit carry-keep mask: bit `i` is clear iff an
    /// *enabled* point sits at offset `i`. ANDing a left-shifted carry word
    /// with this mask blocks every carry that would cross an active
    /// partition boundary.
    pub fn as_mask(&self, width: usize) -> u128 {
        debug_assert!(width <= 128);
        let mut mask = width_mask(width);
        for &(offset, enabled) in &self.points {
            if enabled && offset < width {
                mask &= !(1u128 << offset);
            }
        }
        mask
    }

    /// The number of lanes when every point below `width` is enabled.
    pub fn get_max_partition_count(&self, width: usize) -> usize {
        1 + self.points.iter().filter(|&&(offset, _)| offset < width).count()
    }

    /// Checks that every offset is smaller than `width`.
    pub fn fits_in_width(&self, width: usize) -> bool {
        self.points.iter().all(|&(offset, _)| offset < width)
    }

    /// Iterates over the `(low, high)` bit bounds of the lanes the enabled
    /// points split `[0, width)` into, in increasing bit order.
    pub fn lanes(&self, width: usize) -> Lanes<'_> {
        Lanes {
            points: &self.points,
            width,
            i: 0,
            lo: 0,
            done: false,
        }
    }
}

impl Default for PartitionPoints {
    fn default() -> Self {
        Self::empty()
    }
}

/// Iterator over the lane bounds of a [PartitionPoints], see
/// [PartitionPoints::lanes]
#[derive(Debug, Clone)]
pub struct Lanes<'a> {
    points: &'a [(usize, bool)],
    width: usize,
    i: usize,
    lo: usize,
    done: bool,
}

impl Iterator for Lanes<'_> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<(usize, usize)> {
        if self.done {
            return None
        }
        while self.i < self.points.len() {
            let (offset, enabled) = self.points[self.i];
            self.i += 1;
            if enabled && offset < self.width {
                let lo = self.lo;
                self.lo = offset;
                return Some((lo, offset))
            }
        }
        self.done = true;
        Some((self.lo, self.width))
    }
}
