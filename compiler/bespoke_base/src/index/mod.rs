//! Layout index handle.
//!
//! `LayoutIndex` identifies a layout in the process-wide hierarchy. Indices
//! are dense, 15 bits wide, assigned at registration and never reused.
//!
//! # Header encoding
//!
//! Array headers store the index with bit 15 set. A vanilla array leaves the
//! bit clear, so "is bespoke" is a sign test on the header word.
//!
//! # Aligned blocks
//!
//! Layout families may reserve an aligned power-of-two block of indices.
//! Membership in such a block is a single mask-and-compare, which is what
//! compiled guard code emits.

use std::fmt;

/// A 15-bit index into the layout hierarchy.
///
/// Equality is identity. The derived `Ord` is numeric and exists for sorted
/// sets; the subtyping order lives on the hierarchy, not here.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct LayoutIndex(u16);

impl LayoutIndex {
    /// Largest representable index.
    pub const MAX_INDEX: u16 = (1 << 15) - 1;

    /// The universal layout: a superset of every array.
    pub const TOP: Self = Self(0);

    /// Number of distinct indices.
    pub const COUNT: usize = Self::MAX_INDEX as usize + 1;

    const HEADER_TAG: u16 = 1 << 15;

    /// Create an index from its raw value.
    ///
    /// # Panics
    /// Panics if `raw` exceeds [`Self::MAX_INDEX`].
    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        assert!(raw <= Self::MAX_INDEX, "layout index exceeds 15 bits");
        Self(raw)
    }

    /// Get the raw `u16` value.
    #[inline]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_top(self) -> bool {
        self.0 == Self::TOP.0
    }

    /// Encode for an array header: the index with the sign bit set.
    #[inline]
    pub const fn to_header(self) -> u16 {
        self.0 | Self::HEADER_TAG
    }

    /// Decode an array header word. Returns `None` for vanilla headers.
    #[inline]
    pub const fn from_header(word: u16) -> Option<Self> {
        if word & Self::HEADER_TAG == 0 {
            None
        } else {
            Some(Self(word & !Self::HEADER_TAG))
        }
    }

    /// Whether this index lies in the aligned block of `size` indices
    /// starting at `base`.
    ///
    /// `size` must be a power of two and `base` a multiple of it, which is
    /// exactly what index reservation hands out.
    #[inline]
    pub const fn in_block(self, base: Self, size: u16) -> bool {
        debug_assert!(size.is_power_of_two());
        debug_assert!(base.0 & (size - 1) == 0);
        (self.0 & !(size - 1)) == base.0
    }
}

impl fmt::Debug for LayoutIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_top() {
            write!(f, "LayoutIndex::TOP")
        } else {
            write!(f, "LayoutIndex({})", self.0)
        }
    }
}

impl fmt::Display for LayoutIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layout#{}", self.0)
    }
}
