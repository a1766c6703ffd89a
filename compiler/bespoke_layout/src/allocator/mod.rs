//! Layout index allocation.
//!
//! Indices are handed out in aligned power-of-two blocks from a single
//! atomic high-water mark. A block of size `n` always starts at a multiple
//! of `n`, so "is this layout inside the block" is one mask-and-compare
//! (see [`LayoutIndex::in_block`]). Allocation is monotonic and indices are
//! never reclaimed.

use std::sync::atomic::{AtomicU16, Ordering};

use bespoke_base::LayoutIndex;

/// Lock-free, monotonic allocator over the 15-bit index space.
#[derive(Debug)]
pub struct IndexAllocator {
    /// First index not yet handed out.
    next: AtomicU16,
}

impl IndexAllocator {
    pub const fn new() -> Self {
        Self {
            next: AtomicU16::new(0),
        }
    }

    /// Reserve an aligned block of `size` consecutive indices and return
    /// its first index, a multiple of `size`.
    ///
    /// # Panics
    ///
    /// Panics if `size` is not a power of two or the block would extend
    /// past [`LayoutIndex::MAX_INDEX`].
    pub fn reserve(&self, size: usize) -> LayoutIndex {
        assert!(
            size.is_power_of_two(),
            "reserve_indices: block size {size} is not a power of two"
        );
        let mut cur = self.next.load(Ordering::Relaxed);
        loop {
            let base = usize::from(cur).next_multiple_of(size);
            let end = base.saturating_add(size);
            let Some((base, end)) = Self::fits(base, end) else {
                panic!(
                    "reserve_indices: layout index space exhausted \
                     (requested {size} at high-water mark {cur})"
                );
            };
            match self
                .next
                .compare_exchange_weak(cur, end, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => {
                    tracing::trace!(base, size, "reserved layout indices");
                    return LayoutIndex::from_raw(base);
                }
                Err(actual) => cur = actual,
            }
        }
    }

    /// Whether `index` lies below the high-water mark.
    pub fn is_reserved(&self, index: LayoutIndex) -> bool {
        index.raw() < self.next.load(Ordering::Acquire)
    }

    /// First index not yet handed out.
    pub fn high_water(&self) -> u16 {
        self.next.load(Ordering::Acquire)
    }

    /// Narrow a block to `u16`, rejecting blocks past the index space.
    fn fits(base: usize, end: usize) -> Option<(u16, u16)> {
        if end > LayoutIndex::COUNT {
            return None;
        }
        Some((u16::try_from(base).ok()?, u16::try_from(end).ok()?))
    }
}

impl Default for IndexAllocator {
    fn default() -> Self {
        Self::new()
    }
}
