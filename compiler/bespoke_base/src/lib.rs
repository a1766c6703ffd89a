//! Shared foundation for bespoke array layouts.
//!
//! A logical array value can live in one of several physical layouts: the
//! generic "vanilla" layout ([`VanillaArray`]) or any number of specialized
//! "bespoke" layouts registered at runtime warm-up. This crate holds the
//! pieces every other layer agrees on:
//!
//! - [`LayoutIndex`]: the 15-bit dense identifier of a layout.
//! - [`TypedValue`] / [`ArrayKey`]: the values and keys arrays store.
//! - [`ArrayData`]: the generic array handle: a small header (identity,
//!   kind, flags) in front of a type-erased representation body.
//! - [`VanillaArray`]: the generic representation every bespoke layout can
//!   escalate to.
//! - [`config`]: the build-time switches selecting checked or unchecked
//!   dispatch and hierarchy validation.

pub mod config;

mod array;
mod index;
mod value;
mod vanilla;

pub use array::{ArrayData, ArrayFlags, ArrayId, ArrayKind};
pub use index::LayoutIndex;
pub use value::{ArrayKey, KeyRef, SortFunction, TypedValue};
pub use vanilla::VanillaArray;

// Size assertions to prevent accidental regressions.
// Layout indices are stored in array headers and in every hierarchy set.
#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::LayoutIndex;

    const _: () = assert!(std::mem::size_of::<LayoutIndex>() == 2);
    const _: () = assert!(std::mem::size_of::<Option<LayoutIndex>>() <= 4);
}
