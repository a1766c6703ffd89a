//! The one place the generic handle becomes a typed representation.
//!
//! Checked casts verify the body's type, log the dispatch, and panic on a
//! mismatch naming the operation and the array. Unchecked casts reinterpret
//! the body pointer; calling them on a body of another type is undefined
//! behaviour. Nothing else in the workspace casts array bodies.

#![allow(unsafe_code, reason = "unchecked dispatch is the documented unsafe seam")]

use std::any::{type_name, Any};

use bespoke_base::ArrayData;

use crate::{log_dispatch, BespokeArray};

#[cold]
#[inline(never)]
fn mismatch<A>(ad: &ArrayData, op: &'static str) -> ! {
    panic!(
        "bespoke dispatch mismatch in `{op}`: {} ({}, {}) is not a `{}`",
        ad.id(),
        ad.kind(),
        ad.body_type_name(),
        type_name::<A>()
    )
}

/// Borrow the typed representation.
#[inline]
pub(crate) fn cast<'a, A: BespokeArray, const CHECKED: bool>(
    ad: &'a ArrayData,
    op: &'static str,
) -> &'a A {
    if CHECKED {
        log_dispatch(ad, op);
        match ad.body().downcast_ref::<A>() {
            Some(arr) => arr,
            None => mismatch::<A>(ad, op),
        }
    } else {
        // SAFETY: unchecked vtables are only built by the `unsafe`
        // constructors `LayoutFunctions::{unchecked, for_array, leak}`, whose
        // callers guarantee every array handed to them carries an `A` body.
        unsafe { &*std::ptr::from_ref::<dyn Any + Send + Sync>(ad.body()).cast::<A>() }
    }
}

/// Mutably borrow the typed representation.
#[inline]
pub(crate) fn cast_mut<'a, A: BespokeArray, const CHECKED: bool>(
    ad: &'a mut ArrayData,
    op: &'static str,
) -> &'a mut A {
    if CHECKED {
        log_dispatch(ad, op);
        if !ad.body().is::<A>() {
            mismatch::<A>(ad, op);
        }
        match ad.body_mut().downcast_mut::<A>() {
            Some(arr) => arr,
            None => unreachable!("body type verified above"),
        }
    } else {
        // SAFETY: see `cast`.
        unsafe { &mut *std::ptr::from_mut::<dyn Any + Send + Sync>(ad.body_mut()).cast::<A>() }
    }
}

/// Take ownership of the typed representation, discarding the header.
#[inline]
pub(crate) fn cast_owned<A: BespokeArray, const CHECKED: bool>(
    ad: ArrayData,
    op: &'static str,
) -> Box<A> {
    if CHECKED {
        log_dispatch(&ad, op);
        if !ad.body().is::<A>() {
            mismatch::<A>(&ad, op);
        }
        match ad.into_body().downcast::<A>() {
            Ok(arr) => arr,
            Err(_) => unreachable!("body type verified above"),
        }
    } else {
        // SAFETY: see `cast`. The box was allocated for an `A`, so the
        // thin pointer owns a valid `A` allocation.
        unsafe { Box::from_raw(Box::into_raw(ad.into_body()).cast::<A>()) }
    }
}

/// Heap-size query: checked builds verify the type but never log, since the
/// collector calls this outside any profiled operation.
#[inline]
pub(crate) fn cast_quiet<A: BespokeArray, const CHECKED: bool>(ad: &ArrayData) -> &A {
    if CHECKED {
        match ad.body().downcast_ref::<A>() {
            Some(arr) => arr,
            None => mismatch::<A>(ad, "heap_size"),
        }
    } else {
        // SAFETY: see `cast`.
        unsafe { &*std::ptr::from_ref::<dyn Any + Send + Sync>(ad.body()).cast::<A>() }
    }
}
