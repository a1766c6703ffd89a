//! Operation vtables for bespoke array representations.
//!
//! Each physical array representation implements [`BespokeArray`], a fixed
//! set of operations over the *typed* representation. [`LayoutFunctions`]
//! erases that into a table of plain function pointers over the generic
//! [`ArrayData`](bespoke_base::ArrayData) handle, so a concrete layout can
//! hand compiled code one vtable and compiled code can call its entries
//! directly.
//!
//! # Dispatch duality
//!
//! Every vtable entry has to turn the generic handle back into the typed
//! representation. Two disciplines exist:
//!
//! - **Checked** ([`LayoutFunctions::checked`]): downcast through the body's
//!   type identity, report the call to the dispatch log, panic on mismatch.
//! - **Unchecked** ([`LayoutFunctions::unchecked`]): reinterpret the body
//!   with no check and no logging.
//!
//! [`LayoutFunctions::for_array`] picks one via
//! [`CHECKED_DISPATCH`](bespoke_base::config::CHECKED_DISPATCH). Both
//! produce identical results for valid inputs.
//!
//! # Tracing
//!
//! - `RUST_LOG=bespoke::dispatch=trace` logs every checked dispatch.

mod dispatch_log;
mod repr;
mod seam;
mod vtable;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use dispatch_log::{
    dispatch_sink, install_dispatch_sink, log_dispatch, DispatchCounter, DispatchSink,
    DispatchSinkError,
};
pub use repr::{ArrayError, BespokeArray, Elem, Lval, Scanner, Updated};
pub use vtable::LayoutFunctions;
