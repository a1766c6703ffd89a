//! The bespoke layout lattice.
//!
//! Arrays may use any of several physical layouts. The compiler reasons
//! about them through a lattice of layouts: concrete layouts (one physical
//! representation, one vtable) and abstract layouts (unions of concrete
//! ones), ordered under a universal top layout.
//!
//! # Lifecycle
//!
//! 1. **Open**: layouts register through [`HierarchyBuilder`] (or the
//!    process-wide [`registry`]), each naming its immediate parents.
//!    Registration validates the lattice invariants.
//! 2. **Sealed**: [`HierarchyBuilder::finalize`] produces the immutable
//!    [`LayoutHierarchy`]; joins, meets, subtype tests and liveable
//!    ancestors are all valid from then on.
//!
//! # Compiler interface
//!
//! [`BespokeLayout`] is the handle the compiler passes around. It forwards
//! lattice operators to the sealed hierarchy and code-generation hooks to
//! the [`IrGen`] seam, with concrete layouts dispatching directly through
//! their vtable and abstract layouts through the generic [`runtime`] path.
//!
//! # Tracing
//!
//! - `RUST_LOG=bespoke_layout=debug` logs registration and sealing.
//! - `RUST_LOG=bespoke_layout=trace` adds every lattice query.
//! - `RUST_LOG=bespoke::dispatch=trace` logs checked vtable dispatch.

mod allocator;
mod builder;
mod error;
mod handle;
mod hierarchy;
mod irgen;
mod lattice;
mod layout;
pub mod registry;
pub mod runtime;

pub use allocator::IndexAllocator;
pub use builder::HierarchyBuilder;
pub use error::HierarchyError;
pub use handle::BespokeLayout;
pub use hierarchy::{HierarchySnapshot, LayoutHierarchy, LayoutSnapshot};
pub use irgen::{BespokeOp, Dispatch, IrGen, LayoutData, Punt};
pub use layout::{ConcreteLayout, Layout, LayoutKind, TOP_DESCRIPTION};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber for debug output.
///
/// Call this early in the program to enable tracing output. Controlled by
/// the `RUST_LOG` environment variable; does nothing when it is unset.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
