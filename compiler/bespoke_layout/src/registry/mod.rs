//! The process-wide layout registry.
//!
//! Layouts are registered once during runtime warm-up and sealed by
//! [`finalize_hierarchy`]. Until then the open [`HierarchyBuilder`] sits
//! behind a mutex; afterwards the sealed [`LayoutHierarchy`] is published
//! through a `OnceLock` and every read is lock-free.
//!
//! The builder lock is held across sealing, so a registration either lands
//! in the builder before it is sealed or observes the sealed state and
//! fails with [`HierarchyError::Sealed`].

use std::sync::OnceLock;

use bespoke_array::LayoutFunctions;
use bespoke_base::LayoutIndex;
use parking_lot::Mutex;

use crate::{HierarchyBuilder, HierarchyError, Layout, LayoutHierarchy, TOP_DESCRIPTION};

static BUILDER: Mutex<Option<HierarchyBuilder>> = parking_lot::const_mutex(None);
static SEALED: OnceLock<LayoutHierarchy> = OnceLock::new();

/// Run `f` against the open builder, creating it on first use.
fn with_open<R>(
    f: impl FnOnce(&mut HierarchyBuilder) -> Result<R, HierarchyError>,
) -> Result<R, HierarchyError> {
    let mut guard = BUILDER.lock();
    if SEALED.get().is_some() {
        return Err(HierarchyError::Sealed);
    }
    f(guard.get_or_insert_with(HierarchyBuilder::new))
}

/// Reserve an aligned block of `size` indices. See
/// [`IndexAllocator::reserve`](crate::IndexAllocator::reserve).
pub fn reserve_indices(size: usize) -> Result<LayoutIndex, HierarchyError> {
    with_open(|b| Ok(b.reserve_indices(size)))
}

pub fn register_abstract(
    description: impl Into<String>,
    parents: impl IntoIterator<Item = LayoutIndex>,
    liveable: bool,
) -> Result<LayoutIndex, HierarchyError> {
    with_open(|b| b.register_abstract(description, parents, liveable))
}

pub fn register_abstract_at(
    index: LayoutIndex,
    description: impl Into<String>,
    parents: impl IntoIterator<Item = LayoutIndex>,
    liveable: bool,
) -> Result<(), HierarchyError> {
    with_open(|b| b.register_abstract_at(index, description, parents, liveable))
}

pub fn register_concrete(
    description: impl Into<String>,
    vtable: &'static LayoutFunctions,
    parents: impl IntoIterator<Item = LayoutIndex>,
    liveable: bool,
) -> Result<LayoutIndex, HierarchyError> {
    with_open(|b| b.register_concrete(description, vtable, parents, liveable))
}

pub fn register_concrete_at(
    index: LayoutIndex,
    description: impl Into<String>,
    vtable: &'static LayoutFunctions,
    parents: impl IntoIterator<Item = LayoutIndex>,
    liveable: bool,
) -> Result<(), HierarchyError> {
    with_open(|b| b.register_concrete_at(index, description, vtable, parents, liveable))
}

/// Seal the hierarchy: no further registration, all lattice queries valid.
pub fn finalize_hierarchy() -> Result<&'static LayoutHierarchy, HierarchyError> {
    let mut guard = BUILDER.lock();
    if SEALED.get().is_some() {
        return Err(HierarchyError::AlreadySealed);
    }
    let builder = guard.take().unwrap_or_default();
    let hierarchy = SEALED.get_or_init(|| builder.finalize());
    Ok(hierarchy)
}

/// The sealed hierarchy, once [`finalize_hierarchy`] has run.
#[inline]
pub fn hierarchy() -> Option<&'static LayoutHierarchy> {
    SEALED.get()
}

#[inline]
pub fn is_sealed() -> bool {
    SEALED.get().is_some()
}

/// Whether a layout is registered at `index`, sealed or not.
pub fn is_registered(index: LayoutIndex) -> bool {
    if let Some(h) = hierarchy() {
        return h.layout(index).is_some();
    }
    let guard = BUILDER.lock();
    match guard.as_ref() {
        Some(b) => b.get(index).is_some(),
        None => index.is_top(),
    }
}

/// The description of the layout at `index`, sealed or not.
pub fn description(index: LayoutIndex) -> Option<&'static str> {
    if let Some(h) = hierarchy() {
        return h.layout(index).map(Layout::describe);
    }
    let guard = BUILDER.lock();
    match guard.as_ref() {
        Some(b) => b.get(index).map(Layout::describe),
        None if index.is_top() => Some(TOP_DESCRIPTION),
        None => None,
    }
}

/// The vtable of the concrete layout at `index`, sealed or not.
pub fn concrete_vtable(index: LayoutIndex) -> Option<&'static LayoutFunctions> {
    if let Some(h) = hierarchy() {
        return h.concrete(index).map(|c| c.vtable());
    }
    let guard = BUILDER.lock();
    guard.as_ref()?.get(index)?.vtable()
}
