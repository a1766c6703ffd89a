//! The generic array handle.
//!
//! `ArrayData` is what compiled code and the runtime pass around when they
//! do not know (or do not care) which physical layout an array uses. It is a
//! small header followed by an owned, type-erased representation body:
//!
//! - **identity** ([`ArrayId`]): process-unique, reported to the dispatch log
//! - **kind** ([`ArrayKind`]): vanilla, or bespoke with its layout index
//! - **flags** ([`ArrayFlags`]): legacy marking and sharing state
//!
//! The header must describe the body truthfully. Checked dispatch verifies
//! that; unchecked dispatch trusts it.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use bitflags::bitflags;

use crate::{LayoutIndex, VanillaArray};

/// Process-unique array identity.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArrayId(u64);

static NEXT_ARRAY_ID: AtomicU64 = AtomicU64::new(1);

impl ArrayId {
    /// Allocate a fresh identity.
    pub fn fresh() -> Self {
        Self(NEXT_ARRAY_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ArrayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "arr#{}", self.0)
    }
}

/// Which representation family the body belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArrayKind {
    Vanilla,
    Bespoke(LayoutIndex),
}

impl fmt::Display for ArrayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayKind::Vanilla => write!(f, "vanilla"),
            ArrayKind::Bespoke(idx) => write!(f, "bespoke {idx}"),
        }
    }
}

bitflags! {
    /// Header flags shared by every representation.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ArrayFlags: u8 {
        /// Marked as a legacy array for interop with older builtins.
        const LEGACY = 1 << 0;
        /// Converted for immutable cross-request sharing.
        const UNCOUNTED = 1 << 1;
        /// Converted to the legacy dict/vec-array variant.
        const DV_ARRAY = 1 << 2;
    }
}

type Body = Box<dyn Any + Send + Sync>;

/// A logical array: header plus type-erased representation.
pub struct ArrayData {
    id: ArrayId,
    kind: ArrayKind,
    flags: ArrayFlags,
    body: Body,
}

impl ArrayData {
    /// Wrap a vanilla representation.
    pub fn vanilla(arr: VanillaArray) -> Self {
        Self {
            id: ArrayId::fresh(),
            kind: ArrayKind::Vanilla,
            flags: ArrayFlags::empty(),
            body: Box::new(arr),
        }
    }

    /// Wrap a bespoke representation tagged with `layout`.
    ///
    /// The caller vouches that `layout` is a concrete layout whose vtable
    /// was built for `T`.
    pub fn bespoke<T: Any + Send + Sync>(layout: LayoutIndex, repr: T) -> Self {
        Self {
            id: ArrayId::fresh(),
            kind: ArrayKind::Bespoke(layout),
            flags: ArrayFlags::empty(),
            body: Box::new(repr),
        }
    }

    #[inline]
    pub fn id(&self) -> ArrayId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> ArrayKind {
        self.kind
    }

    /// The bespoke layout, or `None` for a vanilla array.
    #[inline]
    pub fn layout(&self) -> Option<LayoutIndex> {
        match self.kind {
            ArrayKind::Vanilla => None,
            ArrayKind::Bespoke(idx) => Some(idx),
        }
    }

    #[inline]
    pub fn is_vanilla(&self) -> bool {
        self.kind == ArrayKind::Vanilla
    }

    /// The header word: tagged layout index, or zero for vanilla.
    #[inline]
    pub fn header_word(&self) -> u16 {
        self.layout().map_or(0, LayoutIndex::to_header)
    }

    #[inline]
    pub fn flags(&self) -> ArrayFlags {
        self.flags
    }

    #[inline]
    pub fn is_legacy(&self) -> bool {
        self.flags.contains(ArrayFlags::LEGACY)
    }

    pub fn set_flag(&mut self, flag: ArrayFlags, on: bool) {
        self.flags.set(flag, on);
    }

    /// Carry `flags` over from an array this one replaces.
    pub fn inherit_flags(&mut self, from: ArrayFlags) {
        self.flags |= from;
    }

    /// Type name of the body, for diagnostics.
    pub fn body_type_name(&self) -> &'static str {
        if self.body.is::<VanillaArray>() {
            type_name::<VanillaArray>()
        } else {
            "<bespoke representation>"
        }
    }

    #[inline]
    pub fn body(&self) -> &(dyn Any + Send + Sync) {
        &*self.body
    }

    #[inline]
    pub fn body_mut(&mut self) -> &mut (dyn Any + Send + Sync) {
        &mut *self.body
    }

    /// Give up the header and keep the body.
    #[inline]
    pub fn into_body(self) -> Body {
        self.body
    }

    pub fn as_vanilla(&self) -> Option<&VanillaArray> {
        if self.is_vanilla() {
            self.body.downcast_ref()
        } else {
            None
        }
    }

    pub fn as_vanilla_mut(&mut self) -> Option<&mut VanillaArray> {
        if self.is_vanilla() {
            self.body.downcast_mut()
        } else {
            None
        }
    }

    /// Unwrap a vanilla array, handing the array back if it is bespoke.
    pub fn into_vanilla(self) -> Result<VanillaArray, Self> {
        if !self.is_vanilla() {
            return Err(self);
        }
        let Self {
            id,
            kind,
            flags,
            body,
        } = self;
        match body.downcast::<VanillaArray>() {
            Ok(arr) => Ok(*arr),
            Err(body) => Err(Self {
                id,
                kind,
                flags,
                body,
            }),
        }
    }
}

impl fmt::Debug for ArrayData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ArrayData");
        s.field("id", &self.id)
            .field("kind", &self.kind)
            .field("flags", &self.flags);
        match self.as_vanilla() {
            Some(arr) => s.field("body", arr).finish(),
            None => s.finish_non_exhaustive(),
        }
    }
}
