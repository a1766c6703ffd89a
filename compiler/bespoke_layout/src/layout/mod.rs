//! Layout nodes.
//!
//! A [`Layout`] is one node of the lattice: identity, description, declared
//! parents, derived children and closures, and the liveable flag. Nodes
//! live in an arena indexed by [`LayoutIndex`]; every relation is an index
//! set, never a pointer.
//!
//! Concrete and abstract layouts are one type distinguished by
//! [`LayoutKind`]. A concrete layout owns exactly one vtable; a
//! [`ConcreteLayout`] is the borrowed view exposing it.

use std::collections::BTreeSet;
use std::fmt;

use bespoke_array::LayoutFunctions;
use bespoke_base::LayoutIndex;
use rustc_hash::FxHashSet;

use crate::irgen::{Dispatch, LayoutData};

/// Description of the top layout.
pub const TOP_DESCRIPTION: &str = "BespokeTop";

/// Concrete (one representation) or abstract (a union).
#[derive(Copy, Clone)]
pub enum LayoutKind {
    Concrete(&'static LayoutFunctions),
    Abstract,
}

impl fmt::Debug for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutKind::Concrete(vt) => write!(f, "Concrete({:p})", *vt),
            LayoutKind::Abstract => write!(f, "Abstract"),
        }
    }
}

/// A node of the layout lattice.
#[derive(Debug)]
pub struct Layout {
    index: LayoutIndex,
    /// Lives for the process, like the registration it names.
    description: &'static str,
    kind: LayoutKind,
    liveable: bool,
    /// Immediate parents; an antichain in a validated hierarchy.
    parents: BTreeSet<LayoutIndex>,
    /// Immediate children, appended as they register.
    children: BTreeSet<LayoutIndex>,
    /// Reflexive upward closure.
    ancestors: FxHashSet<LayoutIndex>,
    /// Reflexive downward closure. Only `{self}` until the hierarchy is
    /// sealed.
    descendants: FxHashSet<LayoutIndex>,
    liveable_ancestor: LayoutIndex,
    /// How hooks dispatch; abstract layouts may be upgraded at seal time.
    dispatch: Dispatch,
}

impl Layout {
    pub(crate) fn top() -> Self {
        Self::new(
            LayoutIndex::TOP,
            TOP_DESCRIPTION,
            LayoutKind::Abstract,
            true,
            BTreeSet::new(),
            LayoutIndex::TOP,
            FxHashSet::default(),
        )
    }

    /// `ancestors` excludes the new node; it is added here.
    pub(crate) fn new(
        index: LayoutIndex,
        description: &'static str,
        kind: LayoutKind,
        liveable: bool,
        parents: BTreeSet<LayoutIndex>,
        liveable_ancestor: LayoutIndex,
        mut ancestors: FxHashSet<LayoutIndex>,
    ) -> Self {
        ancestors.insert(index);
        let mut descendants = FxHashSet::default();
        descendants.insert(index);
        let dispatch = match kind {
            LayoutKind::Concrete(vt) => Dispatch::Direct(vt),
            LayoutKind::Abstract => Dispatch::Virtual,
        };
        Self {
            index,
            description,
            kind,
            liveable,
            parents,
            children: BTreeSet::new(),
            ancestors,
            descendants,
            liveable_ancestor,
            dispatch,
        }
    }

    #[inline]
    pub fn index(&self) -> LayoutIndex {
        self.index
    }

    pub fn describe(&self) -> &'static str {
        self.description
    }

    #[inline]
    pub fn kind(&self) -> LayoutKind {
        self.kind
    }

    #[inline]
    pub fn is_concrete(&self) -> bool {
        matches!(self.kind, LayoutKind::Concrete(_))
    }

    /// The vtable of a concrete layout.
    pub fn vtable(&self) -> Option<&'static LayoutFunctions> {
        match self.kind {
            LayoutKind::Concrete(vt) => Some(vt),
            LayoutKind::Abstract => None,
        }
    }

    /// Whether the layout is general enough to guard compiled code on.
    #[inline]
    pub fn is_liveable(&self) -> bool {
        self.liveable
    }

    pub fn parents(&self) -> impl ExactSizeIterator<Item = LayoutIndex> + '_ {
        self.parents.iter().copied()
    }

    pub fn children(&self) -> impl ExactSizeIterator<Item = LayoutIndex> + '_ {
        self.children.iter().copied()
    }

    /// Reflexive upward closure.
    pub fn ancestors(&self) -> &FxHashSet<LayoutIndex> {
        &self.ancestors
    }

    /// Reflexive downward closure.
    pub fn descendants(&self) -> &FxHashSet<LayoutIndex> {
        &self.descendants
    }

    /// Whether `self <= other` in the lattice.
    #[inline]
    pub fn is_descendant_of(&self, other: LayoutIndex) -> bool {
        self.ancestors.contains(&other)
    }

    /// The cached least liveable ancestor (the layout itself if liveable).
    #[inline]
    pub fn liveable_ancestor(&self) -> LayoutIndex {
        self.liveable_ancestor
    }

    /// What code-generation hooks attach to emitted operations.
    #[inline]
    pub fn layout_data(&self) -> LayoutData {
        LayoutData::new(self.index, self.dispatch)
    }

    pub(crate) fn add_child(&mut self, child: LayoutIndex) {
        self.children.insert(child);
    }

    pub(crate) fn set_descendants(&mut self, descendants: FxHashSet<LayoutIndex>) {
        self.descendants = descendants;
    }

    pub(crate) fn set_dispatch(&mut self, dispatch: Dispatch) {
        self.dispatch = dispatch;
    }
}

/// Borrowed view of a concrete layout.
#[derive(Copy, Clone, Debug)]
pub struct ConcreteLayout<'a> {
    layout: &'a Layout,
    vtable: &'static LayoutFunctions,
}

impl<'a> ConcreteLayout<'a> {
    /// `None` for an abstract layout.
    pub fn new(layout: &'a Layout) -> Option<Self> {
        layout.vtable().map(|vtable| Self { layout, vtable })
    }

    #[inline]
    pub fn layout(self) -> &'a Layout {
        self.layout
    }

    #[inline]
    pub fn index(self) -> LayoutIndex {
        self.layout.index
    }

    #[inline]
    pub fn vtable(self) -> &'static LayoutFunctions {
        self.vtable
    }

    /// Hook data with direct dispatch through this layout's vtable.
    #[inline]
    pub fn layout_data(self) -> LayoutData {
        LayoutData::new(self.layout.index, Dispatch::Direct(self.vtable))
    }
}
