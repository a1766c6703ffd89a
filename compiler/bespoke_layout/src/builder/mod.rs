//! The open hierarchy: incremental registration and validation.
//!
//! [`HierarchyBuilder`] is the Open phase of the hierarchy. It starts with
//! the liveable top layout at [`LayoutIndex::TOP`], registers nodes one at a
//! time, and is consumed by [`finalize`](HierarchyBuilder::finalize) to
//! produce the sealed [`LayoutHierarchy`].
//!
//! # Registration contract
//!
//! Always enforced, because later phases index by these facts:
//!
//! - the index is reserved and unused;
//! - every declared parent is already registered (so the graph is acyclic
//!   by construction);
//! - every node other than top declares a parent.
//!
//! Enforced only when validation is on ([`VALIDATE_HIERARCHY`] by default):
//!
//! 1. declared parents form an antichain, i.e. they are immediate parents;
//! 2. the least liveable ancestor is unambiguous: a non-liveable node with a
//!    liveable parent has no other parent, and all parents of a
//!    non-liveable node agree on their liveable ancestor;
//! 3. the new node has a unique join with every registered node.
//!
//! A failed check returns [`HierarchyError`] and registers nothing.

use std::collections::BTreeSet;

use bespoke_array::LayoutFunctions;
use bespoke_base::config::VALIDATE_HIERARCHY;
use bespoke_base::LayoutIndex;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::allocator::IndexAllocator;
use crate::hierarchy::LayoutHierarchy;
use crate::layout::{Layout, LayoutKind};
use crate::lattice;
use crate::HierarchyError;

type Parents = SmallVec<[LayoutIndex; 4]>;

/// The layout hierarchy while it is still open for registration.
#[derive(Debug)]
pub struct HierarchyBuilder {
    allocator: IndexAllocator,
    /// Arena indexed by `LayoutIndex`; `None` for unused indices.
    layouts: Vec<Option<Layout>>,
    count: usize,
    validate: bool,
}

impl HierarchyBuilder {
    /// A builder holding only the top layout, validating per
    /// [`VALIDATE_HIERARCHY`].
    pub fn new() -> Self {
        Self::with_validation(VALIDATE_HIERARCHY)
    }

    pub fn with_validation(validate: bool) -> Self {
        let allocator = IndexAllocator::new();
        let top = allocator.reserve(1);
        debug_assert!(top.is_top());
        Self {
            allocator,
            layouts: vec![Some(Layout::top())],
            count: 1,
            validate,
        }
    }

    #[inline]
    pub fn validates(&self) -> bool {
        self.validate
    }

    /// Reserve an aligned block of indices for later `register_*_at` calls.
    pub fn reserve_indices(&self, size: usize) -> LayoutIndex {
        self.allocator.reserve(size)
    }

    /// The registered layout at `index`, if any.
    pub fn get(&self, index: LayoutIndex) -> Option<&Layout> {
        self.layouts.get(index.index()).and_then(Option::as_ref)
    }

    /// Number of registered layouts, top included.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    // ── Registration ────────────────────────────────────────────────

    pub fn register_abstract(
        &mut self,
        description: impl Into<String>,
        parents: impl IntoIterator<Item = LayoutIndex>,
        liveable: bool,
    ) -> Result<LayoutIndex, HierarchyError> {
        self.register(None, description.into(), LayoutKind::Abstract, parents, liveable)
    }

    pub fn register_concrete(
        &mut self,
        description: impl Into<String>,
        vtable: &'static LayoutFunctions,
        parents: impl IntoIterator<Item = LayoutIndex>,
        liveable: bool,
    ) -> Result<LayoutIndex, HierarchyError> {
        self.register(
            None,
            description.into(),
            LayoutKind::Concrete(vtable),
            parents,
            liveable,
        )
    }

    /// Register into an index from an earlier
    /// [`reserve_indices`](Self::reserve_indices).
    pub fn register_abstract_at(
        &mut self,
        index: LayoutIndex,
        description: impl Into<String>,
        parents: impl IntoIterator<Item = LayoutIndex>,
        liveable: bool,
    ) -> Result<(), HierarchyError> {
        self.register(
            Some(index),
            description.into(),
            LayoutKind::Abstract,
            parents,
            liveable,
        )?;
        Ok(())
    }

    pub fn register_concrete_at(
        &mut self,
        index: LayoutIndex,
        description: impl Into<String>,
        vtable: &'static LayoutFunctions,
        parents: impl IntoIterator<Item = LayoutIndex>,
        liveable: bool,
    ) -> Result<(), HierarchyError> {
        self.register(
            Some(index),
            description.into(),
            LayoutKind::Concrete(vtable),
            parents,
            liveable,
        )?;
        Ok(())
    }

    fn register(
        &mut self,
        at: Option<LayoutIndex>,
        description: String,
        kind: LayoutKind,
        parents: impl IntoIterator<Item = LayoutIndex>,
        liveable: bool,
    ) -> Result<LayoutIndex, HierarchyError> {
        let mut parents: Parents = parents.into_iter().collect();
        parents.sort_unstable();
        parents.dedup();

        if let Some(index) = at {
            self.check_slot(index)?;
        }
        self.check_parents(&description, &parents)?;
        let (ancestors, liveable_ancestor) = self.inherit(&description, &parents, liveable)?;
        if self.validate {
            self.check_joins(&description, &ancestors)?;
        }

        let index = match at {
            Some(index) => index,
            None => self.allocator.reserve(1),
        };
        let liveable_ancestor = liveable_ancestor.unwrap_or(index);
        let description: &'static str = Box::leak(description.into_boxed_str());
        tracing::debug!(
            %index,
            description = %description,
            liveable,
            concrete = matches!(kind, LayoutKind::Concrete(_)),
            "registering layout"
        );

        for &p in &parents {
            if let Some(parent) = self.slot_mut(p) {
                parent.add_child(index);
            }
        }
        let layout = Layout::new(
            index,
            description,
            kind,
            liveable,
            parents.into_iter().collect::<BTreeSet<_>>(),
            liveable_ancestor,
            ancestors,
        );
        if self.layouts.len() <= index.index() {
            self.layouts.resize_with(index.index() + 1, || None);
        }
        self.layouts[index.index()] = Some(layout);
        self.count += 1;
        Ok(index)
    }

    fn slot_mut(&mut self, index: LayoutIndex) -> Option<&mut Layout> {
        self.layouts.get_mut(index.index()).and_then(Option::as_mut)
    }

    fn check_slot(&self, index: LayoutIndex) -> Result<(), HierarchyError> {
        if !self.allocator.is_reserved(index) {
            return Err(HierarchyError::IndexNotReserved { index });
        }
        match self.get(index) {
            Some(existing) => Err(HierarchyError::IndexInUse {
                index,
                existing: existing.describe().to_owned(),
            }),
            None => Ok(()),
        }
    }

    /// Registered, non-empty, and (when validating) an antichain.
    fn check_parents(
        &self,
        description: &str,
        parents: &[LayoutIndex],
    ) -> Result<(), HierarchyError> {
        if parents.is_empty() {
            return Err(HierarchyError::MissingParent {
                layout: description.to_owned(),
            });
        }
        let mut nodes: SmallVec<[&Layout; 4]> = SmallVec::with_capacity(parents.len());
        for &parent in parents {
            match self.get(parent) {
                Some(node) => nodes.push(node),
                None => {
                    return Err(HierarchyError::UnknownParent {
                        layout: description.to_owned(),
                        parent,
                    })
                }
            }
        }
        if !self.validate {
            return Ok(());
        }
        for via in &nodes {
            for &parent in parents {
                if parent != via.index() && via.is_descendant_of(parent) {
                    return Err(HierarchyError::NonImmediateParent {
                        layout: description.to_owned(),
                        parent,
                        via: via.index(),
                    });
                }
            }
        }
        Ok(())
    }

    /// The new node's strict ancestors and its least liveable ancestor
    /// (`None` when the node is its own).
    fn inherit(
        &self,
        description: &str,
        parents: &[LayoutIndex],
        liveable: bool,
    ) -> Result<(FxHashSet<LayoutIndex>, Option<LayoutIndex>), HierarchyError> {
        let nodes: SmallVec<[&Layout; 4]> = parents.iter().filter_map(|&p| self.get(p)).collect();

        let mut ancestors = FxHashSet::default();
        for node in &nodes {
            ancestors.extend(node.ancestors().iter().copied());
        }
        if liveable {
            return Ok((ancestors, None));
        }

        let Some(first) = nodes.first() else {
            return Ok((ancestors, None));
        };
        if self.validate {
            if let Some(live) = nodes.iter().find(|n| n.is_liveable()) {
                if nodes.len() > 1 {
                    return Err(HierarchyError::LiveableParentNotUnique {
                        layout: description.to_owned(),
                        parent: live.index(),
                    });
                }
            }
            let first_live = first.liveable_ancestor();
            if let Some(other) = nodes
                .iter()
                .map(|n| n.liveable_ancestor())
                .find(|&a| a != first_live)
            {
                return Err(HierarchyError::AmbiguousLiveableAncestor {
                    layout: description.to_owned(),
                    first: first_live,
                    second: other,
                });
            }
        }
        Ok((ancestors, Some(first.liveable_ancestor())))
    }

    /// A new node with strict ancestors `ancestors` must have a unique join
    /// with every registered node.
    fn check_joins(
        &self,
        description: &str,
        ancestors: &FxHashSet<LayoutIndex>,
    ) -> Result<(), HierarchyError> {
        for other in self.layouts.iter().flatten() {
            let common = lattice::intersect(ancestors, other.ancestors());
            let candidates = lattice::extremal(&common, |c| self.get(c).map(Layout::ancestors));
            if candidates.len() != 1 {
                return Err(HierarchyError::NonUniqueJoin {
                    layout: description.to_owned(),
                    other: other.index(),
                    candidates,
                });
            }
        }
        Ok(())
    }

    // ── Sealing ─────────────────────────────────────────────────────

    /// Seal the hierarchy.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn finalize(self) -> LayoutHierarchy {
        LayoutHierarchy::seal(self.layouts, self.count, self.validate)
    }
}

impl Default for HierarchyBuilder {
    fn default() -> Self {
        Self::new()
    }
}
