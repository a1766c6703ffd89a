//! The sealed layout hierarchy and its lattice operations.
//!
//! A [`LayoutHierarchy`] is produced once by
//! [`HierarchyBuilder::finalize`](crate::HierarchyBuilder::finalize) and is
//! immutable afterwards: every query is a read of index sets, so the
//! hierarchy is shared freely across threads.
//!
//! # Operations
//!
//! - [`is_subtype`](LayoutHierarchy::is_subtype): `a <= b` iff `b` is among
//!   `a`'s ancestors.
//! - [`join`](LayoutHierarchy::join): breadth-first search upward from `a`
//!   for the first common ancestor whose own ancestors are exactly the
//!   common ancestors.
//! - [`meet`](LayoutHierarchy::meet): the same search downward; `None` when
//!   the layouts share no descendant.
//! - [`liveable_ancestor`](LayoutHierarchy::liveable_ancestor): cached at
//!   registration.

use bespoke_base::LayoutIndex;
use rustc_hash::FxHashSet;

use crate::irgen::Dispatch;
use crate::lattice;
use crate::layout::{ConcreteLayout, Layout};

mod snapshot;

pub use snapshot::{HierarchySnapshot, LayoutSnapshot};

/// The immutable, validated layout lattice.
#[derive(Debug)]
pub struct LayoutHierarchy {
    layouts: Vec<Option<Layout>>,
    count: usize,
    validated: bool,
}

impl LayoutHierarchy {
    pub(crate) fn seal(mut layouts: Vec<Option<Layout>>, count: usize, validated: bool) -> Self {
        let mut descendants: Vec<FxHashSet<LayoutIndex>> =
            vec![FxHashSet::default(); layouts.len()];
        for layout in layouts.iter().flatten() {
            for &a in layout.ancestors() {
                descendants[a.index()].insert(layout.index());
            }
        }

        // A union whose concrete members all share one vtable can call it
        // directly. Top also covers vanilla arrays, so it stays virtual.
        let mut uniform: Vec<Option<Dispatch>> = vec![None; layouts.len()];
        for layout in layouts.iter().flatten() {
            if layout.is_concrete() || layout.index().is_top() {
                continue;
            }
            let mut vtables = descendants[layout.index().index()]
                .iter()
                .filter_map(|d| layouts[d.index()].as_ref().and_then(Layout::vtable));
            if let Some(first) = vtables.next() {
                if vtables.all(|vt| std::ptr::eq(vt, first)) {
                    uniform[layout.index().index()] = Some(Dispatch::Direct(first));
                }
            }
        }

        for ((slot, desc), dispatch) in layouts.iter_mut().zip(descendants).zip(uniform) {
            if let Some(layout) = slot {
                layout.set_descendants(desc);
                if let Some(dispatch) = dispatch {
                    layout.set_dispatch(dispatch);
                }
            }
        }

        tracing::debug!(layouts = count, validated, "sealed layout hierarchy");
        Self {
            layouts,
            count,
            validated,
        }
    }

    /// The layout registered at `index`, or `None` if the index was never
    /// assigned.
    pub fn layout(&self, index: LayoutIndex) -> Option<&Layout> {
        self.layouts.get(index.index()).and_then(Option::as_ref)
    }

    /// The concrete layout at `index`; `None` if absent or abstract.
    pub fn concrete(&self, index: LayoutIndex) -> Option<ConcreteLayout<'_>> {
        self.layout(index).and_then(ConcreteLayout::new)
    }

    pub fn top(&self) -> &Layout {
        self.node(LayoutIndex::TOP)
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Whether registration-time validation ran on every node.
    pub fn is_validated(&self) -> bool {
        self.validated
    }

    /// All layouts in index order.
    pub fn iter(&self) -> impl Iterator<Item = &Layout> + '_ {
        self.layouts.iter().flatten()
    }

    fn node(&self, index: LayoutIndex) -> &Layout {
        match self.layout(index) {
            Some(layout) => layout,
            None => panic!("no layout registered at {index}"),
        }
    }

    // ── Lattice operations ──────────────────────────────────────────

    /// `a <= b`.
    pub fn is_subtype(&self, a: LayoutIndex, b: LayoutIndex) -> bool {
        let result = self.node(b).descendants().contains(&self.node(a).index());
        tracing::trace!(%a, %b, result, "is_subtype");
        result
    }

    /// Least upper bound of `a` and `b`.
    pub fn join(&self, a: LayoutIndex, b: LayoutIndex) -> LayoutIndex {
        let (na, nb) = (self.node(a), self.node(b));
        let common = lattice::intersect(na.ancestors(), nb.ancestors());
        let join = lattice::nearest_bound(
            a,
            &common,
            |v| self.node(v).parents(),
            |v| self.node(v).ancestors().len(),
        );
        tracing::trace!(%a, %b, ?join, "join");
        match join {
            Some(join) => join,
            None => {
                debug_assert!(
                    !self.validated,
                    "validated hierarchy lacks join of {a} and {b}"
                );
                LayoutIndex::TOP
            }
        }
    }

    /// Greatest lower bound of `a` and `b`, if they share a descendant.
    pub fn meet(&self, a: LayoutIndex, b: LayoutIndex) -> Option<LayoutIndex> {
        let (na, nb) = (self.node(a), self.node(b));
        let common = lattice::intersect(na.descendants(), nb.descendants());
        let meet = lattice::nearest_bound(
            a,
            &common,
            |v| self.node(v).children(),
            |v| self.node(v).descendants().len(),
        );
        // Unique joins for every pair make the meet of any two layouts with
        // a common descendant exist: it is the join of all their common
        // descendants.
        debug_assert!(
            !self.validated || meet.is_some() || common.is_empty(),
            "validated hierarchy lacks meet of {a} and {b}: maximal common descendants {:?}",
            lattice::extremal(&common, |c| self.layout(c).map(Layout::descendants))
        );
        tracing::trace!(%a, %b, ?meet, "meet");
        meet
    }

    /// Least liveable ancestor of `a` (itself when liveable).
    pub fn liveable_ancestor(&self, a: LayoutIndex) -> LayoutIndex {
        self.node(a).liveable_ancestor()
    }

    /// Whether `a` is concrete; unknown indices are not.
    pub fn is_concrete(&self, a: LayoutIndex) -> bool {
        self.layout(a).is_some_and(Layout::is_concrete)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
