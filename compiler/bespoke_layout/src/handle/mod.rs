//! `BespokeLayout`: the compiler-facing layout handle.
//!
//! A handle is a [`LayoutIndex`] that answers lattice questions and
//! forwards code-generation hooks through the process-wide
//! [registry](crate::registry), so compiler code can treat concrete and
//! abstract layouts uniformly.
//!
//! # Before sealing
//!
//! Until [`finalize_hierarchy`](crate::registry::finalize_hierarchy) runs,
//! lattice queries only answer for the top layout: `x | top == top`,
//! `x & top == x`, `x <= top`, and every liveable ancestor is top. Any other
//! lattice query panics, since its answer could change as more layouts
//! register. Descriptions and the hook data of top and concrete layouts are
//! fixed at registration and answer in either phase.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{BitAnd, BitOr};

use bespoke_base::LayoutIndex;

use crate::irgen::{Dispatch, IrGen, LayoutData, Punt};
use crate::registry;
use crate::LayoutHierarchy;

/// Handle to a registered layout. Equality is index equality.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct BespokeLayout(LayoutIndex);

#[cold]
#[inline(never)]
fn unsealed(op: &str, a: BespokeLayout, b: Option<BespokeLayout>) -> ! {
    match b {
        Some(b) => panic!(
            "`{op}` on {} and {} before the layout hierarchy is sealed",
            a.0, b.0
        ),
        None => panic!("`{op}` on {} before the layout hierarchy is sealed", a.0),
    }
}

impl BespokeLayout {
    /// The universal layout.
    pub const fn top() -> Self {
        Self(LayoutIndex::TOP)
    }

    /// Handle for a registered layout; `None` if `index` was never assigned.
    pub fn from_index(index: LayoutIndex) -> Option<Self> {
        registry::is_registered(index).then_some(Self(index))
    }

    #[inline]
    pub fn index(self) -> LayoutIndex {
        self.0
    }

    #[inline]
    pub fn is_top(self) -> bool {
        self.0.is_top()
    }

    fn sealed() -> Option<&'static LayoutHierarchy> {
        registry::hierarchy()
    }

    /// Human-readable description; available as soon as the layout is
    /// registered.
    pub fn describe(self) -> &'static str {
        registry::description(self.0).unwrap_or("<unregistered>")
    }

    /// Whether the layout owns a vtable.
    pub fn is_concrete(self) -> bool {
        match Self::sealed() {
            Some(h) => h.is_concrete(self.0),
            None => registry::concrete_vtable(self.0).is_some(),
        }
    }

    /// Least liveable ancestor; top before sealing.
    pub fn liveable_ancestor(self) -> Self {
        match Self::sealed() {
            Some(h) => Self(h.liveable_ancestor(self.0)),
            None => Self::top(),
        }
    }

    /// `self <= other` in the lattice.
    pub fn is_subtype_of(self, other: Self) -> bool {
        if self == other || other.is_top() {
            return true;
        }
        match Self::sealed() {
            Some(h) => h.is_subtype(self.0, other.0),
            None if self.is_top() => false,
            None => unsealed("<=", self, Some(other)),
        }
    }

    /// Least upper bound.
    pub fn join(self, other: Self) -> Self {
        if self.is_top() || other.is_top() {
            return Self::top();
        }
        match Self::sealed() {
            Some(h) => Self(h.join(self.0, other.0)),
            None => unsealed("|", self, Some(other)),
        }
    }

    /// Greatest lower bound, if the layouts share a descendant.
    pub fn meet(self, other: Self) -> Option<Self> {
        if self.is_top() {
            return Some(other);
        }
        if other.is_top() {
            return Some(self);
        }
        match Self::sealed() {
            Some(h) => h.meet(self.0, other.0).map(Self),
            None => unsealed("&", self, Some(other)),
        }
    }

    /// Hook data for this layout.
    ///
    /// Before sealing, top and concrete layouts already know their dispatch;
    /// an abstract layout's depends on the layouts registered below it.
    pub fn layout_data(self) -> LayoutData {
        if let Some(h) = Self::sealed() {
            return match h.layout(self.0) {
                Some(layout) => layout.layout_data(),
                None => panic!("no layout registered at {}", self.0),
            };
        }
        if self.is_top() {
            return LayoutData::new(LayoutIndex::TOP, Dispatch::Virtual);
        }
        match registry::concrete_vtable(self.0) {
            Some(vt) => LayoutData::new(self.0, Dispatch::Direct(vt)),
            None => unsealed("layout_data", self, None),
        }
    }

    // ── Code-generation hooks ───────────────────────────────────────

    pub fn emit_get<G: IrGen>(
        self,
        gen: &mut G,
        arr: G::Tmp,
        key: G::Tmp,
        taken: G::Block,
    ) -> Result<G::Tmp, Punt> {
        self.layout_data().emit_get(gen, arr, key, taken)
    }

    pub fn emit_elem<G: IrGen>(
        self,
        gen: &mut G,
        lval: G::Tmp,
        key: G::Tmp,
        throw_on_missing: bool,
    ) -> Result<G::Tmp, Punt> {
        self.layout_data().emit_elem(gen, lval, key, throw_on_missing)
    }

    pub fn emit_set<G: IrGen>(
        self,
        gen: &mut G,
        arr: G::Tmp,
        key: G::Tmp,
        val: G::Tmp,
    ) -> Result<G::Tmp, Punt> {
        self.layout_data().emit_set(gen, arr, key, val)
    }

    pub fn emit_append<G: IrGen>(
        self,
        gen: &mut G,
        arr: G::Tmp,
        val: G::Tmp,
    ) -> Result<G::Tmp, Punt> {
        self.layout_data().emit_append(gen, arr, val)
    }

    pub fn emit_escalate_to_vanilla<G: IrGen>(
        self,
        gen: &mut G,
        arr: G::Tmp,
        reason: &'static str,
    ) -> Result<G::Tmp, Punt> {
        self.layout_data().emit_escalate_to_vanilla(gen, arr, reason)
    }

    pub fn emit_iter_first_pos<G: IrGen>(self, gen: &mut G, arr: G::Tmp) -> Result<G::Tmp, Punt> {
        self.layout_data().emit_iter_first_pos(gen, arr)
    }

    pub fn emit_iter_last_pos<G: IrGen>(self, gen: &mut G, arr: G::Tmp) -> Result<G::Tmp, Punt> {
        self.layout_data().emit_iter_last_pos(gen, arr)
    }

    pub fn emit_iter_pos<G: IrGen>(
        self,
        gen: &mut G,
        arr: G::Tmp,
        idx: G::Tmp,
    ) -> Result<G::Tmp, Punt> {
        self.layout_data().emit_iter_pos(gen, arr, idx)
    }

    pub fn emit_iter_advance_pos<G: IrGen>(
        self,
        gen: &mut G,
        arr: G::Tmp,
        pos: G::Tmp,
    ) -> Result<G::Tmp, Punt> {
        self.layout_data().emit_iter_advance_pos(gen, arr, pos)
    }

    pub fn emit_iter_elm<G: IrGen>(
        self,
        gen: &mut G,
        arr: G::Tmp,
        pos: G::Tmp,
    ) -> Result<G::Tmp, Punt> {
        self.layout_data().emit_iter_elm(gen, arr, pos)
    }

    pub fn emit_iter_get_key<G: IrGen>(
        self,
        gen: &mut G,
        arr: G::Tmp,
        elm: G::Tmp,
    ) -> Result<G::Tmp, Punt> {
        self.layout_data().emit_iter_get_key(gen, arr, elm)
    }

    pub fn emit_iter_get_val<G: IrGen>(
        self,
        gen: &mut G,
        arr: G::Tmp,
        elm: G::Tmp,
    ) -> Result<G::Tmp, Punt> {
        self.layout_data().emit_iter_get_val(gen, arr, elm)
    }
}

/// The lattice order: `None` for incomparable layouts.
impl PartialOrd for BespokeLayout {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            Some(Ordering::Equal)
        } else if self.is_subtype_of(*other) {
            Some(Ordering::Less)
        } else if other.is_subtype_of(*self) {
            Some(Ordering::Greater)
        } else {
            None
        }
    }
}

impl BitOr for BespokeLayout {
    type Output = BespokeLayout;

    fn bitor(self, rhs: Self) -> Self {
        self.join(rhs)
    }
}

impl BitAnd for BespokeLayout {
    type Output = Option<BespokeLayout>;

    fn bitand(self, rhs: Self) -> Option<Self> {
        self.meet(rhs)
    }
}

impl fmt::Debug for BespokeLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BespokeLayout({})", self.0)
    }
}

impl From<BespokeLayout> for LayoutIndex {
    fn from(layout: BespokeLayout) -> Self {
        layout.0
    }
}
