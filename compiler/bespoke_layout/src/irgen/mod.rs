//! Code-generation hooks.
//!
//! The compiler reaches layouts through [`IrGen`], an opaque capability
//! that emits instructions. This crate never inspects generator state; it
//! only decides *which* logical operations to emit for a layout and how
//! the backend should dispatch them.
//!
//! # Dispatch
//!
//! Every emitted operation carries a [`LayoutData`]:
//!
//! - [`Dispatch::Direct`]: the layout's vtable is statically known (a
//!   concrete layout, or a union whose concrete members all share one
//!   vtable); the backend calls the entry directly.
//! - [`Dispatch::Virtual`]: the generic runtime path, which selects the
//!   vtable from the array header or falls back to the vanilla
//!   implementation (see [`crate::runtime`]).
//!
//! Hooks with no primitive to lower to return [`Punt`], and the caller
//! falls back to its generic translation.

use std::fmt;

use bespoke_array::LayoutFunctions;
use bespoke_base::LayoutIndex;

/// Instruction emitter supplied by the compiler.
pub trait IrGen {
    /// An SSA value.
    type Tmp: Copy;
    /// A branch target.
    type Block: Copy;

    /// Emit `op` over `srcs`, returning its result.
    fn gen(&mut self, op: BespokeOp, data: LayoutData, srcs: &[Self::Tmp]) -> Self::Tmp;

    /// Branch to `taken` when `val` is the missing-element marker; yield
    /// `val` on the fall-through path.
    fn gen_check_missing(&mut self, val: Self::Tmp, taken: Self::Block) -> Self::Tmp;

    fn cns_bool(&mut self, b: bool) -> Self::Tmp;

    fn cns_str(&mut self, s: &'static str) -> Self::Tmp;
}

/// Logical operations a layout can ask the backend to emit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BespokeOp {
    /// `[arr, key]` → value or the missing marker.
    Get,
    /// `[lval, key, throw_on_missing]` → element pointer.
    Elem,
    /// `[arr, key, val]` → resulting array.
    Set,
    /// `[arr, val]` → resulting array.
    Append,
    /// `[arr, reason]` → vanilla array.
    EscalateToVanilla,
    /// `[arr]` → position of the first element.
    IterFirstPos,
    /// `[arr]` → position of the last element.
    IterLastPos,
    /// `[arr, pos]` → next position.
    IterAdvancePos,
    /// `[arr, elm]` → key.
    IterGetKey,
    /// `[arr, elm]` → value.
    IterGetVal,
}

/// How the backend should call into the array implementation.
#[derive(Copy, Clone)]
pub enum Dispatch {
    Direct(&'static LayoutFunctions),
    Virtual,
}

impl PartialEq for Dispatch {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Dispatch::Direct(a), Dispatch::Direct(b)) => std::ptr::eq(*a, *b),
            (Dispatch::Virtual, Dispatch::Virtual) => true,
            _ => false,
        }
    }
}

impl Eq for Dispatch {}

impl fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dispatch::Direct(vt) => write!(f, "Direct({:p})", *vt),
            Dispatch::Virtual => write!(f, "Virtual"),
        }
    }
}

/// Extra data attached to every emitted operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LayoutData {
    pub layout: LayoutIndex,
    pub dispatch: Dispatch,
}

/// A hook with no specialized lowering for this layout.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("no specialized lowering for `{op}` on {layout}")]
pub struct Punt {
    pub op: &'static str,
    pub layout: LayoutIndex,
}

type Hook<G> = Result<<G as IrGen>::Tmp, Punt>;

impl LayoutData {
    pub fn new(layout: LayoutIndex, dispatch: Dispatch) -> Self {
        Self { layout, dispatch }
    }

    fn punt(self, op: &'static str) -> Punt {
        tracing::debug!(layout = %self.layout, op, "punting code-generation hook");
        Punt {
            op,
            layout: self.layout,
        }
    }

    /// Value at `key`, branching to `taken` when it is missing.
    pub fn emit_get<G: IrGen>(
        self,
        gen: &mut G,
        arr: G::Tmp,
        key: G::Tmp,
        taken: G::Block,
    ) -> Hook<G> {
        let val = gen.gen(BespokeOp::Get, self, &[arr, key]);
        Ok(gen.gen_check_missing(val, taken))
    }

    /// Element pointer for a base operation. With `throw_on_missing` unset
    /// a missing key yields a pointer to an immutable null.
    pub fn emit_elem<G: IrGen>(
        self,
        gen: &mut G,
        lval: G::Tmp,
        key: G::Tmp,
        throw_on_missing: bool,
    ) -> Hook<G> {
        let throw = gen.cns_bool(throw_on_missing);
        Ok(gen.gen(BespokeOp::Elem, self, &[lval, key, throw]))
    }

    pub fn emit_set<G: IrGen>(self, gen: &mut G, arr: G::Tmp, key: G::Tmp, val: G::Tmp) -> Hook<G> {
        Ok(gen.gen(BespokeOp::Set, self, &[arr, key, val]))
    }

    pub fn emit_append<G: IrGen>(self, gen: &mut G, arr: G::Tmp, val: G::Tmp) -> Hook<G> {
        Ok(gen.gen(BespokeOp::Append, self, &[arr, val]))
    }

    pub fn emit_escalate_to_vanilla<G: IrGen>(
        self,
        gen: &mut G,
        arr: G::Tmp,
        reason: &'static str,
    ) -> Hook<G> {
        let reason = gen.cns_str(reason);
        Ok(gen.gen(BespokeOp::EscalateToVanilla, self, &[arr, reason]))
    }

    pub fn emit_iter_first_pos<G: IrGen>(self, gen: &mut G, arr: G::Tmp) -> Hook<G> {
        Ok(gen.gen(BespokeOp::IterFirstPos, self, &[arr]))
    }

    pub fn emit_iter_last_pos<G: IrGen>(self, gen: &mut G, arr: G::Tmp) -> Hook<G> {
        Ok(gen.gen(BespokeOp::IterLastPos, self, &[arr]))
    }

    /// Position of the `idx`-th element. No vtable entry computes this.
    pub fn emit_iter_pos<G: IrGen>(self, _gen: &mut G, _arr: G::Tmp, _idx: G::Tmp) -> Hook<G> {
        Err(self.punt("iter_pos"))
    }

    pub fn emit_iter_advance_pos<G: IrGen>(self, gen: &mut G, arr: G::Tmp, pos: G::Tmp) -> Hook<G> {
        Ok(gen.gen(BespokeOp::IterAdvancePos, self, &[arr, pos]))
    }

    /// Positions are dense in every representation, so a position is
    /// already an element handle.
    pub fn emit_iter_elm<G: IrGen>(self, _gen: &mut G, _arr: G::Tmp, pos: G::Tmp) -> Hook<G> {
        Ok(pos)
    }

    pub fn emit_iter_get_key<G: IrGen>(self, gen: &mut G, arr: G::Tmp, elm: G::Tmp) -> Hook<G> {
        Ok(gen.gen(BespokeOp::IterGetKey, self, &[arr, elm]))
    }

    pub fn emit_iter_get_val<G: IrGen>(self, gen: &mut G, arr: G::Tmp, elm: G::Tmp) -> Hook<G> {
        Ok(gen.gen(BespokeOp::IterGetVal, self, &[arr, elm]))
    }
}

#[cfg(test)]
pub(crate) mod recorder;
