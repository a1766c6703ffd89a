//! Generic array operations for code that does not know an array's layout.
//!
//! This is what [`Dispatch::Virtual`](crate::Dispatch::Virtual) denotes:
//! vanilla arrays go straight to [`VanillaArray`], bespoke arrays go
//! through the vtable of the concrete layout named in their header.
//! Mutating operations install any replacement array in place, carrying the
//! legacy mark over.

use bespoke_array::{LayoutFunctions, Lval};
use bespoke_base::{ArrayData, ArrayFlags, KeyRef, LayoutIndex, TypedValue, VanillaArray};

use crate::registry;

/// Where an array's operations live.
enum Target {
    Vanilla,
    Bespoke(&'static LayoutFunctions),
}

fn target(ad: &ArrayData) -> Target {
    match ad.layout() {
        None => Target::Vanilla,
        Some(layout) => Target::Bespoke(vtable(ad, layout)),
    }
}

fn vtable(ad: &ArrayData, layout: LayoutIndex) -> &'static LayoutFunctions {
    match registry::concrete_vtable(layout) {
        Some(vt) => vt,
        None => panic!(
            "{} names {layout}, which is not a registered concrete layout",
            ad.id()
        ),
    }
}

fn vanilla(ad: &ArrayData) -> &VanillaArray {
    match ad.as_vanilla() {
        Some(arr) => arr,
        None => unreachable!("{} has a vanilla header but a bespoke body", ad.id()),
    }
}

fn vanilla_mut(ad: &mut ArrayData) -> &mut VanillaArray {
    if !ad.is_vanilla() {
        unreachable!("{} is not vanilla", ad.id());
    }
    match ad.as_vanilla_mut() {
        Some(arr) => arr,
        None => unreachable!("vanilla header with a bespoke body"),
    }
}

/// Replace `ad` with an escalated vanilla copy, keeping the legacy mark.
fn install_vanilla(ad: &mut ArrayData, arr: VanillaArray) {
    let mut new = ArrayData::vanilla(arr);
    new.inherit_flags(ad.flags() & ArrayFlags::LEGACY);
    *ad = new;
}

// ── Reads ───────────────────────────────────────────────────────────

pub fn get(ad: &ArrayData, key: KeyRef<'_>) -> Option<TypedValue> {
    match target(ad) {
        Target::Vanilla => vanilla(ad).get(key).cloned(),
        Target::Bespoke(vt) => match key {
            KeyRef::Int(k) => (vt.get_int)(ad, k),
            KeyRef::Str(k) => (vt.get_str)(ad, k),
        },
    }
}

pub fn is_vector_data(ad: &ArrayData) -> bool {
    match target(ad) {
        Target::Vanilla => vanilla(ad).is_vector_data(),
        Target::Bespoke(vt) => (vt.is_vector_data)(ad),
    }
}

pub fn heap_size(ad: &ArrayData) -> usize {
    match target(ad) {
        Target::Vanilla => vanilla(ad).heap_size(),
        Target::Bespoke(vt) => (vt.heap_size)(ad),
    }
}

// ── Iteration ───────────────────────────────────────────────────────

pub fn iter_begin(ad: &ArrayData) -> usize {
    match target(ad) {
        Target::Vanilla => vanilla(ad).iter_begin(),
        Target::Bespoke(vt) => (vt.iter_begin)(ad),
    }
}

pub fn iter_last(ad: &ArrayData) -> usize {
    match target(ad) {
        Target::Vanilla => vanilla(ad).iter_last(),
        Target::Bespoke(vt) => (vt.iter_last)(ad),
    }
}

pub fn iter_end(ad: &ArrayData) -> usize {
    match target(ad) {
        Target::Vanilla => vanilla(ad).iter_end(),
        Target::Bespoke(vt) => (vt.iter_end)(ad),
    }
}

pub fn iter_advance(ad: &ArrayData, pos: usize) -> usize {
    match target(ad) {
        Target::Vanilla => vanilla(ad).iter_advance(pos),
        Target::Bespoke(vt) => (vt.iter_advance)(ad, pos),
    }
}

pub fn iter_rewind(ad: &ArrayData, pos: usize) -> usize {
    match target(ad) {
        Target::Vanilla => vanilla(ad).iter_rewind(pos),
        Target::Bespoke(vt) => (vt.iter_rewind)(ad, pos),
    }
}

/// Key at `pos`, or `Uninit` past the end.
pub fn get_key_at(ad: &ArrayData, pos: usize) -> TypedValue {
    match target(ad) {
        Target::Vanilla => vanilla(ad)
            .key_at(pos)
            .map_or(TypedValue::Uninit, |k| TypedValue::from(k.clone())),
        Target::Bespoke(vt) => (vt.get_key)(ad, pos),
    }
}

/// Value at `pos`, or `Uninit` past the end.
pub fn get_val_at(ad: &ArrayData, pos: usize) -> TypedValue {
    match target(ad) {
        Target::Vanilla => vanilla(ad).val_at(pos).cloned().unwrap_or_default(),
        Target::Bespoke(vt) => (vt.get_val)(ad, pos),
    }
}

// ── Writes ──────────────────────────────────────────────────────────

pub fn set(ad: &mut ArrayData, key: KeyRef<'_>, value: TypedValue) {
    match target(ad) {
        Target::Vanilla => vanilla_mut(ad).set(key.to_key(), value),
        Target::Bespoke(vt) => {
            let out = match key {
                KeyRef::Int(k) => (vt.set_int_move)(ad, k, value),
                KeyRef::Str(k) => (vt.set_str_move)(ad, k, value),
            };
            out.apply_to(ad);
        }
    }
}

pub fn append(ad: &mut ArrayData, value: TypedValue) {
    match target(ad) {
        Target::Vanilla => vanilla_mut(ad).append(value),
        Target::Bespoke(vt) => (vt.append_move)(ad, value).apply_to(ad),
    }
}

pub fn remove(ad: &mut ArrayData, key: KeyRef<'_>) {
    match target(ad) {
        Target::Vanilla => {
            vanilla_mut(ad).remove(key);
        }
        Target::Bespoke(vt) => {
            let out = match key {
                KeyRef::Int(k) => (vt.remove_int)(ad, k),
                KeyRef::Str(k) => (vt.remove_str)(ad, k),
            };
            out.apply_to(ad);
        }
    }
}

/// Remove and return the last element (`null` when empty).
pub fn pop(ad: &mut ArrayData) -> TypedValue {
    match target(ad) {
        Target::Vanilla => vanilla_mut(ad).pop().unwrap_or(TypedValue::Null),
        Target::Bespoke(vt) => {
            let (out, value) = (vt.pop)(ad);
            out.apply_to(ad);
            value
        }
    }
}

/// Run `f` on the writable slot for `key`, creating it as `null` when
/// missing. Layouts that cannot hand out a slot are escalated first.
pub fn with_lval<R>(
    ad: &mut ArrayData,
    key: KeyRef<'_>,
    f: impl FnOnce(&mut TypedValue) -> R,
) -> R {
    let escalated = match target(ad) {
        Target::Vanilla => return f(vanilla_mut(ad).lval(key.to_key())),
        Target::Bespoke(vt) => {
            let lval = match key {
                KeyRef::Int(k) => (vt.lval_int)(ad, k),
                KeyRef::Str(k) => (vt.lval_str)(ad, k),
            };
            match lval {
                Lval::Slot(slot) => return f(slot),
                Lval::Escalated(arr) => arr,
            }
        }
    };
    tracing::debug!(array = %ad.id(), "lval escalated");
    install_vanilla(ad, escalated);
    f(vanilla_mut(ad).lval(key.to_key()))
}

// ── Conversions ─────────────────────────────────────────────────────

/// A vanilla copy of `ad`, keeping the legacy mark.
pub fn escalate_to_vanilla(ad: &ArrayData, reason: &'static str) -> ArrayData {
    match target(ad) {
        Target::Vanilla => {
            let mut copy = ArrayData::vanilla(vanilla(ad).clone());
            copy.inherit_flags(ad.flags() & ArrayFlags::LEGACY);
            copy
        }
        Target::Bespoke(vt) => (vt.escalate_to_vanilla)(ad, reason),
    }
}

/// Release an array, letting its layout run its teardown.
pub fn release(ad: ArrayData) {
    match target(&ad) {
        Target::Vanilla => drop(ad),
        Target::Bespoke(vt) => (vt.release)(ad),
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
