//! Per-operation dispatchers instantiated into a `LayoutFunctions`.
//!
//! `C` selects the checked (`true`) or unchecked (`false`) cast. Header
//! bookkeeping (flags carried over to replacement arrays, legacy and
//! dv-array marks) happens here so representations never touch headers.

use bespoke_base::{ArrayData, ArrayFlags, SortFunction, TypedValue};

use crate::seam::{cast, cast_mut, cast_owned, cast_quiet};
use crate::{ArrayError, BespokeArray, Elem, Lval, Scanner, Updated};

/// Carry the legacy mark over to a replacement array.
fn finish(ad: &ArrayData, mut out: Updated) -> Updated {
    if let Updated::Replaced(new) = &mut out {
        new.inherit_flags(ad.flags() & ArrayFlags::LEGACY);
    }
    out
}

/// Apply `flag` to whichever array survives the operation.
fn mark(ad: &mut ArrayData, mut out: Updated, flag: ArrayFlags, on: bool) -> Updated {
    match &mut out {
        Updated::InPlace => ad.set_flag(flag, on),
        Updated::Replaced(new) => new.set_flag(flag, on),
    }
    out
}

pub(super) fn heap_size<A: BespokeArray, const C: bool>(ad: &ArrayData) -> usize {
    cast_quiet::<A, C>(ad).heap_size()
}

pub(super) fn scan<A: BespokeArray, const C: bool>(ad: &ArrayData, scanner: &mut dyn Scanner) {
    cast::<A, C>(ad, "scan").scan(scanner);
}

pub(super) fn escalate_to_vanilla<A: BespokeArray, const C: bool>(
    ad: &ArrayData,
    reason: &'static str,
) -> ArrayData {
    let arr = cast::<A, C>(ad, "escalate_to_vanilla").escalate_to_vanilla(reason);
    tracing::debug!(array = %ad.id(), kind = %ad.kind(), reason, "escalating to vanilla");
    let mut out = ArrayData::vanilla(arr);
    out.inherit_flags(ad.flags() & ArrayFlags::LEGACY);
    out
}

pub(super) fn convert_to_uncounted<A: BespokeArray, const C: bool>(ad: &mut ArrayData) {
    cast_mut::<A, C>(ad, "convert_to_uncounted").convert_to_uncounted();
    ad.set_flag(ArrayFlags::UNCOUNTED, true);
}

pub(super) fn release_uncounted<A: BespokeArray, const C: bool>(ad: ArrayData) {
    cast_owned::<A, C>(ad, "release_uncounted").release_uncounted();
}

pub(super) fn release<A: BespokeArray, const C: bool>(ad: ArrayData) {
    cast_owned::<A, C>(ad, "release").release();
}

pub(super) fn is_vector_data<A: BespokeArray, const C: bool>(ad: &ArrayData) -> bool {
    cast::<A, C>(ad, "is_vector_data").is_vector_data()
}

pub(super) fn get_int<A: BespokeArray, const C: bool>(
    ad: &ArrayData,
    k: i64,
) -> Option<TypedValue> {
    cast::<A, C>(ad, "get_int").get_int(k)
}

pub(super) fn get_str<A: BespokeArray, const C: bool>(
    ad: &ArrayData,
    k: &str,
) -> Option<TypedValue> {
    cast::<A, C>(ad, "get_str").get_str(k)
}

pub(super) fn get_key<A: BespokeArray, const C: bool>(ad: &ArrayData, pos: usize) -> TypedValue {
    cast::<A, C>(ad, "get_key").get_key(pos)
}

pub(super) fn get_val<A: BespokeArray, const C: bool>(ad: &ArrayData, pos: usize) -> TypedValue {
    cast::<A, C>(ad, "get_val").get_val(pos)
}

pub(super) fn get_int_pos<A: BespokeArray, const C: bool>(ad: &ArrayData, k: i64) -> usize {
    cast::<A, C>(ad, "get_int_pos").get_int_pos(k)
}

pub(super) fn get_str_pos<A: BespokeArray, const C: bool>(ad: &ArrayData, k: &str) -> usize {
    cast::<A, C>(ad, "get_str_pos").get_str_pos(k)
}

pub(super) fn iter_begin<A: BespokeArray, const C: bool>(ad: &ArrayData) -> usize {
    cast::<A, C>(ad, "iter_begin").iter_begin()
}

pub(super) fn iter_last<A: BespokeArray, const C: bool>(ad: &ArrayData) -> usize {
    cast::<A, C>(ad, "iter_last").iter_last()
}

pub(super) fn iter_end<A: BespokeArray, const C: bool>(ad: &ArrayData) -> usize {
    cast::<A, C>(ad, "iter_end").iter_end()
}

pub(super) fn iter_advance<A: BespokeArray, const C: bool>(ad: &ArrayData, pos: usize) -> usize {
    cast::<A, C>(ad, "iter_advance").iter_advance(pos)
}

pub(super) fn iter_rewind<A: BespokeArray, const C: bool>(ad: &ArrayData, pos: usize) -> usize {
    cast::<A, C>(ad, "iter_rewind").iter_rewind(pos)
}

pub(super) fn lval_int<A: BespokeArray, const C: bool>(ad: &mut ArrayData, k: i64) -> Lval<'_> {
    cast_mut::<A, C>(ad, "lval_int").lval_int(k)
}

pub(super) fn lval_str<'a, A: BespokeArray, const C: bool>(
    ad: &'a mut ArrayData,
    k: &str,
) -> Lval<'a> {
    cast_mut::<A, C>(ad, "lval_str").lval_str(k)
}

pub(super) fn elem_int<A: BespokeArray, const C: bool>(
    ad: &ArrayData,
    k: i64,
    throw_on_missing: bool,
) -> Result<Elem<'_>, ArrayError> {
    cast::<A, C>(ad, "elem_int").elem_int(k, throw_on_missing)
}

pub(super) fn elem_str<'a, A: BespokeArray, const C: bool>(
    ad: &'a ArrayData,
    k: &str,
    throw_on_missing: bool,
) -> Result<Elem<'a>, ArrayError> {
    cast::<A, C>(ad, "elem_str").elem_str(k, throw_on_missing)
}

pub(super) fn set_int<A: BespokeArray, const C: bool>(
    ad: &mut ArrayData,
    k: i64,
    v: &TypedValue,
) -> Updated {
    let out = cast_mut::<A, C>(ad, "set_int").set_int(k, v);
    finish(ad, out)
}

pub(super) fn set_str<A: BespokeArray, const C: bool>(
    ad: &mut ArrayData,
    k: &str,
    v: &TypedValue,
) -> Updated {
    let out = cast_mut::<A, C>(ad, "set_str").set_str(k, v);
    finish(ad, out)
}

pub(super) fn set_int_move<A: BespokeArray, const C: bool>(
    ad: &mut ArrayData,
    k: i64,
    v: TypedValue,
) -> Updated {
    let out = cast_mut::<A, C>(ad, "set_int_move").set_int_move(k, v);
    finish(ad, out)
}

pub(super) fn set_str_move<A: BespokeArray, const C: bool>(
    ad: &mut ArrayData,
    k: &str,
    v: TypedValue,
) -> Updated {
    let out = cast_mut::<A, C>(ad, "set_str_move").set_str_move(k, v);
    finish(ad, out)
}

pub(super) fn remove_int<A: BespokeArray, const C: bool>(ad: &mut ArrayData, k: i64) -> Updated {
    let out = cast_mut::<A, C>(ad, "remove_int").remove_int(k);
    finish(ad, out)
}

pub(super) fn remove_str<A: BespokeArray, const C: bool>(ad: &mut ArrayData, k: &str) -> Updated {
    let out = cast_mut::<A, C>(ad, "remove_str").remove_str(k);
    finish(ad, out)
}

pub(super) fn append<A: BespokeArray, const C: bool>(
    ad: &mut ArrayData,
    v: &TypedValue,
) -> Updated {
    let out = cast_mut::<A, C>(ad, "append").append(v);
    finish(ad, out)
}

pub(super) fn append_move<A: BespokeArray, const C: bool>(
    ad: &mut ArrayData,
    v: TypedValue,
) -> Updated {
    let out = cast_mut::<A, C>(ad, "append_move").append_move(v);
    finish(ad, out)
}

pub(super) fn pop<A: BespokeArray, const C: bool>(ad: &mut ArrayData) -> (Updated, TypedValue) {
    let (out, value) = cast_mut::<A, C>(ad, "pop").pop();
    (finish(ad, out), value)
}

pub(super) fn to_dv_array<A: BespokeArray, const C: bool>(
    ad: &mut ArrayData,
    copy: bool,
) -> Updated {
    let out = cast_mut::<A, C>(ad, "to_dv_array").to_dv_array(copy);
    let out = finish(ad, out);
    mark(ad, out, ArrayFlags::DV_ARRAY, true)
}

pub(super) fn to_hack_arr<A: BespokeArray, const C: bool>(
    ad: &mut ArrayData,
    copy: bool,
) -> Updated {
    let out = cast_mut::<A, C>(ad, "to_hack_arr").to_hack_arr(copy);
    // Hack arrays are never legacy, so nothing carries over.
    mark(ad, out, ArrayFlags::DV_ARRAY | ArrayFlags::LEGACY, false)
}

pub(super) fn pre_sort<A: BespokeArray, const C: bool>(
    ad: &mut ArrayData,
    sf: SortFunction,
) -> ArrayData {
    let arr = cast_mut::<A, C>(ad, "pre_sort").pre_sort(sf);
    ArrayData::vanilla(arr)
}

pub(super) fn post_sort<A: BespokeArray, const C: bool>(
    ad: &mut ArrayData,
    sorted: ArrayData,
) -> Updated {
    let out = match sorted.into_vanilla() {
        Ok(arr) => cast_mut::<A, C>(ad, "post_sort").post_sort(arr),
        // The sort produced something other than the vanilla copy we handed
        // out; it simply replaces us.
        Err(other) => Updated::Replaced(other),
    };
    finish(ad, out)
}

pub(super) fn set_legacy_array<A: BespokeArray, const C: bool>(
    ad: &mut ArrayData,
    copy: bool,
    legacy: bool,
) -> Updated {
    let out = cast_mut::<A, C>(ad, "set_legacy_array").set_legacy_array(copy, legacy);
    mark(ad, out, ArrayFlags::LEGACY, legacy)
}
