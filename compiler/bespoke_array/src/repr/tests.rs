use bespoke_base::{ArrayData, ArrayKey, KeyRef, SortFunction, TypedValue, VanillaArray};
use pretty_assertions::assert_eq;

use super::{ArrayError, BespokeArray, Elem, Lval, Scanner, Updated};
use crate::testing::{EmptyArray, PackedVec};

#[derive(Default)]
struct Collect(Vec<TypedValue>);

impl Scanner for Collect {
    fn scan_value(&mut self, value: &TypedValue) {
        self.0.push(value.clone());
    }
}

// ── Updated ─────────────────────────────────────────────────────────

#[test]
fn in_place_leaves_target_alone() {
    let mut target = ArrayData::vanilla(VanillaArray::from_values([TypedValue::Int(1)]));
    let id = target.id();
    Updated::InPlace.apply_to(&mut target);
    assert_eq!(target.id(), id);
}

#[test]
fn replaced_installs_new_array() {
    let mut target = ArrayData::vanilla(VanillaArray::new());
    let out = Updated::escalated(VanillaArray::from_values([TypedValue::Int(7)]));
    assert!(!out.is_in_place());
    out.apply_to(&mut target);
    let arr = target.as_vanilla().unwrap();
    assert_eq!(arr.get(KeyRef::Int(0)), Some(&TypedValue::Int(7)));
}

// ── Errors and scanning ─────────────────────────────────────────────

#[test]
fn missing_key_message() {
    assert_eq!(
        ArrayError::MissingKey(ArrayKey::Int(3)).to_string(),
        "undefined array key 3"
    );
    assert_eq!(
        ArrayError::MissingKey(ArrayKey::str("k")).to_string(),
        "undefined array key \"k\""
    );
}

#[test]
fn scanner_default_scan_key_visits_string_keys_only() {
    let mut scanner = Collect::default();
    scanner.scan_key(&ArrayKey::Int(1));
    scanner.scan_key(&ArrayKey::str("name"));
    assert_eq!(scanner.0, vec![TypedValue::str("name")]);
}

#[test]
fn packed_scan_visits_values() {
    let mut scanner = Collect::default();
    PackedVec::of_ints(&[1, 2]).scan(&mut scanner);
    assert_eq!(scanner.0, vec![TypedValue::Int(1), TypedValue::Int(2)]);
}

// ── Default operations ──────────────────────────────────────────────

#[test]
fn copying_set_delegates_to_move_variant() {
    let mut vec = PackedVec::of_ints(&[1]);
    let v = TypedValue::Int(9);
    assert!(vec.set_int(0, &v).is_in_place());
    assert!(vec.append(&v).is_in_place());
    assert_eq!(vec, PackedVec::of_ints(&[9, 9]));
}

#[test]
fn default_pre_sort_escalates_a_copy() {
    let mut vec = PackedVec::of_ints(&[3, 1]);
    let arr = vec.pre_sort(SortFunction::Sort);
    assert_eq!(arr, VanillaArray::from_values([TypedValue::Int(3), TypedValue::Int(1)]));
    assert_eq!(vec.len(), 2);
}

#[test]
fn default_post_sort_replaces() {
    let mut empty = EmptyArray;
    let out = empty.post_sort(VanillaArray::from_values([TypedValue::Int(1)]));
    assert!(!out.is_in_place());
}

#[test]
fn default_conversions_are_in_place() {
    let mut vec = PackedVec::of_ints(&[1]);
    assert!(vec.to_dv_array(false).is_in_place());
    assert!(vec.to_hack_arr(true).is_in_place());
    assert!(vec.set_legacy_array(false, true).is_in_place());
}

// ── Reference representations ───────────────────────────────────────

#[test]
fn packed_reads() {
    let vec = PackedVec::of_ints(&[10, 20, 30]);
    assert_eq!(vec.get_int(1), Some(TypedValue::Int(20)));
    assert_eq!(vec.get_int(3), None);
    assert_eq!(vec.get_int(-1), None);
    assert_eq!(vec.get_str("0"), None);
    assert_eq!(vec.get_key(2), TypedValue::Int(2));
    assert_eq!(vec.get_key(3), TypedValue::Uninit);
    assert_eq!(vec.get_val(0), TypedValue::Int(10));
    assert_eq!(vec.get_int_pos(2), 2);
    assert_eq!(vec.get_int_pos(9), vec.iter_end());
}

#[test]
fn packed_iteration() {
    let vec = PackedVec::of_ints(&[1, 2]);
    assert_eq!(vec.iter_begin(), 0);
    assert_eq!(vec.iter_last(), 1);
    assert_eq!(vec.iter_advance(1), vec.iter_end());
    assert_eq!(vec.iter_rewind(1), 0);
    assert_eq!(vec.iter_rewind(0), vec.iter_end());

    let empty = PackedVec::default();
    assert_eq!(empty.iter_last(), empty.iter_end());
}

#[test]
fn packed_lval_appends_at_len() {
    let mut vec = PackedVec::of_ints(&[1]);
    match vec.lval_int(1) {
        Lval::Slot(slot) => *slot = TypedValue::Int(5),
        Lval::Escalated(_) => panic!("lval at len should stay packed"),
    }
    assert_eq!(vec, PackedVec::of_ints(&[1, 5]));
}

#[test]
fn packed_lval_out_of_shape_escalates() {
    let mut vec = PackedVec::of_ints(&[1]);
    assert!(matches!(vec.lval_int(5), Lval::Escalated(_)));
    assert!(matches!(vec.lval_str("x"), Lval::Escalated(_)));
}

#[test]
fn packed_elem_missing() {
    let vec = PackedVec::of_ints(&[1]);
    assert_eq!(vec.elem_int(0, true), Ok(Elem::Slot(&TypedValue::Int(1))));
    assert_eq!(vec.elem_int(4, false), Ok(Elem::Null));
    assert_eq!(
        vec.elem_str("k", true),
        Err(ArrayError::MissingKey(ArrayKey::str("k")))
    );
}

#[test]
fn packed_string_write_escalates_with_contents() {
    let mut vec = PackedVec::of_ints(&[1]);
    let Updated::Replaced(ad) = vec.set_str_move("k", TypedValue::Bool(true)) else {
        panic!("string key must escalate");
    };
    let arr = ad.as_vanilla().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr.get(KeyRef::Str("k")), Some(&TypedValue::Bool(true)));
}

#[test]
fn packed_remove() {
    let mut vec = PackedVec::of_ints(&[1, 2, 3]);
    assert!(vec.remove_int(2).is_in_place());
    assert!(vec.remove_int(7).is_in_place());
    assert_eq!(vec, PackedVec::of_ints(&[1, 2]));

    let Updated::Replaced(ad) = vec.remove_int(0) else {
        panic!("removing a middle element must escalate");
    };
    assert!(!ad.as_vanilla().unwrap().is_vector_data());
}

#[test]
fn packed_pop() {
    let mut vec = PackedVec::of_ints(&[4]);
    let (out, v) = vec.pop();
    assert!(out.is_in_place());
    assert_eq!(v, TypedValue::Int(4));
    let (_, v) = vec.pop();
    assert_eq!(v, TypedValue::Null);
}

#[test]
fn empty_array_grows_into_vanilla() {
    let mut empty = EmptyArray;
    assert_eq!(empty.get_int(0), None);
    assert_eq!(empty.iter_end(), 0);
    let Updated::Replaced(ad) = empty.append_move(TypedValue::Int(1)) else {
        panic!("append must grow");
    };
    assert_eq!(ad.as_vanilla().unwrap().len(), 1);
}
