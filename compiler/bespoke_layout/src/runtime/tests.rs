use std::sync::OnceLock;

use bespoke_array::testing::{EmptyArray, PackedVec};
use bespoke_array::LayoutFunctions;
use bespoke_base::{ArrayData, ArrayFlags, ArrayKey, KeyRef, LayoutIndex, TypedValue, VanillaArray};
use pretty_assertions::assert_eq;

use crate::registry;

fn packed_layout() -> LayoutIndex {
    static LAYOUT: OnceLock<LayoutIndex> = OnceLock::new();
    *LAYOUT.get_or_init(|| {
        registry::register_concrete(
            "PackedVec",
            LayoutFunctions::leak_checked::<PackedVec>(),
            [LayoutIndex::TOP],
            true,
        )
        .unwrap()
    })
}

fn empty_layout() -> LayoutIndex {
    static LAYOUT: OnceLock<LayoutIndex> = OnceLock::new();
    *LAYOUT.get_or_init(|| {
        registry::register_concrete(
            "EmptyArray",
            LayoutFunctions::leak_checked::<EmptyArray>(),
            [LayoutIndex::TOP],
            true,
        )
        .unwrap()
    })
}

fn packed(values: &[i64]) -> ArrayData {
    ArrayData::bespoke(packed_layout(), PackedVec::of_ints(values))
}

fn collect(ad: &ArrayData) -> Vec<(TypedValue, TypedValue)> {
    let mut out = Vec::new();
    let mut pos = super::iter_begin(ad);
    while pos != super::iter_end(ad) {
        out.push((super::get_key_at(ad, pos), super::get_val_at(ad, pos)));
        pos = super::iter_advance(ad, pos);
    }
    out
}

#[test]
fn reads_agree_across_layouts() {
    let bespoke = packed(&[7, 8]);
    let vanilla = ArrayData::vanilla(VanillaArray::from_values([
        TypedValue::Int(7),
        TypedValue::Int(8),
    ]));
    for ad in [&bespoke, &vanilla] {
        assert_eq!(super::get(ad, KeyRef::Int(1)), Some(TypedValue::Int(8)));
        assert_eq!(super::get(ad, KeyRef::Str("x")), None);
        assert!(super::is_vector_data(ad));
        assert_eq!(super::iter_last(ad), 1);
        assert_eq!(super::iter_rewind(ad, 0), super::iter_end(ad));
        assert_eq!(
            collect(ad),
            vec![
                (TypedValue::Int(0), TypedValue::Int(7)),
                (TypedValue::Int(1), TypedValue::Int(8)),
            ]
        );
        assert_eq!(super::get_key_at(ad, 5), TypedValue::Uninit);
        assert!(super::heap_size(ad) > 0);
    }
}

#[test]
fn in_shape_writes_stay_bespoke() {
    let mut ad = packed(&[1]);
    super::set(&mut ad, KeyRef::Int(0), TypedValue::Int(5));
    super::append(&mut ad, TypedValue::Int(6));
    assert_eq!(ad.layout(), Some(packed_layout()));
    assert_eq!(super::pop(&mut ad), TypedValue::Int(6));
    assert_eq!(super::get(&ad, KeyRef::Int(0)), Some(TypedValue::Int(5)));
}

#[test]
fn out_of_shape_write_escalates_and_keeps_legacy() {
    let mut ad = packed(&[1, 2]);
    ad.set_flag(ArrayFlags::LEGACY, true);
    super::set(&mut ad, KeyRef::Str("k"), TypedValue::Bool(true));
    assert!(ad.is_vanilla());
    assert!(ad.is_legacy());
    assert_eq!(super::get(&ad, KeyRef::Str("k")), Some(TypedValue::Bool(true)));
    assert_eq!(super::get(&ad, KeyRef::Int(1)), Some(TypedValue::Int(2)));
}

#[test]
fn remove_from_middle_escalates() {
    let mut ad = packed(&[1, 2, 3]);
    super::remove(&mut ad, KeyRef::Int(0));
    assert!(ad.is_vanilla());
    assert!(!super::is_vector_data(&ad));
    assert_eq!(
        collect(&ad),
        vec![
            (TypedValue::Int(1), TypedValue::Int(2)),
            (TypedValue::Int(2), TypedValue::Int(3)),
        ]
    );
}

#[test]
fn vanilla_writes() {
    let mut ad = ArrayData::vanilla(VanillaArray::new());
    super::set(&mut ad, KeyRef::Str("a"), TypedValue::Int(1));
    super::append(&mut ad, TypedValue::Int(2));
    super::remove(&mut ad, KeyRef::Str("a"));
    assert_eq!(super::pop(&mut ad), TypedValue::Int(2));
    assert_eq!(super::pop(&mut ad), TypedValue::Null);
}

#[test]
fn lval_writes_in_place_when_possible() {
    let mut ad = packed(&[1, 2]);
    let id = ad.id();
    super::with_lval(&mut ad, KeyRef::Int(1), |v| *v = TypedValue::Int(20));
    assert_eq!(ad.id(), id);
    assert_eq!(super::get(&ad, KeyRef::Int(1)), Some(TypedValue::Int(20)));
}

#[test]
fn lval_escalates_then_writes() {
    let mut ad = ArrayData::bespoke(empty_layout(), EmptyArray);
    let created = super::with_lval(&mut ad, KeyRef::Str("n"), |v| {
        let was_null = *v == TypedValue::Null;
        *v = TypedValue::Int(3);
        was_null
    });
    assert!(created);
    assert!(ad.is_vanilla());
    assert_eq!(super::get(&ad, KeyRef::Str("n")), Some(TypedValue::Int(3)));
}

#[test]
fn escalate_copies_contents() {
    let ad = packed(&[4, 5]);
    let copy = super::escalate_to_vanilla(&ad, "test");
    assert!(copy.is_vanilla());
    assert_eq!(collect(&copy), collect(&ad));

    let again = super::escalate_to_vanilla(&copy, "test");
    assert_ne!(again.id(), copy.id());
    assert_eq!(
        again.as_vanilla().unwrap().key_at(0),
        Some(&ArrayKey::Int(0))
    );
}

#[test]
fn release_runs_for_both_kinds() {
    super::release(packed(&[1]));
    super::release(ArrayData::vanilla(VanillaArray::new()));
}

#[test]
#[should_panic(expected = "not a registered concrete layout")]
fn unregistered_layout_panics() {
    let ad = ArrayData::bespoke(LayoutIndex::from_raw(LayoutIndex::MAX_INDEX), EmptyArray);
    let _ = super::get(&ad, KeyRef::Int(0));
}
