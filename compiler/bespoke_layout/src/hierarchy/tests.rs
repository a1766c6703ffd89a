use bespoke_array::testing::{EmptyArray, PackedVec};
use bespoke_array::LayoutFunctions;
use bespoke_base::LayoutIndex;
use pretty_assertions::assert_eq;

use super::{LayoutHierarchy, LayoutSnapshot};
use crate::irgen::Dispatch;
use crate::HierarchyBuilder;

const TOP: LayoutIndex = LayoutIndex::TOP;

fn packed() -> &'static LayoutFunctions {
    LayoutFunctions::leak_checked::<PackedVec>()
}

fn empty() -> &'static LayoutFunctions {
    LayoutFunctions::leak_checked::<EmptyArray>()
}

struct Dicts {
    h: LayoutHierarchy,
    dict: LayoutIndex,
    empty_dict: LayoutIndex,
}

/// `Dict` (liveable) with a single non-liveable concrete child.
fn dicts() -> Dicts {
    let mut b = HierarchyBuilder::with_validation(true);
    let dict = b.register_abstract("Dict", [TOP], true).unwrap();
    let empty_dict = b
        .register_concrete("EmptyDict", empty(), [dict], false)
        .unwrap();
    Dicts {
        h: b.finalize(),
        dict,
        empty_dict,
    }
}

struct Vecs {
    h: LayoutHierarchy,
    vec_top: LayoutIndex,
    vec_a: LayoutIndex,
    vec_b: LayoutIndex,
}

/// Two concrete siblings under one liveable union.
fn vecs() -> Vecs {
    let mut b = HierarchyBuilder::with_validation(true);
    let vec_top = b.register_abstract("VecTop", [TOP], true).unwrap();
    let vec_a = b
        .register_concrete("VecA", packed(), [vec_top], true)
        .unwrap();
    let vec_b = b
        .register_concrete("VecB", empty(), [vec_top], true)
        .unwrap();
    Vecs {
        h: b.finalize(),
        vec_top,
        vec_a,
        vec_b,
    }
}

// ── Order ───────────────────────────────────────────────────────────

#[test]
fn subtype_follows_registration() {
    let Dicts {
        h,
        dict,
        empty_dict,
    } = dicts();
    assert!(h.is_subtype(empty_dict, dict));
    assert!(h.is_subtype(empty_dict, TOP));
    assert!(h.is_subtype(dict, TOP));
    assert!(!h.is_subtype(dict, empty_dict));
    assert!(!h.is_subtype(TOP, dict));
}

#[test]
fn subtype_is_reflexive() {
    let Vecs { h, vec_a, .. } = vecs();
    for layout in [TOP, vec_a] {
        assert!(h.is_subtype(layout, layout));
    }
}

#[test]
fn descendants_mirror_ancestors() {
    let Vecs {
        h,
        vec_top,
        vec_a,
        vec_b,
    } = vecs();
    let top = h.top();
    for l in [TOP, vec_top, vec_a, vec_b] {
        assert!(top.descendants().contains(&l));
    }
    let node = h.layout(vec_top).unwrap();
    assert_eq!(node.descendants().len(), 3);
    assert!(node.descendants().contains(&vec_a));
    assert!(node.descendants().contains(&vec_b));
}

#[test]
fn child_registered_below_parent_index() {
    let mut b = HierarchyBuilder::with_validation(true);
    let base = b.reserve_indices(8);
    let parent = b.register_abstract("Late", [TOP], true).unwrap();
    assert!(parent.raw() > base.raw());
    b.register_concrete_at(base, "Early", packed(), [parent], true)
        .unwrap();
    let h = b.finalize();

    assert!(h.is_subtype(base, parent));
    assert_eq!(h.join(base, parent), parent);
    assert_eq!(h.meet(parent, TOP), Some(parent));
    assert_eq!(h.meet(base, parent), Some(base));
}

#[test]
#[should_panic(expected = "no layout registered at layout#77")]
fn queries_on_unknown_index_panic() {
    let Dicts { h, .. } = dicts();
    h.is_subtype(LayoutIndex::from_raw(77), TOP);
}

// ── Join and meet ───────────────────────────────────────────────────

#[test]
fn join_and_meet_along_a_chain() {
    let Dicts {
        h,
        dict,
        empty_dict,
    } = dicts();
    assert_eq!(h.join(dict, empty_dict), dict);
    assert_eq!(h.join(empty_dict, dict), dict);
    assert_eq!(h.meet(empty_dict, dict), Some(empty_dict));
    assert_eq!(h.meet(dict, empty_dict), Some(empty_dict));
    assert_eq!(h.join(dict, TOP), TOP);
    assert_eq!(h.meet(dict, TOP), Some(dict));
}

#[test]
fn siblings_join_at_parent_and_have_no_meet() {
    let Vecs {
        h,
        vec_top,
        vec_a,
        vec_b,
    } = vecs();
    assert_eq!(h.join(vec_a, vec_b), vec_top);
    assert_eq!(h.meet(vec_a, vec_b), None);
    assert_eq!(h.meet(vec_a, vec_a), Some(vec_a));
    assert_eq!(h.join(vec_b, vec_b), vec_b);
}

#[test]
fn diamond_meets_at_shared_child() {
    let mut b = HierarchyBuilder::with_validation(true);
    let left = b.register_abstract("Left", [TOP], true).unwrap();
    let right = b.register_abstract("Right", [TOP], true).unwrap();
    let both = b
        .register_concrete("Both", packed(), [left, right], true)
        .unwrap();
    let h = b.finalize();

    assert_eq!(h.meet(left, right), Some(both));
    assert_eq!(h.meet(right, left), Some(both));
    assert_eq!(h.join(left, right), TOP);
    assert_eq!(h.join(both, left), left);
}

#[test]
fn meet_skips_non_maximal_common_descendants() {
    let mut b = HierarchyBuilder::with_validation(true);
    let left = b.register_abstract("Left", [TOP], true).unwrap();
    let right = b.register_abstract("Right", [TOP], true).unwrap();
    let both = b.register_abstract("Both", [left, right], true).unwrap();
    let leaf = b
        .register_concrete("Leaf", packed(), [both], true)
        .unwrap();
    let h = b.finalize();

    assert_eq!(h.meet(left, right), Some(both));
    assert_eq!(h.meet(leaf, right), Some(leaf));
    assert_eq!(h.join(leaf, left), left);
}

// ── Liveability ─────────────────────────────────────────────────────

#[test]
fn liveable_ancestor_of_non_liveable_chain() {
    let mut b = HierarchyBuilder::with_validation(true);
    let dict = b.register_abstract("Dict", [TOP], true).unwrap();
    let mid = b.register_abstract("Mid", [dict], false).unwrap();
    let leaf = b
        .register_concrete("Leaf", packed(), [mid], false)
        .unwrap();
    let h = b.finalize();

    assert_eq!(h.liveable_ancestor(leaf), dict);
    assert_eq!(h.liveable_ancestor(mid), dict);
    assert_eq!(h.liveable_ancestor(dict), dict);
    assert_eq!(h.liveable_ancestor(TOP), TOP);
}

// ── Dispatch ────────────────────────────────────────────────────────

#[test]
fn concrete_layouts_dispatch_directly() {
    let Vecs { h, vec_a, .. } = vecs();
    let concrete = h.concrete(vec_a).unwrap();
    assert_eq!(concrete.index(), vec_a);
    assert_eq!(
        concrete.layout_data().dispatch,
        Dispatch::Direct(concrete.vtable())
    );
    assert_eq!(h.layout(vec_a).unwrap().layout_data(), concrete.layout_data());
}

#[test]
fn mixed_union_dispatches_virtually() {
    let Vecs { h, vec_top, .. } = vecs();
    assert!(h.concrete(vec_top).is_none());
    assert_eq!(
        h.layout(vec_top).unwrap().layout_data().dispatch,
        Dispatch::Virtual
    );
    assert_eq!(h.top().layout_data().dispatch, Dispatch::Virtual);
}

#[test]
fn uniform_union_dispatches_directly() {
    let Dicts { h, dict, empty_dict } = dicts();
    let vtable = h.concrete(empty_dict).unwrap().vtable();
    assert_eq!(
        h.layout(dict).unwrap().layout_data().dispatch,
        Dispatch::Direct(vtable)
    );
    assert_eq!(h.top().layout_data().dispatch, Dispatch::Virtual);
}

#[test]
fn top_dispatches_virtually_over_a_single_vtable() {
    let mut b = HierarchyBuilder::with_validation(true);
    let only = b.register_concrete("Only", packed(), [TOP], true).unwrap();
    let h = b.finalize();

    assert_eq!(h.top().layout_data().dispatch, Dispatch::Virtual);
    assert_eq!(
        h.layout(only).unwrap().layout_data().dispatch,
        Dispatch::Direct(h.concrete(only).unwrap().vtable())
    );
}

#[test]
fn union_without_concrete_members_dispatches_virtually() {
    let mut b = HierarchyBuilder::with_validation(true);
    let hollow = b.register_abstract("Hollow", [TOP], true).unwrap();
    let h = b.finalize();
    assert_eq!(
        h.layout(hollow).unwrap().layout_data().dispatch,
        Dispatch::Virtual
    );
}

// ── Introspection ───────────────────────────────────────────────────

#[test]
fn sealed_hierarchy_reports_counts() {
    let Vecs { h, .. } = vecs();
    assert_eq!(h.len(), 4);
    assert!(h.is_validated());
    assert_eq!(h.iter().count(), 4);
    assert!(h.is_concrete(LayoutIndex::from_raw(2)));
    assert!(!h.is_concrete(TOP));
    assert!(!h.is_concrete(LayoutIndex::from_raw(300)));
}

#[test]
fn snapshot_lists_relations() {
    let Dicts {
        h,
        dict,
        empty_dict,
    } = dicts();
    let snap = h.snapshot();
    assert_eq!(snap.layouts.len(), 3);
    assert_eq!(
        snap.get(empty_dict),
        Some(&LayoutSnapshot {
            index: empty_dict,
            description: "EmptyDict".into(),
            concrete: true,
            liveable: false,
            parents: vec![dict],
            children: vec![],
            liveable_ancestor: dict,
        })
    );
    assert_eq!(snap.get(TOP).unwrap().children, vec![dict]);
}

#[test]
fn snapshot_display() {
    let Dicts { h, .. } = dicts();
    assert_eq!(
        h.snapshot().to_string(),
        "layout#0 BespokeTop*\n\
         layout#1 Dict* <- [layout#0]\n\
         layout#2 EmptyDict! <- [layout#1]\n"
    );
}
