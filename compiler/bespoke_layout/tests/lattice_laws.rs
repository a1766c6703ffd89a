//! Property-based tests for the sealed layout lattice.
//!
//! Random registration sequences are replayed against a validating
//! builder; rejected registrations are skipped. Whatever hierarchy comes
//! out must be a lattice under `is_subtype`, with `join` and `meet`
//! returning the least upper and greatest lower bounds.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::uninlined_format_args,
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

use bespoke_array::testing::{EmptyArray, PackedVec};
use bespoke_array::LayoutFunctions;
use bespoke_base::LayoutIndex;
use bespoke_layout::{HierarchyBuilder, LayoutHierarchy};
use proptest::prelude::*;
use proptest::sample::Index;

/// One registration attempt: parents picked among the layouts accepted so
/// far, then liveability and kind.
type Attempt = (Vec<Index>, bool, bool);

fn attempts() -> impl Strategy<Value = Vec<Attempt>> {
    prop::collection::vec(
        (
            prop::collection::vec(any::<Index>(), 1..=3),
            any::<bool>(),
            any::<bool>(),
        ),
        0..24,
    )
}

fn build(attempts: &[Attempt]) -> (LayoutHierarchy, Vec<LayoutIndex>) {
    let packed = LayoutFunctions::leak_checked::<PackedVec>();
    let empty = LayoutFunctions::leak_checked::<EmptyArray>();
    let mut b = HierarchyBuilder::with_validation(true);
    let mut accepted = vec![LayoutIndex::TOP];
    for (i, (picks, liveable, concrete)) in attempts.iter().enumerate() {
        let parents: Vec<LayoutIndex> = picks.iter().map(|p| *p.get(&accepted)).collect();
        let name = format!("L{i}");
        let result = if *concrete {
            let vtable = if i % 2 == 0 { packed } else { empty };
            b.register_concrete(name, vtable, parents, *liveable)
        } else {
            b.register_abstract(name, parents, *liveable)
        };
        if let Ok(index) = result {
            accepted.push(index);
        }
    }
    (b.finalize(), accepted)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn subtype_is_a_partial_order(attempts in attempts()) {
        let (h, all) = build(&attempts);
        for &a in &all {
            prop_assert!(h.is_subtype(a, a));
            prop_assert!(h.is_subtype(a, LayoutIndex::TOP));
            for &b in &all {
                if a != b && h.is_subtype(a, b) {
                    prop_assert!(!h.is_subtype(b, a), "{} and {} form a cycle", a, b);
                }
                for &c in &all {
                    if h.is_subtype(a, b) && h.is_subtype(b, c) {
                        prop_assert!(h.is_subtype(a, c));
                    }
                }
            }
        }
    }

    #[test]
    fn join_is_least_upper_bound(attempts in attempts()) {
        let (h, all) = build(&attempts);
        for &a in &all {
            for &b in &all {
                let j = h.join(a, b);
                prop_assert_eq!(j, h.join(b, a));
                prop_assert!(h.is_subtype(a, j) && h.is_subtype(b, j));
                for &u in &all {
                    if h.is_subtype(a, u) && h.is_subtype(b, u) {
                        prop_assert!(
                            h.is_subtype(j, u),
                            "join({}, {}) = {} is not below {}", a, b, j, u
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn meet_is_greatest_lower_bound(attempts in attempts()) {
        let (h, all) = build(&attempts);
        for &a in &all {
            for &b in &all {
                let m = h.meet(a, b);
                prop_assert_eq!(m, h.meet(b, a));
                let lower: Vec<LayoutIndex> = all
                    .iter()
                    .copied()
                    .filter(|&l| h.is_subtype(l, a) && h.is_subtype(l, b))
                    .collect();
                match m {
                    Some(m) => {
                        prop_assert!(h.is_subtype(m, a) && h.is_subtype(m, b));
                        for &l in &lower {
                            prop_assert!(h.is_subtype(l, m));
                        }
                    }
                    None => prop_assert!(lower.is_empty()),
                }
            }
        }
    }

    #[test]
    fn liveable_ancestor_is_least_liveable_bound(attempts in attempts()) {
        let (h, all) = build(&attempts);
        for &a in &all {
            let live = h.liveable_ancestor(a);
            prop_assert!(h.layout(live).unwrap().is_liveable());
            prop_assert!(h.is_subtype(a, live));
            for &other in &all {
                if h.layout(other).unwrap().is_liveable() && h.is_subtype(a, other) {
                    prop_assert!(h.is_subtype(live, other));
                }
            }
        }
    }

    #[test]
    fn relations_are_symmetric(attempts in attempts()) {
        let (h, all) = build(&attempts);
        for &a in &all {
            let layout = h.layout(a).unwrap();
            for p in layout.parents() {
                prop_assert!(h.layout(p).unwrap().children().any(|c| c == a));
                prop_assert!(h.is_subtype(a, p));
            }
            for &d in layout.descendants() {
                prop_assert!(h.layout(d).unwrap().ancestors().contains(&a));
            }
        }
        prop_assert_eq!(h.len(), all.len());
    }
}
