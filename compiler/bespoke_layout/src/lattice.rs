//! Set-level lattice helpers shared by the validator and the sealed
//! hierarchy.
//!
//! Closures are reflexive. For a join, `common` is the intersection of two
//! upward closures and is itself upward closed; the join is the element
//! whose own upward closure is all of `common`. Meets are the mirror image
//! over downward closures.

use std::collections::VecDeque;

use bespoke_base::LayoutIndex;
use rustc_hash::FxHashSet;

pub(crate) fn intersect(
    a: &FxHashSet<LayoutIndex>,
    b: &FxHashSet<LayoutIndex>,
) -> FxHashSet<LayoutIndex> {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small.iter().copied().filter(|x| large.contains(x)).collect()
}

/// Elements of `set` not strictly beyond another element, where "beyond"
/// is membership in that element's closure. Sorted.
pub(crate) fn extremal<'a>(
    set: &FxHashSet<LayoutIndex>,
    closure: impl Fn(LayoutIndex) -> Option<&'a FxHashSet<LayoutIndex>>,
) -> Vec<LayoutIndex> {
    let mut out: Vec<LayoutIndex> = set
        .iter()
        .copied()
        .filter(|&c| {
            !set.iter()
                .any(|&o| o != c && closure(o).is_some_and(|cl| cl.contains(&c)))
        })
        .collect();
    out.sort_unstable();
    out
}

/// Breadth-first search from `start` along `step`, returning the first node
/// of `common` whose closure covers all of `common`.
pub(crate) fn nearest_bound<I>(
    start: LayoutIndex,
    common: &FxHashSet<LayoutIndex>,
    step: impl Fn(LayoutIndex) -> I,
    closure_len: impl Fn(LayoutIndex) -> usize,
) -> Option<LayoutIndex>
where
    I: IntoIterator<Item = LayoutIndex>,
{
    if common.is_empty() {
        return None;
    }
    let mut seen = FxHashSet::default();
    seen.insert(start);
    let mut queue = VecDeque::from([start]);
    while let Some(v) = queue.pop_front() {
        if common.contains(&v) && closure_len(v) == common.len() {
            return Some(v);
        }
        for next in step(v) {
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    None
}
