//! Errors raised while building the layout hierarchy.

use bespoke_base::LayoutIndex;

/// A registration the hierarchy refused.
///
/// The rejected layout is never inserted; the builder is unchanged apart
/// from any index it reserved for the attempt.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    #[error("layout `{layout}` names unregistered parent {parent}")]
    UnknownParent { layout: String, parent: LayoutIndex },

    #[error("layout `{layout}` lists parent {parent}, which is already an ancestor of parent {via}")]
    NonImmediateParent {
        layout: String,
        parent: LayoutIndex,
        via: LayoutIndex,
    },

    #[error("layout `{layout}` declares no parent")]
    MissingParent { layout: String },

    #[error("layout `{layout}` has ambiguous liveable ancestors {first} and {second}")]
    AmbiguousLiveableAncestor {
        layout: String,
        first: LayoutIndex,
        second: LayoutIndex,
    },

    #[error("non-liveable layout `{layout}` has liveable parent {parent} and more than one parent")]
    LiveableParentNotUnique { layout: String, parent: LayoutIndex },

    #[error("layout `{layout}` has no unique join with {other} (minimal common ancestors: {candidates:?})")]
    NonUniqueJoin {
        layout: String,
        other: LayoutIndex,
        candidates: Vec<LayoutIndex>,
    },

    #[error("{index} was not reserved")]
    IndexNotReserved { index: LayoutIndex },

    #[error("{index} is already used by `{existing}`")]
    IndexInUse { index: LayoutIndex, existing: String },

    #[error("the layout hierarchy is sealed; no further layouts can be registered")]
    Sealed,

    #[error("the layout hierarchy is already sealed")]
    AlreadySealed,
}
