//! Values and keys stored in arrays.
//!
//! `TypedValue` is the cell type every representation stores and returns.
//! `ArrayKey` is an owned key; `KeyRef` is its borrowed form, hashed
//! identically so maps keyed by `ArrayKey` can be searched without allocating.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A value cell.
///
/// `Uninit` is the "missing" marker returned by positional reads past the
/// end; it never appears as a stored element.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum TypedValue {
    #[default]
    Uninit,
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Str(Arc<str>),
}

impl TypedValue {
    /// Build a string value.
    pub fn str(s: &str) -> Self {
        TypedValue::Str(Arc::from(s))
    }

    /// Whether this cell holds a real value.
    #[inline]
    pub fn is_init(&self) -> bool {
        !matches!(self, TypedValue::Uninit)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            TypedValue::Uninit => "uninit",
            TypedValue::Null => "null",
            TypedValue::Bool(_) => "bool",
            TypedValue::Int(_) => "int",
            TypedValue::Double(_) => "float",
            TypedValue::Str(_) => "string",
        }
    }

    /// Total order used by the sort builtins.
    ///
    /// Types rank `uninit < null < bool < numbers < strings`; ints and
    /// floats compare numerically with each other.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        #[expect(
            clippy::cast_precision_loss,
            reason = "mixed int/float comparison is numeric by definition"
        )]
        fn as_f64(i: i64) -> f64 {
            i as f64
        }

        match (self, other) {
            (TypedValue::Bool(a), TypedValue::Bool(b)) => a.cmp(b),
            (TypedValue::Int(a), TypedValue::Int(b)) => a.cmp(b),
            (TypedValue::Double(a), TypedValue::Double(b)) => a.total_cmp(b),
            (TypedValue::Int(a), TypedValue::Double(b)) => as_f64(*a).total_cmp(b),
            (TypedValue::Double(a), TypedValue::Int(b)) => a.total_cmp(&as_f64(*b)),
            (TypedValue::Str(a), TypedValue::Str(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            TypedValue::Uninit => 0,
            TypedValue::Null => 1,
            TypedValue::Bool(_) => 2,
            TypedValue::Int(_) | TypedValue::Double(_) => 3,
            TypedValue::Str(_) => 4,
        }
    }
}

impl From<i64> for TypedValue {
    fn from(v: i64) -> Self {
        TypedValue::Int(v)
    }
}

impl From<bool> for TypedValue {
    fn from(v: bool) -> Self {
        TypedValue::Bool(v)
    }
}

impl From<&str> for TypedValue {
    fn from(v: &str) -> Self {
        TypedValue::str(v)
    }
}

impl From<ArrayKey> for TypedValue {
    fn from(key: ArrayKey) -> Self {
        match key {
            ArrayKey::Int(i) => TypedValue::Int(i),
            ArrayKey::Str(s) => TypedValue::Str(s),
        }
    }
}

/// An owned array key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArrayKey {
    Int(i64),
    Str(Arc<str>),
}

impl ArrayKey {
    pub fn str(s: &str) -> Self {
        ArrayKey::Str(Arc::from(s))
    }

    /// Borrow as a `KeyRef` for map lookups.
    #[inline]
    pub fn as_key_ref(&self) -> KeyRef<'_> {
        match self {
            ArrayKey::Int(i) => KeyRef::Int(*i),
            ArrayKey::Str(s) => KeyRef::Str(s),
        }
    }

    /// Ints before strings; each compared naturally.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ArrayKey::Int(a), ArrayKey::Int(b)) => a.cmp(b),
            (ArrayKey::Str(a), ArrayKey::Str(b)) => a.cmp(b),
            (ArrayKey::Int(_), ArrayKey::Str(_)) => Ordering::Less,
            (ArrayKey::Str(_), ArrayKey::Int(_)) => Ordering::Greater,
        }
    }
}

impl Hash for ArrayKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_key_ref().hash(state);
    }
}

impl From<i64> for ArrayKey {
    fn from(k: i64) -> Self {
        ArrayKey::Int(k)
    }
}

impl From<&str> for ArrayKey {
    fn from(k: &str) -> Self {
        ArrayKey::str(k)
    }
}

impl fmt::Display for ArrayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.as_key_ref(), f)
    }
}

/// A borrowed array key.
///
/// Hashes exactly like the `ArrayKey` it was borrowed from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyRef<'a> {
    Int(i64),
    Str(&'a str),
}

impl KeyRef<'_> {
    pub fn to_key(self) -> ArrayKey {
        match self {
            KeyRef::Int(i) => ArrayKey::Int(i),
            KeyRef::Str(s) => ArrayKey::str(s),
        }
    }
}

impl Hash for KeyRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            KeyRef::Int(i) => {
                0u8.hash(state);
                i.hash(state);
            }
            KeyRef::Str(s) => {
                1u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl indexmap::Equivalent<ArrayKey> for KeyRef<'_> {
    fn equivalent(&self, key: &ArrayKey) -> bool {
        *self == key.as_key_ref()
    }
}

impl fmt::Display for KeyRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyRef::Int(i) => write!(f, "{i}"),
            KeyRef::Str(s) => write!(f, "\"{s}\""),
        }
    }
}

/// The sort builtins an array can be handed to.
///
/// User-comparator sorts are not modeled; they escalate before reaching a
/// representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SortFunction {
    /// Sort values ascending, renumber keys.
    Sort,
    /// Sort values descending, renumber keys.
    RSort,
    /// Sort values ascending, keep keys.
    ASort,
    /// Sort values descending, keep keys.
    ARSort,
    /// Sort by key ascending.
    KSort,
    /// Sort by key descending.
    KRSort,
}

impl SortFunction {
    /// Whether the sort discards keys and renumbers from zero.
    #[inline]
    pub fn renumbers(self) -> bool {
        matches!(self, SortFunction::Sort | SortFunction::RSort)
    }
}
