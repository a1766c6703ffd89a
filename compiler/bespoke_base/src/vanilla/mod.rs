//! The generic ("vanilla") array representation.
//!
//! Every bespoke layout can escalate to this representation, and the
//! runtime's generic operations fall back to it when no bespoke vtable
//! applies. Elements keep insertion order; positions are dense `0..len`
//! with `len` as the end sentinel.

use indexmap::IndexMap;

use crate::{ArrayKey, KeyRef, SortFunction, TypedValue};

/// Insertion-ordered key/value array.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VanillaArray {
    elems: IndexMap<ArrayKey, TypedValue>,
    /// Key used by the next append.
    next_int_key: i64,
}

impl VanillaArray {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a vector-shaped array (keys `0..n`).
    pub fn from_values(values: impl IntoIterator<Item = TypedValue>) -> Self {
        let mut arr = Self::new();
        for v in values {
            arr.append(v);
        }
        arr
    }

    /// Build from key/value pairs in order. Later duplicates overwrite.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (ArrayKey, TypedValue)>) -> Self {
        let mut arr = Self::new();
        for (k, v) in pairs {
            arr.set(k, v);
        }
        arr
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// Whether keys are exactly `0, 1, .., len - 1` in order.
    pub fn is_vector_data(&self) -> bool {
        self.elems
            .keys()
            .zip(0i64..)
            .all(|(k, i)| *k == ArrayKey::Int(i))
    }

    pub fn get(&self, key: KeyRef<'_>) -> Option<&TypedValue> {
        self.elems.get(&key)
    }

    pub fn get_mut(&mut self, key: KeyRef<'_>) -> Option<&mut TypedValue> {
        self.elems.get_mut(&key)
    }

    /// Position of `key`, if present.
    pub fn position(&self, key: KeyRef<'_>) -> Option<usize> {
        self.elems.get_index_of(&key)
    }

    /// Mutable slot for `key`, inserting `null` if it is missing.
    pub fn lval(&mut self, key: ArrayKey) -> &mut TypedValue {
        self.bump_next_key(&key);
        self.elems.entry(key).or_insert(TypedValue::Null)
    }

    /// Insert or overwrite.
    pub fn set(&mut self, key: ArrayKey, value: TypedValue) {
        self.bump_next_key(&key);
        self.elems.insert(key, value);
    }

    /// Append under the next integer key.
    pub fn append(&mut self, value: TypedValue) {
        let key = self.next_int_key;
        self.next_int_key = key.saturating_add(1);
        self.elems.insert(ArrayKey::Int(key), value);
    }

    /// Remove `key`, preserving the order of the remaining elements.
    pub fn remove(&mut self, key: KeyRef<'_>) -> Option<TypedValue> {
        self.elems.shift_remove(&key)
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Option<TypedValue> {
        let (key, value) = self.elems.pop()?;
        if self.next_int_key > 0 && key == ArrayKey::Int(self.next_int_key - 1) {
            self.next_int_key -= 1;
        }
        Some(value)
    }

    pub fn key_at(&self, pos: usize) -> Option<&ArrayKey> {
        self.elems.get_index(pos).map(|(k, _)| k)
    }

    pub fn val_at(&self, pos: usize) -> Option<&TypedValue> {
        self.elems.get_index(pos).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArrayKey, &TypedValue)> {
        self.elems.iter()
    }

    // ── Iteration positions ─────────────────────────────────────────

    #[inline]
    pub fn iter_begin(&self) -> usize {
        0
    }

    /// Position of the last element, or the end sentinel when empty.
    #[inline]
    pub fn iter_last(&self) -> usize {
        self.len().checked_sub(1).unwrap_or(self.iter_end())
    }

    #[inline]
    pub fn iter_end(&self) -> usize {
        self.len()
    }

    #[inline]
    pub fn iter_advance(&self, pos: usize) -> usize {
        (pos + 1).min(self.iter_end())
    }

    /// Step back one position; rewinding from the first element yields end.
    #[inline]
    pub fn iter_rewind(&self, pos: usize) -> usize {
        if pos == 0 || pos > self.iter_end() {
            self.iter_end()
        } else {
            pos - 1
        }
    }

    // ── Sorting ─────────────────────────────────────────────────────

    /// Sort in place with one of the builtin sort functions.
    pub fn sort(&mut self, sf: SortFunction) {
        tracing::trace!(?sf, len = self.len(), "vanilla sort");
        match sf {
            SortFunction::Sort | SortFunction::ASort => {
                self.elems.sort_by(|_, a, _, b| a.sort_cmp(b));
            }
            SortFunction::RSort | SortFunction::ARSort => {
                self.elems.sort_by(|_, a, _, b| b.sort_cmp(a));
            }
            SortFunction::KSort => self.elems.sort_by(|a, _, b, _| a.sort_cmp(b)),
            SortFunction::KRSort => self.elems.sort_by(|a, _, b, _| b.sort_cmp(a)),
        }
        if sf.renumbers() {
            let values: Vec<TypedValue> = self.elems.drain(..).map(|(_, v)| v).collect();
            self.next_int_key = 0;
            for v in values {
                self.append(v);
            }
        }
    }

    /// Approximate heap footprint in bytes.
    pub fn heap_size(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.elems.capacity() * std::mem::size_of::<(ArrayKey, TypedValue)>()
    }

    fn bump_next_key(&mut self, key: &ArrayKey) {
        if let ArrayKey::Int(i) = *key {
            if i >= self.next_int_key {
                self.next_int_key = i.saturating_add(1);
            }
        }
    }
}
