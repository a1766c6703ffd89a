//! Small reference representations for exercising vtables and layouts.
//!
//! Compiled for this crate's tests and, with the `testing` feature, for
//! dependents' tests.
//!
//! - [`PackedVec`]: a vector of values with keys `0..len`; anything that
//!   breaks vector shape escalates.
//! - [`EmptyArray`]: always empty; every write escalates.

use bespoke_base::{ArrayKey, KeyRef, TypedValue, VanillaArray};

use crate::{ArrayError, BespokeArray, Elem, Lval, Scanner, Updated};

fn key_pos(k: i64, len: usize) -> Option<usize> {
    usize::try_from(k).ok().filter(|&i| i < len)
}

fn missing(key: ArrayKey, throw_on_missing: bool) -> Result<Elem<'static>, ArrayError> {
    if throw_on_missing {
        Err(ArrayError::MissingKey(key))
    } else {
        Ok(Elem::Null)
    }
}

/// Vector-shaped representation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PackedVec {
    elems: Vec<TypedValue>,
}

impl PackedVec {
    pub fn new(elems: Vec<TypedValue>) -> Self {
        Self { elems }
    }

    pub fn of_ints(values: &[i64]) -> Self {
        Self::new(values.iter().copied().map(TypedValue::Int).collect())
    }

    pub fn len(&self) -> usize {
        self.elems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    fn escalate_and(&self, reason: &'static str, f: impl FnOnce(&mut VanillaArray)) -> Updated {
        let mut arr = self.escalate_to_vanilla(reason);
        f(&mut arr);
        Updated::escalated(arr)
    }
}

impl BespokeArray for PackedVec {
    fn heap_size(&self) -> usize {
        std::mem::size_of::<Self>() + self.elems.capacity() * std::mem::size_of::<TypedValue>()
    }

    fn scan(&self, scanner: &mut dyn Scanner) {
        for v in &self.elems {
            scanner.scan_value(v);
        }
    }

    fn escalate_to_vanilla(&self, _reason: &'static str) -> VanillaArray {
        VanillaArray::from_values(self.elems.iter().cloned())
    }

    fn is_vector_data(&self) -> bool {
        true
    }

    fn get_int(&self, k: i64) -> Option<TypedValue> {
        key_pos(k, self.len()).map(|i| self.elems[i].clone())
    }

    fn get_str(&self, _k: &str) -> Option<TypedValue> {
        None
    }

    fn get_key(&self, pos: usize) -> TypedValue {
        match i64::try_from(pos) {
            Ok(k) if pos < self.len() => TypedValue::Int(k),
            _ => TypedValue::Uninit,
        }
    }

    fn get_val(&self, pos: usize) -> TypedValue {
        self.elems.get(pos).cloned().unwrap_or_default()
    }

    fn get_int_pos(&self, k: i64) -> usize {
        key_pos(k, self.len()).unwrap_or(self.len())
    }

    fn get_str_pos(&self, _k: &str) -> usize {
        self.len()
    }

    fn iter_last(&self) -> usize {
        self.len().checked_sub(1).unwrap_or(self.len())
    }

    fn iter_end(&self) -> usize {
        self.len()
    }

    fn iter_advance(&self, pos: usize) -> usize {
        (pos + 1).min(self.len())
    }

    fn iter_rewind(&self, pos: usize) -> usize {
        if pos == 0 || pos > self.len() {
            self.len()
        } else {
            pos - 1
        }
    }

    fn lval_int(&mut self, k: i64) -> Lval<'_> {
        let len = self.len();
        if let Some(i) = key_pos(k, len) {
            return Lval::Slot(&mut self.elems[i]);
        }
        if key_pos(k, len + 1) == Some(len) {
            self.elems.push(TypedValue::Null);
            return Lval::Slot(&mut self.elems[len]);
        }
        Lval::Escalated(self.escalate_to_vanilla("lval_int"))
    }

    fn lval_str(&mut self, _k: &str) -> Lval<'_> {
        Lval::Escalated(self.escalate_to_vanilla("lval_str"))
    }

    fn elem_int(&self, k: i64, throw_on_missing: bool) -> Result<Elem<'_>, ArrayError> {
        match key_pos(k, self.len()) {
            Some(i) => Ok(Elem::Slot(&self.elems[i])),
            None => missing(ArrayKey::Int(k), throw_on_missing),
        }
    }

    fn elem_str(&self, k: &str, throw_on_missing: bool) -> Result<Elem<'_>, ArrayError> {
        missing(ArrayKey::str(k), throw_on_missing)
    }

    fn set_int_move(&mut self, k: i64, v: TypedValue) -> Updated {
        let len = self.len();
        if let Some(i) = key_pos(k, len) {
            self.elems[i] = v;
            return Updated::InPlace;
        }
        if key_pos(k, len + 1) == Some(len) {
            self.elems.push(v);
            return Updated::InPlace;
        }
        self.escalate_and("set_int", |arr| arr.set(ArrayKey::Int(k), v))
    }

    fn set_str_move(&mut self, k: &str, v: TypedValue) -> Updated {
        self.escalate_and("set_str", |arr| arr.set(ArrayKey::str(k), v))
    }

    fn remove_int(&mut self, k: i64) -> Updated {
        match key_pos(k, self.len()) {
            None => Updated::InPlace,
            Some(i) if i + 1 == self.len() => {
                self.elems.pop();
                Updated::InPlace
            }
            Some(_) => self.escalate_and("remove_int", |arr| {
                arr.remove(KeyRef::Int(k));
            }),
        }
    }

    fn remove_str(&mut self, _k: &str) -> Updated {
        Updated::InPlace
    }

    fn append_move(&mut self, v: TypedValue) -> Updated {
        self.elems.push(v);
        Updated::InPlace
    }

    fn pop(&mut self) -> (Updated, TypedValue) {
        (Updated::InPlace, self.elems.pop().unwrap_or(TypedValue::Null))
    }

    fn post_sort(&mut self, sorted: VanillaArray) -> Updated {
        if sorted.is_vector_data() {
            self.elems = sorted.iter().map(|(_, v)| v.clone()).collect();
            Updated::InPlace
        } else {
            Updated::escalated(sorted)
        }
    }
}

/// Representation of the empty array.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EmptyArray;

impl EmptyArray {
    fn grow(f: impl FnOnce(&mut VanillaArray)) -> Updated {
        let mut arr = VanillaArray::new();
        f(&mut arr);
        Updated::escalated(arr)
    }
}

impl BespokeArray for EmptyArray {
    fn scan(&self, _scanner: &mut dyn Scanner) {}

    fn escalate_to_vanilla(&self, _reason: &'static str) -> VanillaArray {
        VanillaArray::new()
    }

    fn is_vector_data(&self) -> bool {
        true
    }

    fn get_int(&self, _k: i64) -> Option<TypedValue> {
        None
    }

    fn get_str(&self, _k: &str) -> Option<TypedValue> {
        None
    }

    fn get_key(&self, _pos: usize) -> TypedValue {
        TypedValue::Uninit
    }

    fn get_val(&self, _pos: usize) -> TypedValue {
        TypedValue::Uninit
    }

    fn get_int_pos(&self, _k: i64) -> usize {
        0
    }

    fn get_str_pos(&self, _k: &str) -> usize {
        0
    }

    fn iter_last(&self) -> usize {
        0
    }

    fn iter_end(&self) -> usize {
        0
    }

    fn iter_advance(&self, _pos: usize) -> usize {
        0
    }

    fn iter_rewind(&self, _pos: usize) -> usize {
        0
    }

    fn lval_int(&mut self, _k: i64) -> Lval<'_> {
        Lval::Escalated(VanillaArray::new())
    }

    fn lval_str(&mut self, _k: &str) -> Lval<'_> {
        Lval::Escalated(VanillaArray::new())
    }

    fn elem_int(&self, k: i64, throw_on_missing: bool) -> Result<Elem<'_>, ArrayError> {
        missing(ArrayKey::Int(k), throw_on_missing)
    }

    fn elem_str(&self, k: &str, throw_on_missing: bool) -> Result<Elem<'_>, ArrayError> {
        missing(ArrayKey::str(k), throw_on_missing)
    }

    fn set_int_move(&mut self, k: i64, v: TypedValue) -> Updated {
        Self::grow(|arr| arr.set(ArrayKey::Int(k), v))
    }

    fn set_str_move(&mut self, k: &str, v: TypedValue) -> Updated {
        Self::grow(|arr| arr.set(ArrayKey::str(k), v))
    }

    fn remove_int(&mut self, _k: i64) -> Updated {
        Updated::InPlace
    }

    fn remove_str(&mut self, _k: &str) -> Updated {
        Updated::InPlace
    }

    fn append_move(&mut self, v: TypedValue) -> Updated {
        Self::grow(|arr| arr.append(v))
    }

    fn pop(&mut self) -> (Updated, TypedValue) {
        (Updated::InPlace, TypedValue::Null)
    }
}
