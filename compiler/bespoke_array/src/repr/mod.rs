//! The operation set a physical array representation provides.
//!
//! Operations receive the typed representation, never the generic handle.
//! Mutating operations report whether they changed the array in place or
//! produced a replacement ([`Updated`]); a replacement is usually the
//! escalated vanilla array, but may be another bespoke array.

use std::any::Any;

use bespoke_base::{ArrayData, ArrayKey, SortFunction, TypedValue, VanillaArray};

/// Outcome of a mutating operation.
#[must_use = "a replaced array must be installed in place of the old one"]
#[derive(Debug)]
pub enum Updated {
    /// The array was modified in place.
    InPlace,
    /// The operation produced a new array; the old one is dead.
    Replaced(ArrayData),
}

impl Updated {
    /// Replace the array with an escalated vanilla copy.
    pub fn escalated(arr: VanillaArray) -> Self {
        Updated::Replaced(ArrayData::vanilla(arr))
    }

    #[inline]
    pub fn is_in_place(&self) -> bool {
        matches!(self, Updated::InPlace)
    }

    /// Install the outcome over `target`.
    pub fn apply_to(self, target: &mut ArrayData) {
        if let Updated::Replaced(new) = self {
            *target = new;
        }
    }
}

/// Writable access to an element.
#[derive(Debug)]
pub enum Lval<'a> {
    /// The element's slot, created as `null` if it was missing.
    Slot(&'a mut TypedValue),
    /// The layout cannot hand out a slot; continue on this vanilla copy.
    Escalated(VanillaArray),
}

/// Read-only access to an element for a base operation.
#[derive(Debug, PartialEq)]
pub enum Elem<'a> {
    Slot(&'a TypedValue),
    /// The key is missing and the caller asked not to throw.
    Null,
}

/// Errors raised by array operations.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ArrayError {
    #[error("undefined array key {0}")]
    MissingKey(ArrayKey),
}

/// Garbage-collector visitor over an array's contents.
pub trait Scanner {
    fn scan_value(&mut self, value: &TypedValue);

    fn scan_key(&mut self, key: &ArrayKey) {
        if let ArrayKey::Str(s) = key {
            self.scan_value(&TypedValue::Str(s.clone()));
        }
    }
}

/// A physical array representation.
///
/// Positions are dense indices with `iter_end()` as the end sentinel.
/// Lookups of a missing key return `None` (or the end position); reads at
/// an invalid position return [`TypedValue::Uninit`].
pub trait BespokeArray: Any + Send + Sync + Sized {
    /// Bytes used by this array. Called by the collector, possibly while
    /// referenced objects are already freed, so it must not look at elements.
    fn heap_size(&self) -> usize {
        std::mem::size_of::<Self>()
    }

    fn scan(&self, scanner: &mut dyn Scanner);

    /// Copy the contents into the generic representation.
    fn escalate_to_vanilla(&self, reason: &'static str) -> VanillaArray;

    /// Prepare for immutable cross-request sharing.
    fn convert_to_uncounted(&mut self) {}

    fn release_uncounted(self: Box<Self>) {}

    fn release(self: Box<Self>) {}

    fn is_vector_data(&self) -> bool;

    // ── Reads ───────────────────────────────────────────────────────

    fn get_int(&self, k: i64) -> Option<TypedValue>;
    fn get_str(&self, k: &str) -> Option<TypedValue>;
    fn get_key(&self, pos: usize) -> TypedValue;
    fn get_val(&self, pos: usize) -> TypedValue;
    fn get_int_pos(&self, k: i64) -> usize;
    fn get_str_pos(&self, k: &str) -> usize;

    // ── Iteration ───────────────────────────────────────────────────

    fn iter_begin(&self) -> usize {
        0
    }
    fn iter_last(&self) -> usize;
    fn iter_end(&self) -> usize;
    fn iter_advance(&self, pos: usize) -> usize;
    fn iter_rewind(&self, pos: usize) -> usize;

    // ── Element access ──────────────────────────────────────────────

    fn lval_int(&mut self, k: i64) -> Lval<'_>;
    fn lval_str(&mut self, k: &str) -> Lval<'_>;
    fn elem_int(&self, k: i64, throw_on_missing: bool) -> Result<Elem<'_>, ArrayError>;
    fn elem_str(&self, k: &str, throw_on_missing: bool) -> Result<Elem<'_>, ArrayError>;

    // ── Writes ──────────────────────────────────────────────────────

    fn set_int(&mut self, k: i64, v: &TypedValue) -> Updated {
        self.set_int_move(k, v.clone())
    }
    fn set_str(&mut self, k: &str, v: &TypedValue) -> Updated {
        self.set_str_move(k, v.clone())
    }
    fn set_int_move(&mut self, k: i64, v: TypedValue) -> Updated;
    fn set_str_move(&mut self, k: &str, v: TypedValue) -> Updated;
    fn remove_int(&mut self, k: i64) -> Updated;
    fn remove_str(&mut self, k: &str) -> Updated;
    fn append(&mut self, v: &TypedValue) -> Updated {
        self.append_move(v.clone())
    }
    fn append_move(&mut self, v: TypedValue) -> Updated;

    /// Remove the last element, returning it (`null` when empty).
    fn pop(&mut self) -> (Updated, TypedValue);

    // ── Conversions ─────────────────────────────────────────────────
    //
    // Header flags are maintained by the dispatcher; these hooks only
    // change the representation when a layout has to.

    fn to_dv_array(&mut self, _copy: bool) -> Updated {
        Updated::InPlace
    }

    fn to_hack_arr(&mut self, _copy: bool) -> Updated {
        Updated::InPlace
    }

    /// Hand out a vanilla array for the sort builtin to work on.
    fn pre_sort(&mut self, _sf: SortFunction) -> VanillaArray {
        self.escalate_to_vanilla("pre_sort")
    }

    /// Take back the sorted array produced from `pre_sort`.
    fn post_sort(&mut self, sorted: VanillaArray) -> Updated {
        Updated::escalated(sorted)
    }

    fn set_legacy_array(&mut self, _copy: bool, _legacy: bool) -> Updated {
        Updated::InPlace
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
