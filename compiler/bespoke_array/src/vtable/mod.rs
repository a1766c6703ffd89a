//! `LayoutFunctions`: the erased operation table of one representation.

use std::fmt;

use bespoke_base::config::CHECKED_DISPATCH;
use bespoke_base::{ArrayData, SortFunction, TypedValue};

use crate::{ArrayError, BespokeArray, Elem, Lval, Scanner, Updated};

mod dispatch;

/// One function pointer per representation operation, over the generic
/// array handle.
///
/// Built once per representation at layout registration and immutable
/// afterwards. Every entry assumes the array it receives carries the
/// representation the table was built for; see the module docs of this
/// crate for how that is (or is not) verified.
pub struct LayoutFunctions {
    pub heap_size: fn(&ArrayData) -> usize,
    pub scan: fn(&ArrayData, &mut dyn Scanner),
    pub escalate_to_vanilla: fn(&ArrayData, &'static str) -> ArrayData,
    pub convert_to_uncounted: fn(&mut ArrayData),
    pub release_uncounted: fn(ArrayData),
    pub release: fn(ArrayData),
    pub is_vector_data: fn(&ArrayData) -> bool,
    pub get_int: fn(&ArrayData, i64) -> Option<TypedValue>,
    pub get_str: fn(&ArrayData, &str) -> Option<TypedValue>,
    pub get_key: fn(&ArrayData, usize) -> TypedValue,
    pub get_val: fn(&ArrayData, usize) -> TypedValue,
    pub get_int_pos: fn(&ArrayData, i64) -> usize,
    pub get_str_pos: fn(&ArrayData, &str) -> usize,
    pub iter_begin: fn(&ArrayData) -> usize,
    pub iter_last: fn(&ArrayData) -> usize,
    pub iter_end: fn(&ArrayData) -> usize,
    pub iter_advance: fn(&ArrayData, usize) -> usize,
    pub iter_rewind: fn(&ArrayData, usize) -> usize,
    pub lval_int: for<'a> fn(&'a mut ArrayData, i64) -> Lval<'a>,
    pub lval_str: for<'a> fn(&'a mut ArrayData, &str) -> Lval<'a>,
    pub elem_int: for<'a> fn(&'a ArrayData, i64, bool) -> Result<Elem<'a>, ArrayError>,
    pub elem_str: for<'a> fn(&'a ArrayData, &str, bool) -> Result<Elem<'a>, ArrayError>,
    pub set_int: fn(&mut ArrayData, i64, &TypedValue) -> Updated,
    pub set_str: fn(&mut ArrayData, &str, &TypedValue) -> Updated,
    pub set_int_move: fn(&mut ArrayData, i64, TypedValue) -> Updated,
    pub set_str_move: fn(&mut ArrayData, &str, TypedValue) -> Updated,
    pub remove_int: fn(&mut ArrayData, i64) -> Updated,
    pub remove_str: fn(&mut ArrayData, &str) -> Updated,
    pub append: fn(&mut ArrayData, &TypedValue) -> Updated,
    pub append_move: fn(&mut ArrayData, TypedValue) -> Updated,
    pub pop: fn(&mut ArrayData) -> (Updated, TypedValue),
    pub to_dv_array: fn(&mut ArrayData, bool) -> Updated,
    pub to_hack_arr: fn(&mut ArrayData, bool) -> Updated,
    pub pre_sort: fn(&mut ArrayData, SortFunction) -> ArrayData,
    pub post_sort: fn(&mut ArrayData, ArrayData) -> Updated,
    pub set_legacy_array: fn(&mut ArrayData, bool, bool) -> Updated,
}

impl LayoutFunctions {
    /// Vtable whose entries verify the representation type before every
    /// call and report the call to the dispatch log.
    pub fn checked<A: BespokeArray>() -> Self {
        Self::build::<A, true>()
    }

    /// Vtable whose entries reinterpret the array body as `A` directly.
    ///
    /// # Safety
    ///
    /// Every array passed to an entry of the returned table must carry an
    /// `A` body. In practice that means the table is owned by a concrete
    /// layout and only reached through guards that proved the array's
    /// layout.
    #[allow(unsafe_code, reason = "constructor of the unchecked dispatch seam")]
    pub unsafe fn unchecked<A: BespokeArray>() -> Self {
        Self::build::<A, false>()
    }

    /// The build's default discipline: checked when
    /// [`CHECKED_DISPATCH`] is set, unchecked otherwise.
    ///
    /// # Safety
    ///
    /// When [`CHECKED_DISPATCH`] is off this is
    /// [`unchecked`](Self::unchecked) and carries its contract. Layout
    /// registration is where that contract is taken on.
    #[allow(unsafe_code, reason = "may build the unchecked dispatch seam")]
    pub unsafe fn for_array<A: BespokeArray>() -> Self {
        if CHECKED_DISPATCH {
            Self::build::<A, true>()
        } else {
            Self::build::<A, false>()
        }
    }

    /// [`for_array`](Self::for_array), leaked for the process lifetime.
    ///
    /// # Safety
    ///
    /// See [`for_array`](Self::for_array).
    #[allow(unsafe_code, reason = "may build the unchecked dispatch seam")]
    pub unsafe fn leak<A: BespokeArray>() -> &'static Self {
        Box::leak(Box::new(Self::for_array::<A>()))
    }

    /// A checked table leaked for the process lifetime, in every build.
    pub fn leak_checked<A: BespokeArray>() -> &'static Self {
        Box::leak(Box::new(Self::checked::<A>()))
    }

    fn build<A: BespokeArray, const C: bool>() -> Self {
        use dispatch as d;
        Self {
            heap_size: d::heap_size::<A, C>,
            scan: d::scan::<A, C>,
            escalate_to_vanilla: d::escalate_to_vanilla::<A, C>,
            convert_to_uncounted: d::convert_to_uncounted::<A, C>,
            release_uncounted: d::release_uncounted::<A, C>,
            release: d::release::<A, C>,
            is_vector_data: d::is_vector_data::<A, C>,
            get_int: d::get_int::<A, C>,
            get_str: d::get_str::<A, C>,
            get_key: d::get_key::<A, C>,
            get_val: d::get_val::<A, C>,
            get_int_pos: d::get_int_pos::<A, C>,
            get_str_pos: d::get_str_pos::<A, C>,
            iter_begin: d::iter_begin::<A, C>,
            iter_last: d::iter_last::<A, C>,
            iter_end: d::iter_end::<A, C>,
            iter_advance: d::iter_advance::<A, C>,
            iter_rewind: d::iter_rewind::<A, C>,
            lval_int: d::lval_int::<A, C>,
            lval_str: d::lval_str::<A, C>,
            elem_int: d::elem_int::<A, C>,
            elem_str: d::elem_str::<A, C>,
            set_int: d::set_int::<A, C>,
            set_str: d::set_str::<A, C>,
            set_int_move: d::set_int_move::<A, C>,
            set_str_move: d::set_str_move::<A, C>,
            remove_int: d::remove_int::<A, C>,
            remove_str: d::remove_str::<A, C>,
            append: d::append::<A, C>,
            append_move: d::append_move::<A, C>,
            pop: d::pop::<A, C>,
            to_dv_array: d::to_dv_array::<A, C>,
            to_hack_arr: d::to_hack_arr::<A, C>,
            pre_sort: d::pre_sort::<A, C>,
            post_sort: d::post_sort::<A, C>,
            set_legacy_array: d::set_legacy_array::<A, C>,
        }
    }
}

impl fmt::Debug for LayoutFunctions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutFunctions")
            .field("addr", &std::ptr::from_ref(self))
            .finish_non_exhaustive()
    }
}
