//! Build-time switches.
//!
//! The bespoke core has exactly one configuration surface: whether internal
//! consistency checks are compiled in. Debug builds always check; release
//! builds check only with the `checked` cargo feature.
//!
//! - `RUST_LOG=bespoke::dispatch=trace` shows every checked dispatch.
//! - `RUST_LOG=bespoke_layout=debug` shows layout registration and sealing.

/// Whether vtables built by `LayoutFunctions::for_array` downcast through
/// the self-describing check (and log the dispatch) before each call.
///
/// When `false`, the array body is reinterpreted directly as the concrete
/// representation. That path relies on guards upstream having proven the
/// array's layout.
pub const CHECKED_DISPATCH: bool = cfg!(any(debug_assertions, feature = "checked"));

/// Default validation mode of a fresh `HierarchyBuilder`.
///
/// Structural checks needed for memory safety (registered parents, reserved
/// indices) run regardless. Lattice checks (immediate parents, unique
/// liveable ancestors, unique joins) only run when this is set.
pub const VALIDATE_HIERARCHY: bool = cfg!(any(debug_assertions, feature = "checked"));
