//! Dispatch logging for checked vtables.
//!
//! Every checked dispatch emits a `trace` event on the `bespoke::dispatch`
//! target. Profiling can additionally install one process-wide
//! [`DispatchSink`] to count or record calls per layout and operation;
//! [`DispatchCounter`] is the stock implementation.

use std::sync::OnceLock;

use bespoke_base::{ArrayData, ArrayId, LayoutIndex};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// Receiver for checked dispatch events.
pub trait DispatchSink: Send + Sync {
    fn record(&self, array: ArrayId, layout: LayoutIndex, op: &'static str);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DispatchSinkError {
    #[error("a dispatch sink is already installed")]
    AlreadyInstalled,
}

static SINK: OnceLock<&'static dyn DispatchSink> = OnceLock::new();

/// Install the process-wide sink. Only the first call succeeds.
pub fn install_dispatch_sink(sink: &'static dyn DispatchSink) -> Result<(), DispatchSinkError> {
    SINK.set(sink).map_err(|_| DispatchSinkError::AlreadyInstalled)
}

pub fn dispatch_sink() -> Option<&'static dyn DispatchSink> {
    SINK.get().copied()
}

/// Report one checked dispatch of `op` on `ad`.
#[inline]
pub fn log_dispatch(ad: &ArrayData, op: &'static str) {
    tracing::trace!(
        target: "bespoke::dispatch",
        array = %ad.id(),
        kind = %ad.kind(),
        op,
        "dispatch"
    );
    if let (Some(sink), Some(layout)) = (dispatch_sink(), ad.layout()) {
        sink.record(ad.id(), layout, op);
    }
}

/// Counts dispatches per `(layout, op)`.
#[derive(Debug, Default)]
pub struct DispatchCounter {
    counts: Mutex<FxHashMap<(LayoutIndex, &'static str), u64>>,
}

impl DispatchCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, layout: LayoutIndex, op: &'static str) -> u64 {
        self.counts.lock().get(&(layout, op)).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.lock().values().sum()
    }

    /// All counts, ordered by layout then operation name.
    pub fn snapshot(&self) -> Vec<(LayoutIndex, &'static str, u64)> {
        let mut out: Vec<_> = self
            .counts
            .lock()
            .iter()
            .map(|(&(layout, op), &n)| (layout, op, n))
            .collect();
        out.sort_unstable_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        out
    }

    pub fn clear(&self) {
        self.counts.lock().clear();
    }
}

impl DispatchSink for DispatchCounter {
    fn record(&self, _array: ArrayId, layout: LayoutIndex, op: &'static str) {
        *self.counts.lock().entry((layout, op)).or_insert(0) += 1;
    }
}
