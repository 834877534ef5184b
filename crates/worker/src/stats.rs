//! Worker counters.

use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::state::WorkerState;

/// Snapshot of a worker's counters.
///
/// `accepted` and `rejected` are producer-side and exact. `processed` and
/// `panicked` are written by the worker thread and may lag while it runs; after
/// a successful `stop_and_drain`, `processed + panicked == accepted`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    pub accepted: u64,
    /// Enqueue attempts turned away because the queue was full.
    pub rejected: u64,
    pub processed: u64,
    pub panicked: u64,
    /// Items resident in the queue when the snapshot was taken.
    pub pending: usize,
    pub state: WorkerState,
}

/// Counters written by the worker thread.
#[derive(Debug, Default)]
pub(crate) struct ConsumerCounters {
    processed: AtomicU64,
    panicked: AtomicU64,
}

impl ConsumerCounters {
    pub(crate) fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the new panic count.
    pub(crate) fn record_panicked(&self) -> u64 {
        self.panicked.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub(crate) fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub(crate) fn panicked(&self) -> u64 {
        self.panicked.load(Ordering::Relaxed)
    }
}
