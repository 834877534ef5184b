//! Worker lifecycle states.
//!
//! ```text
//!   Running ──stop / drop──▶ Draining ──queue empty──▶ Stopped
//! ```

use core::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lifecycle state of an [`ActiveWorker`](crate::ActiveWorker).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WorkerState {
    /// Consuming items as they arrive.
    Running = 0,
    /// Stop requested; consuming whatever is left, accepting nothing new.
    Draining = 1,
    /// Terminal. The loop has exited and no further pops occur.
    Stopped = 2,
}

impl WorkerState {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Running,
            1 => Self::Draining,
            _ => Self::Stopped,
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Atomic cell shared between the worker handle and its thread.
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) const fn new() -> Self {
        Self(AtomicU8::new(WorkerState::Running as u8))
    }

    /// Acquire pairs with the Release in [`StateCell::begin_drain`]: a loop that
    /// observes `Draining` also observes every push made before the request.
    pub(crate) fn get(&self) -> WorkerState {
        WorkerState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// `Running → Draining`. Returns false if the worker had already left
    /// `Running`.
    pub(crate) fn begin_drain(&self) -> bool {
        self.0
            .compare_exchange(
                WorkerState::Running as u8,
                WorkerState::Draining as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    pub(crate) fn finish(&self) {
        self.0.store(WorkerState::Stopped as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_run_forward_only() {
        let cell = StateCell::new();
        assert_eq!(cell.get(), WorkerState::Running);

        assert!(cell.begin_drain());
        assert_eq!(cell.get(), WorkerState::Draining);
        assert!(!cell.begin_drain());

        cell.finish();
        assert_eq!(cell.get(), WorkerState::Stopped);
        assert!(!cell.begin_drain());
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(WorkerState::Draining.to_string(), "draining");
    }
}
