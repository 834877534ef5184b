//! Worker error types.

use core::fmt;
use std::io;
use std::time::Duration;

use thiserror::Error;

/// Errors reported while spawning or shutting down a worker.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),
    #[error("drain did not finish within {timeout:?}; {pending} items still queued")]
    DrainTimeout { timeout: Duration, pending: usize },
    #[error("processor panicked on {count} item(s)")]
    ProcessorPanicked { count: u64 },
    #[error("worker thread terminated abnormally")]
    ThreadPanicked,
}

/// Backpressure signal returned by `enqueue` when the queue is full.
///
/// Carries the rejected item back to the caller, who decides whether to
/// retry, drop, or escalate.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Full<T>(pub T);

impl<T> Full<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Full(..)")
    }
}

impl<T> fmt::Display for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker queue is full")
    }
}

impl<T> std::error::Error for Full<T> {}
