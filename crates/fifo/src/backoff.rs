//! Retry helpers for callers that choose to wait on a full or empty queue.
//!
//! The queue itself never waits. These helpers only back the `*_blocking`
//! conveniences on the handles and the worker's producer-side retry loop.

use std::hint;
use std::thread;
use std::time::{Duration, Instant};

/// Number of exponential spin rounds before [`Backoff::snooze`] starts yielding.
const SPIN_LIMIT: u32 = 6;

/// How long a blocking operation may wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    /// Wait indefinitely.
    Infinite,
    /// Wait for at most the specified duration.
    Duration(Duration),
}

impl Timeout {
    pub(crate) fn deadline(self) -> Option<Instant> {
        match self {
            Self::Infinite => None,
            Self::Duration(d) => Some(Instant::now() + d),
        }
    }
}

impl From<Duration> for Timeout {
    fn from(d: Duration) -> Self {
        Self::Duration(d)
    }
}

/// Spin-then-yield backoff.
///
/// The first rounds spin with an exponentially growing number of
/// [`hint::spin_loop`] calls, after which every round yields the processor.
#[derive(Debug, Default)]
pub struct Backoff {
    step: u32,
}

impl Backoff {
    pub const fn new() -> Self {
        Self { step: 0 }
    }

    /// Waits a little, escalating from spinning to yielding.
    pub fn snooze(&mut self) {
        if self.step <= SPIN_LIMIT {
            for _ in 0..(1u32 << self.step) {
                hint::spin_loop();
            }
            self.step += 1;
        } else {
            thread::yield_now();
        }
    }

    /// Returns true once the backoff has escalated to yielding.
    pub fn is_yielding(&self) -> bool {
        self.step > SPIN_LIMIT
    }

    pub fn reset(&mut self) {
        self.step = 0;
    }
}
