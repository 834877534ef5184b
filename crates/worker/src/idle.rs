//! Empty-queue behavior of the consume loop.

use std::hint;
use std::thread;

use crate::config::IdleStrategy;

/// Runtime state for an [`IdleStrategy`].
#[derive(Debug)]
pub(crate) struct Idler {
    strategy: IdleStrategy,
    misses: u32,
}

impl Idler {
    pub(crate) fn new(strategy: IdleStrategy) -> Self {
        Self {
            strategy,
            misses: 0,
        }
    }

    /// Called after a pop found the queue empty.
    pub(crate) fn idle(&mut self) {
        match self.strategy {
            IdleStrategy::Yield => thread::yield_now(),
            IdleStrategy::Spin { spins } => {
                if self.misses < spins {
                    self.misses += 1;
                    hint::spin_loop();
                } else {
                    thread::yield_now();
                }
            }
            IdleStrategy::Park { timeout } => thread::park_timeout(timeout),
        }
    }

    /// Called after a pop returned an item.
    pub(crate) fn reset(&mut self) {
        self.misses = 0;
    }
}

/// Whether producers must unpark the worker thread after handing it work.
pub(crate) fn needs_unpark(strategy: IdleStrategy) -> bool {
    matches!(strategy, IdleStrategy::Park { .. })
}
