//! Worker configuration.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default name given to the worker thread.
pub const DEFAULT_THREAD_NAME: &str = "active-worker";

/// What the consume loop does when it finds the queue empty.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdleStrategy {
    /// Yield the processor on every empty poll.
    #[default]
    Yield,
    /// Busy-spin for up to `spins` consecutive empty polls, then yield.
    Spin { spins: u32 },
    /// Park the thread for at most `timeout`; every accepted item unparks it.
    Park { timeout: Duration },
}

/// What happens after the processor panicked on one or more items.
///
/// The panicking item is always skipped and the loop always carries on with
/// the next one; the policy only decides what the caller sees at shutdown.
///
/// Only [`Processor::process`](crate::Processor::process) is covered. A panic
/// in `on_start` or `on_stop` is logged and never counted or propagated.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanicPolicy {
    /// Log and count; `stop_and_drain` still succeeds.
    #[default]
    Continue,
    /// Log and count; `stop_and_drain` fails with `ProcessorPanicked`.
    Propagate,
}

/// Configuration for an [`ActiveWorker`](crate::ActiveWorker).
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub name: String,
    pub stack_size: Option<usize>,
    pub idle: IdleStrategy,
    /// Upper bound on how long `stop_and_drain` waits for the drain.
    /// `None` waits as long as it takes.
    pub drain_timeout: Option<Duration>,
    pub panic_policy: PanicPolicy,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_THREAD_NAME.to_string(),
            stack_size: None,
            idle: IdleStrategy::default(),
            drain_timeout: None,
            panic_policy: PanicPolicy::default(),
        }
    }
}

impl WorkerConfig {
    /// Creates a new worker configuration builder.
    pub fn builder() -> WorkerConfigBuilder {
        WorkerConfigBuilder::default()
    }
}

/// Builder for ergonomic worker configuration construction.
#[derive(Debug, Clone, Default)]
pub struct WorkerConfigBuilder {
    config: WorkerConfig,
}

impl WorkerConfigBuilder {
    /// Sets the worker thread name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Sets the worker thread stack size in bytes.
    pub fn stack_size(mut self, bytes: usize) -> Self {
        self.config.stack_size = Some(bytes);
        self
    }

    /// Sets the idle strategy of the consume loop.
    pub fn idle(mut self, idle: IdleStrategy) -> Self {
        self.config.idle = idle;
        self
    }

    /// Bounds the wait in `stop_and_drain`.
    pub fn drain_timeout(mut self, timeout: Duration) -> Self {
        self.config.drain_timeout = Some(timeout);
        self
    }

    /// Sets the processor panic policy.
    pub fn panic_policy(mut self, policy: PanicPolicy) -> Self {
        self.config.panic_policy = policy;
        self
    }

    /// Builds the worker configuration.
    pub fn build(self) -> WorkerConfig {
        self.config
    }
}
