//! Active worker: an active object draining a bounded SPSC queue.
//!
//! The handle is the single producer. The dedicated thread is the single
//! consumer: it pops items in order and hands each one to the [`Processor`].
//! Shutdown is always stop-then-drain: every item accepted by
//! [`ActiveWorker::enqueue`] is processed before the worker reports itself
//! stopped.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle, Thread};
use std::time::Duration;

use log::{debug, error, trace, warn};
use parking_lot::{Condvar, Mutex};
use spsc_fifo::{Backoff, BoundedSpscQueue, Consumer, Producer};

use crate::config::{IdleStrategy, PanicPolicy, WorkerConfig};
use crate::error::{Full, WorkerError};
use crate::idle::{self, Idler};
use crate::processor::Processor;
use crate::state::{StateCell, WorkerState};
use crate::stats::{ConsumerCounters, WorkerStats};

/// State shared between the worker handle and its thread.
///
/// The mutex/condvar pair only serves the shutdown handshake; the queue itself
/// is never behind a lock.
struct Shared {
    name: String,
    state: StateCell,
    counters: ConsumerCounters,
    exited: Mutex<bool>,
    exit_signal: Condvar,
}

impl Shared {
    fn new(name: String) -> Self {
        Self {
            name,
            state: StateCell::new(),
            counters: ConsumerCounters::default(),
            exited: Mutex::new(false),
            exit_signal: Condvar::new(),
        }
    }

    fn mark_exited(&self) {
        self.state.finish();
        *self.exited.lock() = true;
        self.exit_signal.notify_all();
    }

    /// Returns true if the consume loop exited within `timeout`.
    fn wait_exited(&self, timeout: Duration) -> bool {
        let mut exited = self.exited.lock();
        self.exit_signal
            .wait_while_for(&mut exited, |exited| !*exited, timeout);
        *exited
    }
}

/// Marks the worker stopped however the consume loop is left.
struct ExitGuard<'a>(&'a Shared);

impl Drop for ExitGuard<'_> {
    fn drop(&mut self) {
        trace!("{}: {} -> {}", self.0.name, self.0.state.get(), WorkerState::Stopped);
        self.0.mark_exited();
    }
}

/// Read-only view of a worker's lifecycle, usable from any thread.
///
/// A monitor stays valid after the worker handle is consumed by
/// [`ActiveWorker::stop_and_drain`] or dropped, including when a drain timeout
/// detached the thread.
#[derive(Clone)]
pub struct WorkerMonitor {
    shared: Arc<Shared>,
}

impl WorkerMonitor {
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn state(&self) -> WorkerState {
        self.shared.state.get()
    }

    pub fn processed(&self) -> u64 {
        self.shared.counters.processed()
    }

    pub fn panicked(&self) -> u64 {
        self.shared.counters.panicked()
    }

    /// Blocks until the consume loop has exited or `timeout` elapsed.
    ///
    /// Returns true once the worker is [`WorkerState::Stopped`].
    pub fn wait_stopped(&self, timeout: Duration) -> bool {
        self.shared.wait_exited(timeout)
    }
}

impl fmt::Debug for WorkerMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerMonitor")
            .field("name", &self.shared.name)
            .field("state", &self.state())
            .field("processed", &self.processed())
            .finish()
    }
}

/// An active object owning a bounded queue of capacity `N` and one thread.
///
/// ```
/// use std::sync::mpsc;
/// use active_worker::ActiveWorker;
///
/// let (tx, rx) = mpsc::channel();
/// let mut worker = ActiveWorker::<u32, 16>::spawn(move |item: u32| {
///     tx.send(item * 2).unwrap();
/// })
/// .unwrap();
///
/// for i in 0..100 {
///     worker.enqueue_blocking(i);
/// }
/// let stats = worker.stop_and_drain().unwrap();
///
/// assert_eq!(stats.processed, 100);
/// assert_eq!(rx.iter().take(3).collect::<Vec<_>>(), vec![0, 2, 4]);
/// ```
pub struct ActiveWorker<T: Send + 'static, const N: usize> {
    producer: Producer<T, N>,
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
    thread: Thread,
    config: WorkerConfig,
    unpark_on_enqueue: bool,
    accepted: u64,
    rejected: u64,
}

impl<T: Send + 'static, const N: usize> ActiveWorker<T, N> {
    /// Spawns a worker with the default configuration.
    pub fn spawn<P: Processor<T>>(processor: P) -> Result<Self, WorkerError> {
        Self::with_config(WorkerConfig::default(), processor)
    }

    /// Spawns a worker; its thread starts consuming immediately.
    pub fn with_config<P: Processor<T>>(
        config: WorkerConfig,
        processor: P,
    ) -> Result<Self, WorkerError> {
        let (producer, consumer) = BoundedSpscQueue::<T, N>::new().split();
        let shared = Arc::new(Shared::new(config.name.clone()));

        let mut builder = thread::Builder::new().name(config.name.clone());
        if let Some(bytes) = config.stack_size {
            builder = builder.stack_size(bytes);
        }

        let loop_shared = Arc::clone(&shared);
        let strategy = config.idle;
        let handle = builder.spawn(move || consume(consumer, processor, &loop_shared, strategy))?;

        debug!(
            "{}: spawned (capacity {}, idle {:?}, drain timeout {:?})",
            config.name, N, config.idle, config.drain_timeout
        );

        Ok(Self {
            producer,
            thread: handle.thread().clone(),
            handle: Some(handle),
            shared,
            unpark_on_enqueue: idle::needs_unpark(config.idle),
            config,
            accepted: 0,
            rejected: 0,
        })
    }

    /// Hands an item to the worker without waiting.
    ///
    /// Once this returns `Ok`, the item will be processed exactly once, after
    /// every item accepted before it.
    ///
    /// # Errors
    ///
    /// Returns [`Full`] with the item if the queue has no free slot.
    pub fn enqueue(&mut self, item: T) -> Result<(), Full<T>> {
        match self.producer.push(item) {
            Ok(()) => {
                self.accepted += 1;
                if self.unpark_on_enqueue {
                    self.thread.unpark();
                }
                Ok(())
            }
            Err(item) => {
                self.rejected += 1;
                Err(Full(item))
            }
        }
    }

    /// Retries [`enqueue`](Self::enqueue) with spin-then-yield backoff until
    /// the item is accepted. Returns how many attempts were turned away.
    ///
    /// Waits forever if the processor never returns.
    pub fn enqueue_blocking(&mut self, mut item: T) -> u64 {
        let mut backoff = Backoff::new();
        let mut turned_away = 0;
        loop {
            match self.enqueue(item) {
                Ok(()) => return turned_away,
                Err(Full(returned)) => {
                    item = returned;
                    turned_away += 1;
                    backoff.snooze();
                }
            }
        }
    }

    /// Items accepted but not yet taken by the worker thread.
    pub fn len(&self) -> usize {
        self.producer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.producer.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn state(&self) -> WorkerState {
        self.shared.state.get()
    }

    /// Returns a handle that observes this worker from other threads.
    pub fn monitor(&self) -> WorkerMonitor {
        WorkerMonitor {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn stats(&self) -> WorkerStats {
        WorkerStats {
            accepted: self.accepted,
            rejected: self.rejected,
            processed: self.shared.counters.processed(),
            panicked: self.shared.counters.panicked(),
            pending: self.producer.len(),
            state: self.shared.state.get(),
        }
    }

    /// Stops the worker after it has processed every accepted item, then
    /// joins its thread.
    ///
    /// # Errors
    ///
    /// - [`WorkerError::DrainTimeout`] if a drain timeout is configured and
    ///   the drain outlives it. The thread is detached and keeps draining.
    /// - [`WorkerError::ProcessorPanicked`] under [`PanicPolicy::Propagate`]
    ///   when any item panicked. The drain has completed regardless.
    /// - [`WorkerError::ThreadPanicked`] if the thread died abnormally.
    pub fn stop_and_drain(mut self) -> Result<WorkerStats, WorkerError> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<WorkerStats, WorkerError> {
        let Some(handle) = self.handle.take() else {
            return Ok(self.stats());
        };

        if self.shared.state.begin_drain() {
            trace!(
                "{}: {} -> {} ({} pending)",
                self.config.name,
                WorkerState::Running,
                WorkerState::Draining,
                self.producer.len()
            );
        }
        self.thread.unpark();

        if let Some(timeout) = self.config.drain_timeout {
            if !self.shared.wait_exited(timeout) {
                let pending = self.producer.len();
                warn!(
                    "{}: drain still running after {timeout:?} with {pending} items queued; detaching",
                    self.config.name
                );
                drop(handle);
                return Err(WorkerError::DrainTimeout { timeout, pending });
            }
        }

        handle.join().map_err(|_| WorkerError::ThreadPanicked)?;

        let stats = self.stats();
        debug!(
            "{}: stopped ({} processed, {} panicked, {} rejected enqueues)",
            self.config.name, stats.processed, stats.panicked, stats.rejected
        );

        if self.config.panic_policy == PanicPolicy::Propagate && stats.panicked > 0 {
            return Err(WorkerError::ProcessorPanicked {
                count: stats.panicked,
            });
        }
        Ok(stats)
    }
}

impl<T: Send + 'static, const N: usize> Drop for ActiveWorker<T, N> {
    fn drop(&mut self) {
        if self.handle.is_none() {
            return;
        }
        debug!(
            "{}: dropped while {}, draining {} items",
            self.config.name,
            self.shared.state.get(),
            self.producer.len()
        );
        if let Err(err) = self.shutdown() {
            error!("{}: shutdown on drop failed: {err}", self.config.name);
        }
    }
}

impl<T: Send + 'static, const N: usize> fmt::Debug for ActiveWorker<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveWorker")
            .field("name", &self.config.name)
            .field("state", &self.shared.state.get())
            .field("len", &self.producer.len())
            .field("capacity", &N)
            .finish()
    }
}

/// The consume loop, run on the worker thread.
fn consume<T, P, const N: usize>(
    mut consumer: Consumer<T, N>,
    mut processor: P,
    shared: &Shared,
    strategy: IdleStrategy,
) where
    T: Send,
    P: Processor<T>,
{
    let _exit = ExitGuard(shared);
    let mut idler = Idler::new(strategy);
    let mut seq: u64 = 0;

    run_hook(shared, "on_start", || processor.on_start());

    loop {
        // Read before popping: once `Draining` is visible, so is every push
        // that preceded the stop request, and an empty pop means drained.
        let draining = shared.state.get() == WorkerState::Draining;

        match consumer.pop() {
            Some(item) => {
                idler.reset();
                process_one(&mut processor, item, seq, shared);
                seq += 1;
            }
            None if draining => break,
            None => idler.idle(),
        }
    }

    run_hook(shared, "on_stop", || processor.on_stop());
}

fn process_one<T, P: Processor<T>>(processor: &mut P, item: T, seq: u64, shared: &Shared) {
    match panic::catch_unwind(AssertUnwindSafe(|| processor.process(item))) {
        Ok(()) => shared.counters.record_processed(),
        Err(payload) => {
            let count = shared.counters.record_panicked();
            error!(
                "{}: processor panicked on item #{seq} ({count} so far): {}",
                shared.name,
                panic_message(&*payload)
            );
        }
    }
}

fn run_hook(shared: &Shared, hook: &str, f: impl FnOnce()) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(f)) {
        error!(
            "{}: {hook} panicked: {}",
            shared.name,
            panic_message(&*payload)
        );
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
