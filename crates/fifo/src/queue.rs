//! Bounded SPSC queue and its producer / consumer ends.
//!
//! # Overview
//!
//! - [`BoundedSpscQueue`] - owns the ring until it is [split](BoundedSpscQueue::split)
//! - [`Producer`] - write end, the only side that advances the write index
//! - [`Consumer`] - read end, the only side that advances the read index
//!
//! `push` and `pop` take `&mut self`, and each end exists exactly once per
//! queue, so the single-producer / single-consumer rule is enforced by the
//! borrow checker. Either end can be sent to another thread.
//!
//! # Capacity
//!
//! A queue of capacity `N` holds exactly `N` items: the `N + 1`-th push fails
//! until the consumer makes room.
//!
//! ```
//! use spsc_fifo::BoundedSpscQueue;
//!
//! let queue = BoundedSpscQueue::<u8, 2>::new();
//! let (mut tx, mut rx) = queue.split();
//!
//! tx.push(1).unwrap();
//! tx.push(2).unwrap();
//! assert!(tx.is_full());
//! assert_eq!(tx.push(3), Err(3));
//!
//! assert_eq!(rx.pop(), Some(1));
//! assert_eq!(rx.pop(), Some(2));
//! assert_eq!(rx.pop(), None);
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::backoff::{Backoff, Timeout};
use crate::ring::{ConsumerCursor, ProducerCursor, Ring};

/// A bounded single-producer/single-consumer FIFO of capacity `N`.
pub struct BoundedSpscQueue<T, const N: usize> {
    ring: Arc<Ring<T, N>>,
}

impl<T: Send, const N: usize> BoundedSpscQueue<T, N> {
    /// Allocates an empty queue.
    ///
    /// Fails to compile if `N == 0`.
    pub fn new() -> Self {
        Self {
            ring: Arc::new(Ring::new()),
        }
    }

    /// Splits the queue into its two ends.
    #[must_use]
    pub fn split(self) -> (Producer<T, N>, Consumer<T, N>) {
        let producer = Producer {
            ring: Arc::clone(&self.ring),
            cursor: ProducerCursor::default(),
        };
        let consumer = Consumer {
            ring: self.ring,
            cursor: ConsumerCursor::default(),
        };
        (producer, consumer)
    }

    /// Number of slots. Item counts are queried on the split ends.
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<T: Send, const N: usize> Default for BoundedSpscQueue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> fmt::Debug for BoundedSpscQueue<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedSpscQueue")
            .field("capacity", &N)
            .finish()
    }
}

/// Creates a queue of capacity `N` and returns its `(Producer, Consumer)` pair.
///
/// ```
/// let (mut tx, mut rx) = spsc_fifo::channel::<String, 16>();
///
/// tx.push("hello".to_string()).unwrap();
/// assert_eq!(rx.pop().as_deref(), Some("hello"));
/// ```
#[must_use]
pub fn channel<T: Send, const N: usize>() -> (Producer<T, N>, Consumer<T, N>) {
    BoundedSpscQueue::new().split()
}

/// Write end of a [`BoundedSpscQueue`].
pub struct Producer<T, const N: usize> {
    ring: Arc<Ring<T, N>>,
    cursor: ProducerCursor,
}

impl<T: Send, const N: usize> Producer<T, N> {
    /// Attempts to push an item without waiting.
    ///
    /// # Errors
    ///
    /// Returns `Err(item)` if the queue is full; the queue is left untouched.
    #[inline]
    pub fn push(&mut self, item: T) -> Result<(), T> {
        // SAFETY: a queue has exactly one `Producer`, and `&mut self` keeps
        // its cursor on one thread at a time.
        unsafe { self.ring.push(&mut self.cursor, item) }
    }

    /// Retries [`push`](Self::push) with backoff until it succeeds or the
    /// timeout expires.
    ///
    /// # Errors
    ///
    /// Returns `Err(item)` on timeout.
    pub fn push_blocking(&mut self, mut item: T, timeout: Timeout) -> Result<(), T> {
        let deadline = timeout.deadline();
        let mut backoff = Backoff::new();
        loop {
            match self.push(item) {
                Ok(()) => return Ok(()),
                Err(returned) => {
                    item = returned;
                    if deadline.is_some_and(|dl| Instant::now() >= dl) {
                        return Err(item);
                    }
                    backoff.snooze();
                }
            }
        }
    }

    /// Number of resident items. May over-report while the consumer is
    /// concurrently popping; never exceeds the capacity.
    pub fn len(&self) -> usize {
        self.ring.len_from_producer(&self.cursor)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Returns true once the [`Consumer`] has been dropped.
    pub fn is_abandoned(&self) -> bool {
        Arc::strong_count(&self.ring) == 1
    }
}

impl<T, const N: usize> fmt::Debug for Producer<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("cursor", &self.cursor)
            .field("capacity", &N)
            .finish()
    }
}

/// Read end of a [`BoundedSpscQueue`].
pub struct Consumer<T, const N: usize> {
    ring: Arc<Ring<T, N>>,
    cursor: ConsumerCursor,
}

impl<T: Send, const N: usize> Consumer<T, N> {
    /// Attempts to pop the oldest item without waiting.
    ///
    /// Returns `None` if the queue is empty; the queue is left untouched.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        // SAFETY: a queue has exactly one `Consumer`, and `&mut self` keeps
        // its cursor on one thread at a time.
        unsafe { self.ring.pop(&mut self.cursor) }
    }

    /// Retries [`pop`](Self::pop) with backoff until an item arrives or the
    /// timeout expires.
    pub fn pop_blocking(&mut self, timeout: Timeout) -> Option<T> {
        let deadline = timeout.deadline();
        let mut backoff = Backoff::new();
        loop {
            if let Some(item) = self.pop() {
                return Some(item);
            }
            if deadline.is_some_and(|dl| Instant::now() >= dl) {
                return None;
            }
            backoff.snooze();
        }
    }

    /// Number of resident items. May under-report while the producer is
    /// concurrently pushing.
    pub fn len(&self) -> usize {
        self.ring.len_from_consumer(&self.cursor)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Returns true once the [`Producer`] has been dropped.
    pub fn is_abandoned(&self) -> bool {
        Arc::strong_count(&self.ring) == 1
    }
}

impl<T, const N: usize> fmt::Debug for Consumer<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("cursor", &self.cursor)
            .field("capacity", &N)
            .finish()
    }
}
