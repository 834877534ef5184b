//! Lock-free SPSC ring buffer algorithm.
//!
//! # Safety
//!
//! The push and pop entry points are `unsafe` because they require the caller
//! to uphold the SPSC invariant: at most one [`ProducerCursor`] and one
//! [`ConsumerCursor`] exist per ring, and each is used from one thread at a
//! time. [`crate::queue`] enforces this through ownership of the handles.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;

use crate::index::Wrap;

/// A single slot in the ring buffer.
///
/// Initialized iff its ring index lies in `[read, write)`.
struct Slot<T> {
    value: UnsafeCell<MaybeUninit<T>>,
}

impl<T> Slot<T> {
    fn vacant() -> Self {
        Self {
            value: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }
}

/// Producer-local view: its own index plus the last `read` it observed.
#[derive(Debug, Default)]
pub(crate) struct ProducerCursor {
    write: usize,
    cached_read: usize,
}

/// Consumer-local view: its own index plus the last `write` it observed.
#[derive(Debug, Default)]
pub(crate) struct ConsumerCursor {
    read: usize,
    cached_write: usize,
}

pub(crate) struct Ring<T, const N: usize> {
    /// Next ring index to write. Stored only by the producer.
    write: CachePadded<AtomicUsize>,

    /// Next ring index to read. Stored only by the consumer.
    read: CachePadded<AtomicUsize>,

    slots: Box<[Slot<T>]>,
}

impl<T, const N: usize> Ring<T, N> {
    pub(crate) fn new() -> Self {
        let () = Wrap::<N>::VALID;

        Self {
            write: CachePadded::new(AtomicUsize::new(0)),
            read: CachePadded::new(AtomicUsize::new(0)),
            slots: (0..N).map(|_| Slot::vacant()).collect(),
        }
    }

    /// Attempts to push an item onto the queue.
    ///
    /// # Safety
    ///
    /// `cursor` must be the only producer cursor of this ring, and must not be
    /// used concurrently from another thread.
    #[inline]
    pub(crate) unsafe fn push(&self, cursor: &mut ProducerCursor, item: T) -> Result<(), T> {
        let write = cursor.write;

        if Wrap::<N>::is_full(write, cursor.cached_read) {
            // Acquire pairs with the consumer's Release store in `pop`: the
            // slot we are about to overwrite has been fully moved out.
            cursor.cached_read = self.read.load(Ordering::Acquire);
            if Wrap::<N>::is_full(write, cursor.cached_read) {
                return Err(item);
            }
        }

        // SAFETY: `write - read < N`, so the slot at `write` is vacant and the
        // consumer will not touch it until `write` is published below. The
        // slot index is in `[0, N)` and `slots.len() == N`.
        unsafe {
            let slot = self.slots.get_unchecked(Wrap::<N>::slot(write));
            (*slot.value.get()).write(item);
        }

        let next = Wrap::<N>::next(write);
        self.write.store(next, Ordering::Release);
        cursor.write = next;

        Ok(())
    }

    /// Attempts to pop the oldest item from the queue.
    ///
    /// # Safety
    ///
    /// `cursor` must be the only consumer cursor of this ring, and must not be
    /// used concurrently from another thread.
    #[inline]
    pub(crate) unsafe fn pop(&self, cursor: &mut ConsumerCursor) -> Option<T> {
        let read = cursor.read;

        if read == cursor.cached_write {
            // Acquire pairs with the producer's Release store in `push`: the
            // slot contents are visible before we read them.
            cursor.cached_write = self.write.load(Ordering::Acquire);
            if read == cursor.cached_write {
                return None;
            }
        }

        // SAFETY: `read != write`, so the slot at `read` was initialized and
        // published by the producer. The producer will not reuse it until the
        // new `read` is published below.
        let item = unsafe {
            let slot = self.slots.get_unchecked(Wrap::<N>::slot(read));
            (*slot.value.get()).assume_init_read()
        };

        let next = Wrap::<N>::next(read);
        self.read.store(next, Ordering::Release);
        cursor.read = next;

        Some(item)
    }

    /// Number of resident items as seen by the producer.
    ///
    /// Its own index is exact; only `read` can be stale, and then only by
    /// over-reporting.
    #[inline]
    pub(crate) fn len_from_producer(&self, cursor: &ProducerCursor) -> usize {
        let read = self.read.load(Ordering::Acquire);
        Wrap::<N>::occupancy(cursor.write, read)
    }

    /// Number of resident items as seen by the consumer.
    #[inline]
    pub(crate) fn len_from_consumer(&self, cursor: &ConsumerCursor) -> usize {
        let write = self.write.load(Ordering::Acquire);
        Wrap::<N>::occupancy(write, cursor.read)
    }
}

impl<T, const N: usize> Drop for Ring<T, N> {
    fn drop(&mut self) {
        let write = *self.write.get_mut();
        let mut read = *self.read.get_mut();

        while read != write {
            // SAFETY: `&mut self` excludes both ends; ring indices in
            // `[read, write)` hold initialized values that nobody moved out.
            unsafe {
                let slot = self.slots.get_unchecked_mut(Wrap::<N>::slot(read));
                slot.value.get_mut().assume_init_drop();
            }
            read = Wrap::<N>::next(read);
        }
    }
}

// SAFETY: the ring owns its items; moving it to another thread moves them.
unsafe impl<T: Send, const N: usize> Send for Ring<T, N> {}

// SAFETY: concurrent access is mediated by the Release/Acquire index protocol
// and each slot is accessed by at most one side at a time (see `push`/`pop`).
unsafe impl<T: Send, const N: usize> Sync for Ring<T, N> {}
