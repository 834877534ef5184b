//! # spsc-fifo
//!
//! A bounded, lock-free, single-producer/single-consumer FIFO backed by a
//! fixed-capacity ring buffer.
//!
//! ## Module Overview
//! - [`queue`]   – The public queue and its [`Producer`] / [`Consumer`] ends.
//! - `index`     – Index wrap arithmetic for the ring.
//! - [`backoff`] – Spin-then-yield backoff and timeouts for the retrying helpers.
//!
//! The queue never blocks and never allocates after construction. A full queue
//! hands the item back to the producer, an empty queue returns `None` to the
//! consumer; both are ordinary outcomes, not errors.
//!
//! ```
//! let (mut tx, mut rx) = spsc_fifo::channel::<u32, 4>();
//!
//! for i in 0..4 {
//!     tx.push(i).unwrap();
//! }
//! assert_eq!(tx.push(99), Err(99));
//!
//! assert_eq!(rx.pop(), Some(0));
//! assert_eq!(rx.len(), 3);
//! ```

#![deny(unsafe_op_in_unsafe_fn)]

pub mod backoff;
mod index;
pub mod queue;
mod ring;

pub use backoff::{Backoff, Timeout};
pub use queue::{channel, BoundedSpscQueue, Consumer, Producer};
