//! # active-worker
//!
//! An active object built on [`spsc_fifo`]: callers enqueue items from one
//! thread, a dedicated worker thread processes them asynchronously and in
//! order, and shutdown drains everything that was accepted.
//!
//! ## Module Overview
//! - [`worker`]    – The [`ActiveWorker`] handle, its [`WorkerMonitor`] and the consume loop.
//! - [`processor`] – The [`Processor`] trait applied to every item.
//! - [`config`]    – Thread, idle, drain-timeout and panic settings.
//! - [`state`]     – The `Running → Draining → Stopped` lifecycle.
//! - [`stats`]     – Accepted / rejected / processed counters.
//! - [`error`]     – Backpressure and shutdown errors.
//!
//! The queue is never locked. Backpressure is reported to the caller through
//! [`Full`], who chooses to retry, drop or escalate.

pub mod config;
pub mod error;
mod idle;
pub mod processor;
pub mod state;
pub mod stats;
pub mod worker;

pub use config::{IdleStrategy, PanicPolicy, WorkerConfig, WorkerConfigBuilder};
pub use error::{Full, WorkerError};
pub use processor::Processor;
pub use state::WorkerState;
pub use stats::WorkerStats;
pub use worker::{ActiveWorker, WorkerMonitor};

#[cfg(test)]
mod tests;
