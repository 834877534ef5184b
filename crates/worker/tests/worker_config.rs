//! Tests for WorkerConfig builder and functionality.

use std::time::Duration;

use active_worker::config::{IdleStrategy, PanicPolicy, WorkerConfig, DEFAULT_THREAD_NAME};
use active_worker::ActiveWorker;

#[test]
fn worker_config_builder() {
    let config = WorkerConfig::builder()
        .name("TestWorker")
        .stack_size(256 * 1024)
        .idle(IdleStrategy::Spin { spins: 128 })
        .drain_timeout(Duration::from_millis(750))
        .panic_policy(PanicPolicy::Propagate)
        .build();

    assert_eq!(config.name, "TestWorker");
    assert_eq!(config.stack_size, Some(256 * 1024));
    assert_eq!(config.idle, IdleStrategy::Spin { spins: 128 });
    assert_eq!(config.drain_timeout, Some(Duration::from_millis(750)));
    assert_eq!(config.panic_policy, PanicPolicy::Propagate);
}

#[test]
fn worker_config_default() {
    let config = WorkerConfig::default();

    assert_eq!(config.name, DEFAULT_THREAD_NAME);
    assert_eq!(config.stack_size, None);
    assert_eq!(config.idle, IdleStrategy::Yield);
    assert_eq!(config.drain_timeout, None);
    assert_eq!(config.panic_policy, PanicPolicy::Continue);
}

#[test]
fn worker_with_custom_config() {
    let config = WorkerConfig::builder()
        .name("CustomWorker")
        .stack_size(128 * 1024)
        .build();

    let worker = ActiveWorker::<u64, 32>::with_config(config, |_: u64| {}).unwrap();

    assert_eq!(worker.config().name, "CustomWorker");
    assert_eq!(worker.config().stack_size, Some(128 * 1024));
    assert_eq!(worker.capacity(), 32);
    assert!(worker.is_empty());

    let stats = worker.stop_and_drain().unwrap();
    assert_eq!(stats.accepted, 0);
    assert_eq!(stats.processed, 0);
}

#[cfg(feature = "serde")]
#[test]
fn idle_strategy_serializes() {
    use serde::{Deserialize, Serialize};

    fn assert_serde<T: Serialize + for<'de> Deserialize<'de>>() {}

    assert_serde::<IdleStrategy>();
    assert_serde::<PanicPolicy>();
    assert_serde::<active_worker::WorkerStats>();
    assert_serde::<active_worker::WorkerState>();
}
