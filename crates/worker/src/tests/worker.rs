use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::{IdleStrategy, WorkerConfig};
use crate::error::Full;
use crate::processor::Processor;
use crate::state::WorkerState;
use crate::worker::ActiveWorker;

#[derive(Clone, Default)]
struct Collector {
    events: Arc<Mutex<Vec<String>>>,
}

impl Processor<u32> for Collector {
    fn on_start(&mut self) {
        self.events.lock().unwrap().push("start".to_string());
    }

    fn process(&mut self, item: u32) {
        self.events.lock().unwrap().push(item.to_string());
    }

    fn on_stop(&mut self) {
        self.events.lock().unwrap().push("stop".to_string());
    }
}

#[test]
fn worker_delivers_items_between_hooks() {
    let collector = Collector::default();
    let probe = collector.clone();

    let mut worker = ActiveWorker::<u32, 4>::spawn(collector).unwrap();
    assert_eq!(worker.state(), WorkerState::Running);

    worker.enqueue_blocking(7);
    worker.enqueue_blocking(8);
    let stats = worker.stop_and_drain().unwrap();

    assert_eq!(stats.accepted, 2);
    assert_eq!(stats.processed, 2);
    assert_eq!(stats.state, WorkerState::Stopped);

    let events = probe.events.lock().unwrap();
    assert_eq!(events.as_slice(), &["start", "7", "8", "stop"]);
}

#[test]
fn full_queue_turns_item_away() {
    let (started_tx, started_rx) = mpsc::channel();
    let (gate_tx, gate_rx) = mpsc::channel::<()>();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let mut worker = ActiveWorker::<u32, 4>::spawn(move |item: u32| {
        if item == 0 {
            started_tx.send(()).unwrap();
            gate_rx.recv().unwrap();
        }
        sink.lock().unwrap().push(item);
    })
    .unwrap();

    worker.enqueue(0).unwrap();
    started_rx.recv().unwrap();

    for item in 1..=4 {
        worker.enqueue(item).unwrap();
    }
    assert_eq!(worker.len(), 4);

    let rejected = worker.enqueue(5);
    assert_eq!(rejected, Err(Full(5)));
    assert_eq!(worker.len(), 4);
    assert_eq!(worker.stats().rejected, 1);

    gate_tx.send(()).unwrap();
    let stats = worker.stop_and_drain().unwrap();

    assert_eq!(stats.accepted, 5);
    assert_eq!(stats.processed, 5);
    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 3, 4]);
}

#[test]
fn stop_drains_backlog_of_slow_processor() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let mut worker = ActiveWorker::<u32, 8>::spawn(move |item: u32| {
        std::thread::sleep(Duration::from_millis(2));
        sink.lock().unwrap().push(item);
    })
    .unwrap();

    for item in 0..32 {
        worker.enqueue_blocking(item);
    }
    let stats = worker.stop_and_drain().unwrap();

    assert_eq!(stats.processed, 32);
    assert_eq!(stats.pending, 0);
    assert_eq!(*seen.lock().unwrap(), (0..32).collect::<Vec<_>>());
}

#[test]
fn drop_drains_and_joins() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    {
        let mut worker = ActiveWorker::<u32, 16>::spawn(move |item: u32| {
            sink.lock().unwrap().push(item);
        })
        .unwrap();
        for item in 0..200 {
            worker.enqueue_blocking(item);
        }
    }

    assert_eq!(*seen.lock().unwrap(), (0..200).collect::<Vec<_>>());
}

#[test]
fn idle_strategies_all_deliver() {
    let strategies = [
        IdleStrategy::Yield,
        IdleStrategy::Spin { spins: 64 },
        IdleStrategy::Park {
            timeout: Duration::from_millis(50),
        },
    ];

    for strategy in strategies {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let config = WorkerConfig::builder().idle(strategy).build();

        let mut worker = ActiveWorker::<u32, 8>::with_config(config, move |item: u32| {
            sink.lock().unwrap().push(item);
        })
        .unwrap();

        for item in 0..100 {
            worker.enqueue_blocking(item);
            if item % 10 == 0 {
                // give the worker a chance to go idle between bursts
                std::thread::sleep(Duration::from_millis(1));
            }
        }
        let stats = worker.stop_and_drain().unwrap();

        assert_eq!(stats.processed, 100, "strategy {strategy:?}");
        assert_eq!(*seen.lock().unwrap(), (0..100).collect::<Vec<_>>());
    }
}

#[test]
fn thread_carries_configured_name() {
    let (tx, rx) = mpsc::channel();
    let config = WorkerConfig::builder().name("fifo-drain").build();

    let mut worker = ActiveWorker::<(), 2>::with_config(config, move |()| {
        let name = std::thread::current().name().map(str::to_owned);
        tx.send(name).unwrap();
    })
    .unwrap();
    assert_eq!(worker.name(), "fifo-drain");

    worker.enqueue_blocking(());
    worker.stop_and_drain().unwrap();

    assert_eq!(rx.recv().unwrap().as_deref(), Some("fifo-drain"));
}
