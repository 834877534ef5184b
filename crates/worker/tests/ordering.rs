//! End-to-end delivery: every accepted item reaches the processor once, in order.

use std::sync::{Arc, Mutex};
use std::thread;

use active_worker::{ActiveWorker, Full, WorkerState};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ITEMS: usize = 20_000;

#[test]
fn background_work_matches_produced_sequence() {
    let saved = Arc::new(Mutex::new(Vec::with_capacity(ITEMS)));
    let sink = Arc::clone(&saved);
    let mut worker = ActiveWorker::<i32, 100>::spawn(move |item: i32| {
        sink.lock().unwrap().push(item);
    })
    .unwrap();

    let mut rng = StdRng::seed_from_u64(2010);
    let mut produced = Vec::with_capacity(ITEMS);
    let mut failed = 0u64;

    while produced.len() < ITEMS {
        let item: i32 = rng.gen();
        match worker.enqueue(item) {
            Ok(()) => produced.push(item),
            Err(Full(_)) => {
                failed += 1;
                thread::yield_now();
            }
        }
    }

    assert_eq!(produced.len(), ITEMS);
    assert_eq!(worker.stats().rejected, failed);

    let stats = worker.stop_and_drain().unwrap();
    assert_eq!(stats.accepted, ITEMS as u64);
    assert_eq!(stats.processed, ITEMS as u64);
    assert_eq!(stats.state, WorkerState::Stopped);

    let saved = saved.lock().unwrap();
    assert_eq!(saved.len(), produced.len());
    assert_eq!(*saved, produced);
}

#[test]
fn items_accepted_right_before_stop_are_processed() {
    for round in 0..50 {
        let saved = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&saved);
        let mut worker = ActiveWorker::<usize, 4>::spawn(move |item: usize| {
            sink.lock().unwrap().push(item);
        })
        .unwrap();

        let mut accepted = Vec::new();
        for item in 0..round {
            if worker.enqueue(item).is_ok() {
                accepted.push(item);
            }
        }
        worker.stop_and_drain().unwrap();

        assert_eq!(*saved.lock().unwrap(), accepted, "round {round}");
    }
}

#[test]
fn producer_may_live_on_another_thread() {
    let saved = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&saved);
    let worker = ActiveWorker::<String, 16>::spawn(move |item: String| {
        sink.lock().unwrap().push(item);
    })
    .unwrap();

    let producer = thread::spawn(move || {
        let mut worker = worker;
        for i in 0..1_000 {
            worker.enqueue_blocking(format!("job-{i}"));
        }
        worker.stop_and_drain()
    });

    let stats = producer.join().unwrap().unwrap();
    assert_eq!(stats.processed, 1_000);

    let saved = saved.lock().unwrap();
    assert_eq!(saved.first().map(String::as_str), Some("job-0"));
    assert_eq!(saved.last().map(String::as_str), Some("job-999"));
}
