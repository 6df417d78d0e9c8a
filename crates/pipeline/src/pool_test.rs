use std::sync::Arc;

use async_trait::async_trait;
use beacon_protocol::{Bytes, MessageKind, ProtocolError, classify};
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use super::*;
use crate::{PipelineError, Result};

/// Records topics; fails on payload "bad", panics on "panic"; waits on
/// `gate` before handling
struct Recorder {
    seen: Mutex<Vec<String>>,
    gate: Semaphore,
}

impl Recorder {
    fn open() -> Arc<Self> {
        Arc::new(Self {
            seen: Mutex::new(Vec::new()),
            gate: Semaphore::new(Semaphore::MAX_PERMITS),
        })
    }

    fn closed() -> Arc<Self> {
        Arc::new(Self {
            seen: Mutex::new(Vec::new()),
            gate: Semaphore::new(0),
        })
    }
}

#[async_trait]
impl MessageHandler for Recorder {
    async fn handle(&self, topic: &str, payload: &[u8]) -> Result<MessageKind> {
        self.gate.acquire().await.unwrap().forget();
        if payload == b"bad" {
            return Err(PipelineError::Protocol(ProtocolError::MissingId));
        }
        if payload == b"panic" {
            panic!("handler blew up on {topic}");
        }
        self.seen.lock().push(topic.to_string());
        Ok(classify(topic).kind())
    }
}

const SITUATION: &str = "beacon/v1/es/madrid/situations/accident";
const DELETION: &str = "beacon/v1/es/madrid/deletions";

#[tokio::test]
async fn test_drains_queue_on_close() {
    let recorder = Recorder::open();
    let metrics = Arc::new(PoolMetrics::new());
    let (pool, submitter) = WorkerPool::start(4, 16, recorder.clone(), Arc::clone(&metrics));
    assert_eq!(pool.worker_count(), 4);

    for _ in 0..5 {
        assert!(submitter.submit(SITUATION, Bytes::from_static(b"{}")));
    }
    assert!(submitter.submit(DELETION, Bytes::from_static(b"{}")));
    drop(submitter);

    pool.join().await;

    assert_eq!(recorder.seen.lock().len(), 6);
    assert_eq!(metrics.processed.get(), 6);
    assert_eq!(metrics.situations.get(), 5);
    assert_eq!(metrics.deletions.get(), 1);
    assert_eq!(metrics.queue_depth.get(), 0);
}

#[tokio::test]
async fn test_full_queue_drops_without_blocking() {
    let recorder = Recorder::closed();
    let metrics = Arc::new(PoolMetrics::new());
    let (pool, submitter) = WorkerPool::start(1, 2, recorder.clone(), Arc::clone(&metrics));

    // Current-thread runtime: the worker cannot run until we yield, so only
    // the queue capacity is accepted
    let accepted = (0..10)
        .filter(|_| submitter.submit(SITUATION, Bytes::from_static(b"{}")))
        .count();

    assert_eq!(accepted, 2);
    assert_eq!(metrics.received.get(), 10);
    assert_eq!(metrics.enqueued.get(), 2);
    assert_eq!(metrics.dropped.get(), 8);
    assert_eq!(pool.queue_len(), 2);

    recorder.gate.add_permits(Semaphore::MAX_PERMITS / 2);
    drop(submitter);
    pool.join().await;

    assert_eq!(metrics.processed.get(), 2);
}

#[tokio::test]
async fn test_errors_do_not_stop_worker() {
    let recorder = Recorder::open();
    let metrics = Arc::new(PoolMetrics::new());
    let (pool, submitter) = WorkerPool::start(1, 16, recorder.clone(), Arc::clone(&metrics));

    for payload in [&b"bad"[..], b"{}", b"bad", b"{}"] {
        submitter.submit(SITUATION, Bytes::copy_from_slice(payload));
    }
    drop(submitter);
    pool.join().await;

    assert_eq!(metrics.errors.get(), 2);
    assert_eq!(metrics.processed.get(), 2);
    assert_eq!(metrics.process_duration.count(), 4);
}

#[tokio::test]
async fn test_cloned_submitters_keep_queue_open() {
    let recorder = Recorder::open();
    let metrics = Arc::new(PoolMetrics::new());
    let (pool, submitter) = WorkerPool::start(2, 16, recorder.clone(), Arc::clone(&metrics));

    let second = submitter.clone();
    drop(submitter);
    assert!(second.submit(SITUATION, Bytes::from_static(b"{}")));
    drop(second);

    pool.join().await;
    assert_eq!(metrics.processed.get(), 1);
}

#[tokio::test]
async fn test_metrics_handle_snapshot() {
    let recorder = Recorder::open();
    let metrics = Arc::new(PoolMetrics::new());
    let (pool, submitter) = WorkerPool::start(1, 4, recorder, Arc::clone(&metrics));
    submitter.submit(SITUATION, Bytes::from_static(b"{}"));
    drop(submitter);

    let handle = pool.metrics_handle("workers");
    pool.join().await;

    let snapshot = beacon_metrics::MetricsProvider::snapshot(&handle);
    assert_eq!(snapshot.component_type, "worker_pool");
    assert_eq!(snapshot.counter_value("processed"), 1);
}

#[tokio::test]
async fn test_panicking_message_keeps_worker() {
    let recorder = Recorder::open();
    let metrics = Arc::new(PoolMetrics::new());
    let (pool, submitter) = WorkerPool::start(1, 8, recorder.clone(), Arc::clone(&metrics));

    assert!(submitter.submit(SITUATION, Bytes::from_static(b"panic")));
    assert!(submitter.submit(SITUATION, Bytes::from_static(b"{}")));
    assert!(submitter.submit(DELETION, Bytes::from_static(b"{}")));
    drop(submitter);

    pool.join().await;

    // The single worker survived and handled what came after
    assert_eq!(recorder.seen.lock().len(), 2);
    assert_eq!(metrics.errors.get(), 1);
    assert_eq!(metrics.processed.get(), 2);
}
